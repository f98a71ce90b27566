//! Version catalog
//!
//! Names for known DataVersions and the set of keys converters may be registered at. With a
//! strict catalog, a converter at an undeclared key is a registration error: it would
//! otherwise be skipped by loaders that only step through declared checkpoints.

use std::collections::{BTreeMap, BTreeSet};

use crate::version::VersionKey;

/// DataVersions with converters, up to 1.17.1
const CONVERTER_VERSIONS: &[u32] = &[
    99, 100, 101, 102, 105, 106, 107, 108, 109, 110, 111, 113, 135, 143, 147, 165, 501, 502, 505,
    700, 701, 702, 703, 704, 705, 804, 806, 808, 813, 816, 820, 1022, 1125, 1344, 1446, 1450,
    1451, 1456, 1458, 1460, 1466, 1470, 1474, 1475, 1480, 1481, 1483, 1484, 1486, 1487, 1488,
    1490, 1492, 1494, 1496, 1500, 1501, 1502, 1506, 1510, 1514, 1515, 1624, 1800, 1801, 1802,
    1803, 1904, 1905, 1906, 1909, 1911, 1917, 1918, 1920, 1925, 1928, 1929, 1931, 1936, 1946,
    1948, 1953, 1955, 1961, 1963, 2100, 2202, 2209, 2211, 2218, 2501, 2502, 2503, 2505, 2508,
    2509, 2511, 2514, 2516, 2518, 2519, 2522, 2523, 2527, 2528, 2529, 2531, 2533, 2535, 2550,
    2551, 2552, 2553, 2558, 2568, 2671, 2679, 2680, 2684, 2686, 2688, 2690, 2691, 2696, 2700,
    2701, 2702, 2704, 2707, 2710, 2717,
];

/// DataVersions split into several ordered steps
const SUB_VERSIONS: &[(u32, &[u32])] = &[(808, &[1]), (1451, &[1, 2, 3, 4, 5, 6, 7])];

const VERSION_NAMES: &[(u32, &str)] = &[
    (99, "pre_converter"),
    (100, "15w32a"),
    (169, "1.9"),
    (512, "1.10.2"),
    (819, "1.11"),
    (1139, "1.12"),
    (1343, "1.12.2"),
    (1451, "17w47a"),
    (1519, "1.13"),
    (1631, "1.13.2"),
    (1952, "1.14"),
    (2225, "1.15"),
    (2566, "1.16"),
    (2586, "1.16.5"),
    (2724, "1.17"),
    (2730, "1.17.1"),
];

/// Named versions and declared converter checkpoints
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    names: BTreeMap<u32, String>,
    declared: BTreeSet<VersionKey>,
}

impl VersionCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of released versions through 1.17.1
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (major, name) in VERSION_NAMES {
            catalog.name(*major, *name);
        }
        for major in CONVERTER_VERSIONS {
            catalog.declare(VersionKey::of(*major));
        }
        for (major, steps) in SUB_VERSIONS {
            for step in *steps {
                // steps are below MAX_STEP
                if let Ok(key) = VersionKey::new(*major, *step) {
                    catalog.declare(key);
                }
            }
        }
        catalog
    }

    /// Attach a display name to a DataVersion
    pub fn name(&mut self, major: u32, name: impl Into<String>) -> &mut Self {
        self.names.insert(major, name.into());
        self
    }

    /// Declare a key as a converter checkpoint
    pub fn declare(&mut self, key: VersionKey) -> &mut Self {
        self.declared.insert(key);
        self
    }

    pub fn is_declared(&self, key: VersionKey) -> bool {
        self.declared.contains(&key)
    }

    /// Declared checkpoints, ascending
    pub fn declared(&self) -> impl Iterator<Item = VersionKey> + '_ {
        self.declared.iter().copied()
    }

    /// The newest named version
    pub fn latest(&self) -> Option<u32> {
        self.names.keys().next_back().copied()
    }

    /// Display name for a DataVersion
    ///
    /// Unnamed versions borrow the name of the closest named version above them
    /// (`"1.13-dev68"`), or fall back to `unregistered_v{n}`.
    pub fn name_of(&self, major: u32) -> String {
        if let Some(name) = self.names.get(&major) {
            return name.clone();
        }
        match self.names.range(major..).next() {
            Some((closest, name)) => format!("{}-dev{}", name, closest - major),
            None => format!("unregistered_v{major}"),
        }
    }

    /// `"1451.3 (17w47a)"`
    pub fn describe(&self, key: VersionKey) -> String {
        format!("{} ({})", key, self.name_of(key.major()))
    }
}
