//! Property tests for version ranges
//!
//! Migrating in two hops must match migrating in one, and migrating to the version a record is
//! already at must change nothing. Checked for a converter-only type and for a type that also
//! carries hooks and walkers at generated versions.

use proptest::prelude::*;

use record_schemas::walkers::convert_fields;
use record_schemas::{rule, Compound, Hook, Record, RuleFn, TypeHandle, TypeRegistry, VersionKey};

/// Converters at 10, 20, ..., 100 (and a sub-step at 50.1), each appending its version
fn chained() -> (TypeRegistry, TypeHandle) {
    let mut registry = TypeRegistry::new();
    let t = registry.register_type("Chained").unwrap();
    let mut keys: Vec<(u32, u32)> = (1..=10).map(|n| (n * 10, 0)).collect();
    keys.insert(5, (50, 1));

    for (major, step) in keys {
        let label = VersionKey::new(major, step).unwrap().to_string();
        registry
            .register_converter(
                t,
                major,
                step,
                rule(move |record, m| {
                    let mut compound = m.expect_compound(record)?.clone();
                    let mut applied = compound.get_list("applied").map(<[Record]>::to_vec).unwrap_or_default();
                    applied.push(Record::from(label.as_str()));
                    compound.insert("applied", applied);
                    Ok(Some(Record::Compound(compound)))
                }),
            )
            .unwrap();
    }
    registry.freeze().unwrap();
    (registry, t)
}

enum Planned {
    Converter(TypeHandle),
    Hook,
    Walkers,
    LateWalkers,
}

/// Appends `<version>:<name>` to `applied`, so the stamp shows whether hooks ran first
fn stamp(version: VersionKey) -> RuleFn {
    let label = version.to_string();
    rule(move |record, m| {
        let mut compound = m.expect_compound(record)?.clone();
        let name = compound.get_str("name").unwrap_or_default().to_string();
        let mut applied = compound.get_list("applied").map(<[Record]>::to_vec).unwrap_or_default();
        applied.push(Record::String(format!("{label}:{name}")));
        compound.insert("applied", applied);
        Ok(Some(Record::Compound(compound)))
    })
}

fn set_once(key: &'static str) -> RuleFn {
    rule(move |record, m| {
        let compound = m.expect_compound(record)?;
        if compound.contains_key(key) {
            return Ok(None);
        }
        let mut compound = compound.clone();
        compound.insert(key, Record::Byte(1));
        Ok(Some(Record::Compound(compound)))
    })
}

/// Pre hook lowercases `name`, post hook seals the record
fn lowercase_and_seal() -> Hook {
    let seal = set_once("sealed");
    Hook::new()
        .with_pre(|record, m| {
            let compound = m.expect_compound(record)?;
            let name = compound.get_str("name").unwrap_or_default();
            let lower = name.to_lowercase();
            if lower == name {
                return Ok(None);
            }
            let mut compound = compound.clone();
            compound.insert("name", Record::String(lower));
            Ok(Some(Record::Compound(compound)))
        })
        .with_post(move |record, m| (*seal)(record, m))
}

/// Outer type: the converters of [`chained`], a hook at `hook_at`, a walker converting `child`
/// from the start and a second walker group at `late_at` that also marks the record.
/// Inner type: converters at 15, 45 and 75.
fn layered(hook_at: VersionKey, late_at: VersionKey) -> (TypeRegistry, TypeHandle) {
    let mut registry = TypeRegistry::new();
    let outer = registry.register_type("Layered").unwrap();
    let inner = registry.register_type("Nested").unwrap();

    let mut plan: Vec<(VersionKey, Planned)> = vec![
        (VersionKey::MIN, Planned::Walkers),
        (hook_at, Planned::Hook),
        (late_at, Planned::LateWalkers),
    ];
    plan.extend((1..=10).map(|n| (VersionKey::of(n * 10), Planned::Converter(outer))));
    plan.push((VersionKey::new(50, 1).unwrap(), Planned::Converter(outer)));
    plan.extend([15, 45, 75].map(|n| (VersionKey::of(n), Planned::Converter(inner))));
    // rules must be registered in ascending order across all types
    plan.sort_by_key(|(version, _)| *version);

    for (version, planned) in plan {
        let (major, step) = (version.major(), version.step());
        match planned {
            Planned::Converter(t) => registry.register_converter(t, major, step, stamp(version)).unwrap(),
            Planned::Hook => registry.register_hook(outer, major, step, lowercase_and_seal()).unwrap(),
            Planned::Walkers => registry
                .register_walker(outer, major, step, convert_fields(inner, &["child"]))
                .unwrap(),
            Planned::LateWalkers => {
                registry
                    .register_walker(outer, major, step, convert_fields(inner, &["child"]))
                    .unwrap();
                registry.register_walker(outer, major, step, set_once("late")).unwrap();
            }
        }
    }
    registry.freeze().unwrap();
    (registry, outer)
}

fn layered_start() -> Record {
    let mut child = Compound::new();
    child.insert("name", "Child");
    let mut compound = Compound::new();
    compound.insert("name", "Record");
    compound.insert("child", child);
    Record::Compound(compound)
}

fn version() -> impl Strategy<Value = VersionKey> {
    (0u32..120, prop_oneof![Just(0u32), Just(1u32)]).prop_map(|(major, step)| VersionKey::new(major, step).unwrap())
}

/// Never at the very start, where the first walker group sits
fn late_version() -> impl Strategy<Value = VersionKey> {
    (1u32..120, prop_oneof![Just(0u32), Just(1u32)]).prop_map(|(major, step)| VersionKey::new(major, step).unwrap())
}

fn start() -> Record {
    let mut compound = Compound::new();
    compound.insert("name", "record");
    Record::Compound(compound)
}

proptest! {
    #[test]
    fn prop_two_hops_match_one(versions in prop::collection::vec(version(), 3)) {
        let mut versions = versions;
        versions.sort();
        let (a, b, c) = (versions[0], versions[1], versions[2]);
        let (registry, t) = chained();

        let direct = registry.migrate(t, start(), a, c).unwrap();
        let halfway = registry.migrate(t, start(), a, b).unwrap();
        let hopped = registry.migrate(t, halfway, b, c).unwrap();

        prop_assert_eq!(direct, hopped);
    }

    #[test]
    fn prop_same_version_is_a_no_op(v in version()) {
        let (registry, t) = chained();
        prop_assert!(registry.convert(t, &start(), v, v).unwrap().is_none());
    }

    #[test]
    fn prop_applied_converters_are_exactly_the_window(from in version(), to in version()) {
        prop_assume!(from <= to);
        let (registry, t) = chained();

        let migrated = registry.migrate(t, start(), from, to).unwrap();
        let applied: Vec<VersionKey> = migrated
            .as_compound()
            .unwrap()
            .get_list("applied")
            .unwrap_or_default()
            .iter()
            .map(|label| label.as_str().unwrap().parse().unwrap())
            .collect();

        prop_assert!(applied.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(applied.iter().all(|key| from < *key && *key <= to));
    }

    #[test]
    fn prop_two_hops_match_one_with_hooks_and_walkers(
        versions in prop::collection::vec(version(), 3),
        hook_at in version(),
        late_at in late_version()
    ) {
        let mut versions = versions;
        versions.sort();
        let (a, b, c) = (versions[0], versions[1], versions[2]);
        let (registry, t) = layered(hook_at, late_at);

        let direct = registry.migrate(t, layered_start(), a, c).unwrap();
        let halfway = registry.migrate(t, layered_start(), a, b).unwrap();
        let hopped = registry.migrate(t, halfway, b, c).unwrap();

        let compound = direct.as_compound().unwrap();
        prop_assert_eq!(compound.contains_key("sealed"), a < c && hook_at <= c);
        prop_assert_eq!(compound.contains_key("late"), a < c && late_at <= c);
        prop_assert_eq!(direct, hopped);
    }

    #[test]
    fn prop_same_version_is_a_no_op_with_hooks_and_walkers(
        v in version(),
        hook_at in version(),
        late_at in late_version()
    ) {
        let (registry, t) = layered(hook_at, late_at);
        prop_assert!(registry.convert(t, &layered_start(), v, v).unwrap().is_none());
    }
}
