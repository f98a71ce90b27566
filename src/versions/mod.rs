//! Version rules
//!
//! One module per DataVersion with breaking changes. Each `register` adds only rules at its
//! own version (and sub-steps), and [`register_all`] runs them in ascending order, which the
//! registry's checkpoint enforces.

use tracing::debug;

use crate::bootstrap::Types;
use crate::error::Result;
use crate::registry::TypeRegistry;

mod items;
mod v100;
mod v1451;
mod v1510;
mod v704;
mod v705;
mod v99;

type Register = fn(&mut TypeRegistry, &Types) -> Result<()>;

const VERSIONS: &[(u32, Register)] = &[
    (v99::VERSION, v99::register),
    (v100::VERSION, v100::register),
    (v704::VERSION, v704::register),
    (v705::VERSION, v705::register),
    (v1451::VERSION, v1451::register),
    (v1510::VERSION, v1510::register),
];

/// Register every version's rules, oldest first
pub fn register_all(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    for (version, register) in VERSIONS {
        register(registry, types)?;
        debug!(version, checkpoint = %registry.checkpoint(), "registered version rules");
    }
    Ok(())
}

/// Versions with registered rules, ascending
pub fn registered() -> impl Iterator<Item = u32> {
    VERSIONS.iter().map(|(version, _)| *version)
}
