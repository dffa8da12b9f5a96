//! Fabric families.
//!
//! Each family publishes its identifier types under a namespace named after
//! the family. The active family is picked by name from the `arch` config key.

mod ecp5;

pub use ecp5::Ecp5;

use crate::error::RegistryError;
use crate::scripting::registry::TypeRegistry;

/// A fabric family whose identifier types can be exposed to scripts.
pub trait ArchFamily: Send + Sync {
    /// Namespace name, e.g. `ecp5`.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Register the family's types into the namespace [`ArchFamily::name`].
    fn register(&self, registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError>;
}

static FAMILIES: &[&dyn ArchFamily] = &[&Ecp5];

/// Find a family by name (case-insensitive).
pub fn lookup(name: &str) -> Option<&'static dyn ArchFamily> {
    FAMILIES
        .iter()
        .copied()
        .find(|family| family.name().eq_ignore_ascii_case(name))
}

/// Names of all supported families.
pub fn available() -> impl Iterator<Item = &'static str> {
    FAMILIES.iter().map(|family| family.name())
}
