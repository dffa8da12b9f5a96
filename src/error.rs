//! Error types for the scripting bridge.
//!
//! Script faults are not errors in this taxonomy: a script that throws is an
//! expected outcome and comes back as a [`ScriptFault`] value. The enums here
//! cover host-side misuse and broken configuration.
//!
//! - **`BridgeError`**: lifecycle, gateway and injection misuse.
//! - **`RegistryError`**: conflicting or out-of-order type registrations.
//! - **`ConfigError`**: configuration that failed to load or validate.
//! - **`ContextError`**: binding requests the design context refused.
//!
//! Value-type range errors live in [`pnr_core::CoreError`].

use std::path::PathBuf;

use pnr_core::{BelId, PipId, PlaceStrength, WireId};
use thiserror::Error;

use crate::scripting::ScriptFault;

/// Convenience alias for results using the bridge error type.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Host-side failures of the scripting bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A second interpreter tried to take the process slot.
    #[error("script runtime is already initialized in this process")]
    AlreadyInitialized,

    /// The interpreter was used after teardown.
    #[error("interpreter has been torn down and cannot be reused")]
    Closed,

    /// The interpreter was used before initialization.
    #[error("script runtime is not initialized")]
    NotReady,

    /// No bindings exist for the requested fabric family.
    #[error("unknown architecture family '{0}'")]
    UnknownArch(String),

    /// Type registration was rejected.
    #[error("type registration failed: {0}")]
    Registry(#[from] RegistryError),

    /// A script file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path as given by the caller.
        path: PathBuf,
    },

    /// A script file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// A script raised a fault.
    #[error("{}", .0.render())]
    Script(#[from] ScriptFault),

    /// A host value's type has no script binding.
    #[error("type '{type_name}' is not registered with the script runtime")]
    UnregisteredType {
        /// Rust type name of the rejected value.
        type_name: &'static str,
    },

    /// A global name is not a valid script identifier.
    #[error("'{0}' is not a valid script identifier")]
    InvalidName(String),

    /// A global name is held by a script constant.
    #[error("'{0}' is bound to a script constant")]
    ConstantName(String),

    /// A global lookup found nothing.
    #[error("global '{0}' is not defined")]
    UndefinedGlobal(String),
}

/// Conflicts detected while building the type catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The Rust type already has a script name.
    #[error("Rust type '{type_name}' is already registered as '{existing}'")]
    DuplicateType {
        /// Rust type name.
        type_name: &'static str,
        /// Script name it was first registered under.
        existing: String,
    },

    /// The namespace already exports the name.
    #[error("name '{name}' is already exported from namespace '{namespace}'")]
    DuplicateName {
        /// Target namespace.
        namespace: String,
        /// Conflicting export name.
        name: String,
    },

    /// A nested type names an owner the namespace does not export.
    #[error("cannot nest '{name}' under '{owner}': owner is not registered in '{namespace}'")]
    UnknownOwner {
        /// Target namespace.
        namespace: String,
        /// Missing owner type.
        owner: String,
        /// Nested type being registered.
        name: String,
    },

    /// The namespace does not exist.
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Figment could not load or extract the configuration.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A loaded value is out of range.
    #[error("invalid configuration value for '{key}': {reason}")]
    Invalid {
        /// Configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

/// Rejected design context updates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The bel already holds a cell.
    #[error("{bel} is already bound to cell '{cell}'")]
    BelUnavailable {
        /// Requested bel.
        bel: BelId,
        /// Cell currently placed there.
        cell: String,
    },

    /// The wire already carries a net.
    #[error("{wire} is already bound to net '{net}'")]
    WireUnavailable {
        /// Requested wire.
        wire: WireId,
        /// Net currently bound there.
        net: String,
    },

    /// The pip is held at a strength the request cannot override.
    #[error("{pip} is held at strength {held}, request at {requested} cannot rip it up")]
    PipHeld {
        /// Requested pip.
        pip: PipId,
        /// Strength of the current binding.
        held: PlaceStrength,
        /// Strength of the rejected request.
        requested: PlaceStrength,
    },

    /// A cell or net name was empty.
    #[error("{kind} name must not be empty")]
    EmptyName {
        /// `"cell"` or `"net"`.
        kind: &'static str,
    },
}
