//! Opaque ID newtypes for IR entities.
//!
//! Module IDs are design-wide; signal, instance and bundle-instance IDs are
//! local to the module that owns them.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// A module in the design. Equal IDs mean the same module object.
    ModuleId
);

define_id!(
    /// A signal or port within its owning module.
    SignalId
);

define_id!(
    /// An instance within its owning module.
    InstanceId
);

define_id!(
    /// A bundle instance within its owning module.
    BundleInstId
);

define_id!(
    /// An external module definition in the design.
    ExternalModuleId
);
