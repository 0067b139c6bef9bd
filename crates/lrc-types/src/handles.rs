//! # Handles
//!
//! Opaque identifiers issued by the federation (federates, federations) or by
//! the object model (classes, attributes, spaces, dimensions).
//!
//! Every handle is a `Copy` newtype so that an attribute handle can never be
//! passed where a parameter handle is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl $name {
            /// Raw numeric value of the handle.
            #[must_use]
            pub const fn value(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_handle!(
    /// Unique id of a federate within its federation.
    FederateHandle(u32)
);
define_handle!(
    /// Id of the federation execution a federate joined.
    FederationHandle(u32)
);
define_handle!(
    /// Object class declared in the object model.
    ObjectClassHandle(u32)
);
define_handle!(
    /// Attribute of an object class.
    AttributeHandle(u32)
);
define_handle!(
    /// Interaction class declared in the object model.
    InteractionClassHandle(u32)
);
define_handle!(
    /// Parameter of an interaction class.
    ParameterHandle(u32)
);
define_handle!(
    /// Routing space (a named set of dimensions).
    SpaceHandle(u32)
);
define_handle!(
    /// Dimension (named axis) of a routing space.
    DimensionHandle(u32)
);
define_handle!(
    /// Token of a region created by the local federate.
    RegionToken(u32)
);
define_handle!(
    /// Object instance. The upper 32 bits carry the registering federate.
    ObjectInstanceHandle(u64)
);

impl ObjectInstanceHandle {
    /// Compose an instance handle from the registering federate and a local serial.
    #[must_use]
    pub const fn compose(federate: FederateHandle, serial: u32) -> Self {
        Self(((federate.0 as u64) << 32) | serial as u64)
    }

    /// Federate that registered this instance.
    #[must_use]
    pub const fn registrar(self) -> FederateHandle {
        FederateHandle((self.0 >> 32) as u32)
    }
}
