//! Lightweight identifiers local to the transport layer.
//!
//! `cdp-adapter` sits below `browzer-types` in the dependency graph (every
//! other crate in the workspace depends on the types crate, not the other
//! way around), so it mints its own ids rather than importing `browzer_types`.
//! Higher layers convert between the two at the seam (`browser-context`,
//! `action-recorder`).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! local_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

local_id!(PageId);
local_id!(SessionId);
local_id!(FrameId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(PageId::new(), PageId::new());
    }
}
