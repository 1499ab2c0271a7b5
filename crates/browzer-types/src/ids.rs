//! Newtype identifiers.
//!
//! All ids are UUIDv4 strings wrapped in a distinct type so the compiler
//! catches a `PageId` handed to a function expecting a `SessionId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
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

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

uuid_id!(SessionId);
uuid_id!(TabId);
uuid_id!(PageId);
uuid_id!(FrameId);
uuid_id!(ActionId);
uuid_id!(TaskId);
uuid_id!(IterationId);
uuid_id!(ThoughtId);
uuid_id!(MemoryId);
uuid_id!(ToolCallId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn display_matches_inner_string() {
        let id = PageId::new();
        assert_eq!(id.to_string(), id.0);
    }
}
