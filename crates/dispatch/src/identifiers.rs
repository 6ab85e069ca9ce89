//! Newtype domain identifiers.
//!
//! Every named thing that crosses the dispatcher boundary is a distinct newtype
//! wrapping a primitive, so a [`PipelineName`] can never be passed where an
//! [`ExecutionId`] is expected even though both are strings on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when an identifier is constructed from an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct EmptyIdentifier {
    kind: &'static str,
}

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and a
// TryFrom<String> used by serde so empty values are rejected on deserialise.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates an identifier from a compile-time literal known to be non-empty.
            #[allow(dead_code)]
            pub(crate) fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.is_empty());
                Self(value.to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdentifier { kind: stringify!($name) })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-backed identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// Names a downstream build/deploy pipeline (e.g. `"lambda1-pipeline"`).
    ///
    /// Pipeline names come from the ownership table; the dispatcher never
    /// checks that a named pipeline exists before starting it.
    PipelineName
}

string_id! {
    /// Identifier returned by the pipeline service for one started execution.
    ExecutionId
}

string_id! {
    /// Value of the `X-GitHub-Delivery` header.
    ///
    /// Logged for correlation only; redeliveries are not deduplicated.
    DeliveryId
}

// ---------------------------------------------------------------------------
// UUID-backed identifiers (internally generated)
// ---------------------------------------------------------------------------

/// Opaque token sent with every start-execution call.
///
/// A fresh token is generated per call, so the pipeline service never
/// collapses two deliveries into one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyToken(Uuid);

impl IdempotencyToken {
    /// Generates a new random token.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a token from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for IdempotencyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
