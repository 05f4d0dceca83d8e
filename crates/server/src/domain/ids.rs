// Workspace identifiers: 32 hex digits, bare or in 8-4-4-4-12 UUID form.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::error::DomainError;

fn id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                // Bare 32-digit form.
                Regex::new(r"(?i)^[0-9a-f]{32}$").expect("hex id pattern should compile"),
                // Hyphenated UUID form.
                Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
                    .expect("uuid id pattern should compile"),
            ]
        })
        .as_slice()
}

fn is_valid_id(value: &str) -> bool {
    id_patterns().iter().any(|pattern| pattern.is_match(value))
}

/// Hyphen-stripped digits. Equality and hashing use this form; case is kept.
fn normalized(value: &str) -> String {
    value.chars().filter(|c| *c != '-').collect()
}

/// Expands the bare form to 8-4-4-4-12. A value that already contains a
/// hyphen is returned as-is; hyphen placement is not re-checked.
fn canonical(value: &str) -> String {
    if value.contains('-') {
        return value.to_string();
    }
    format!(
        "{}-{}-{}-{}-{}",
        &value[0..8],
        &value[8..12],
        &value[12..16],
        &value[16..20],
        &value[20..32]
    )
}

macro_rules! workspace_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            value: String,
        }

        impl $name {
            /// Validates `value`, keeping it exactly as given.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if !is_valid_id(&value) {
                    return Err(DomainError::InvalidFormat { kind: $kind, value });
                }
                Ok(Self { value })
            }

            /// Wraps a generated UUID; its hyphenated form always validates.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self { value: uuid.hyphenated().to_string() }
            }

            pub fn is_valid(value: &str) -> bool {
                is_valid_id(value)
            }

            /// The identifier exactly as it was supplied.
            pub fn as_str(&self) -> &str {
                &self.value
            }

            pub fn to_canonical(&self) -> String {
                canonical(&self.value)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                normalized(&self.value) == normalized(&other.value)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                normalized(&self.value).hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = DomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::new(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

workspace_id!(
    /// Identifier of a database in the remote workspace.
    DatabaseId,
    "database"
);

workspace_id!(
    /// Identifier of a page in the remote workspace.
    PageId,
    "page"
);
