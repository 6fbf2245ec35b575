use serde::{Deserialize, Serialize};

/// A string value paired with a version counter.
///
/// The version only moves forward when the value actually changes, so two
/// replicas holding the same version of a key are expected to agree on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub version: u64,
    pub value: String,
}

impl VersionedValue {
    /// First write of a key, at version 0.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            version: 0,
            value: value.into(),
        }
    }

    pub fn with_version(value: impl Into<String>, version: u64) -> Self {
        Self {
            version,
            value: value.into(),
        }
    }

    /// Replace the value, bumping the version. Returns false (and leaves the
    /// version alone) when the value is unchanged.
    pub fn set(&mut self, value: &str) -> bool {
        if self.value == value {
            return false;
        }
        self.version += 1;
        self.value = value.to_string();
        true
    }

    /// Whether `self` should replace `current` during a merge.
    ///
    /// Higher version wins. On equal versions the destination is kept, even
    /// if the values differ.
    pub fn supersedes(&self, current: &VersionedValue) -> bool {
        self.version > current.version
    }
}
