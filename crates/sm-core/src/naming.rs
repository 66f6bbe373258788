//! Migration names.
//!
//! A journal entry is `<NNNN>_<label>`: a zero-padded sequence prefix taken
//! from the journal length at creation time, then a human label. The prefix
//! makes the on-disk file order match creation order.

use crate::error::{CoreError, CoreResult};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the zero-padded sequence prefix.
pub const PREFIX_WIDTH: usize = 4;

/// Full migration name as stored in the journal, e.g. `0001_add_email`.
///
/// Always validated on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationName(String);

fn check_full_name(value: &str) -> Result<(), String> {
    let Some((prefix, label)) = value.split_once('_') else {
        return Err("expected '<NNNN>_<label>'".to_string());
    };
    if prefix.len() < PREFIX_WIDTH || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "sequence prefix must be at least {PREFIX_WIDTH} digits"
        ));
    }
    check_label(label)
}

fn check_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if let Some(c) = label
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!(
            "'{c}' is not allowed; use letters, digits, '_' or '-'"
        ));
    }
    Ok(())
}

/// Zero-padded sequence prefix for a journal position: `7` -> `"0007"`.
pub fn sequence_prefix(index: usize) -> String {
    format!("{index:0width$}", width = PREFIX_WIDTH)
}

/// Check a user-supplied label before it becomes part of a file name.
pub fn validate_label(label: &str) -> CoreResult<()> {
    check_label(label).map_err(|reason| CoreError::InvalidMigrationName {
        name: label.to_string(),
        reason,
    })
}

impl MigrationName {
    /// Build `<NNNN>_<label>` for the journal position `index`.
    pub fn compose(index: usize, label: &str) -> CoreResult<Self> {
        validate_label(label)?;
        Ok(Self(format!("{}_{label}", sequence_prefix(index))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sequence number encoded in the prefix.
    pub fn sequence(&self) -> usize {
        self.0
            .split_once('_')
            .and_then(|(prefix, _)| prefix.parse().ok())
            .unwrap_or_default()
    }

    /// The human part after the prefix.
    pub fn label(&self) -> &str {
        self.0.split_once('_').map_or("", |(_, label)| label)
    }
}

impl TryFrom<String> for MigrationName {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        match check_full_name(&value) {
            Ok(()) => Ok(Self(value)),
            Err(reason) => Err(CoreError::InvalidMigrationName {
                name: value,
                reason,
            }),
        }
    }
}

impl TryFrom<&str> for MigrationName {
    type Error = CoreError;

    fn try_from(value: &str) -> CoreResult<Self> {
        Self::try_from(value.to_string())
    }
}

impl From<MigrationName> for String {
    fn from(name: MigrationName) -> Self {
        name.0
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

const ADJECTIVES: &[&str] = &[
    "amber", "brave", "calm", "daring", "eager", "fancy", "gentle", "hidden", "icy", "jolly",
    "keen", "lively", "mellow", "nimble", "odd", "proud", "quiet", "rapid", "silent", "tidy",
    "upbeat", "vivid", "wild", "young",
];

const NOUNS: &[&str] = &[
    "anchor", "badger", "comet", "delta", "ember", "falcon", "glacier", "harbor", "island",
    "jaguar", "kestrel", "lantern", "meadow", "nebula", "otter", "pebble", "quartz", "raven",
    "summit", "thicket", "umbra", "valley", "willow", "zephyr",
];

/// Random `adjective_noun` label for migrations created without `--name`.
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("new");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("migration");
    format!("{adjective}_{noun}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_prefix() {
        assert_eq!(sequence_prefix(0), "0000");
        assert_eq!(sequence_prefix(42), "0042");
        assert_eq!(sequence_prefix(12345), "12345");
    }

    #[test]
    fn test_compose() {
        let name = MigrationName::compose(1, "add_field").unwrap();
        assert_eq!(name, "0001_add_field");
        assert_eq!(name.sequence(), 1);
        assert_eq!(name.label(), "add_field");
    }

    #[test]
    fn test_compose_rejects_path_characters() {
        for bad in ["", "../etc", "a/b", "with space", "semi;colon"] {
            assert!(
                MigrationName::compose(0, bad).is_err(),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_full_name() {
        assert!(MigrationName::try_from("0000_init").is_ok());
        assert!(MigrationName::try_from("init").is_err());
        assert!(MigrationName::try_from("12_init").is_err());
        assert!(MigrationName::try_from("abcd_init").is_err());
        assert!(MigrationName::try_from("0000_").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: MigrationName = serde_json::from_str("\"0003_users\"").unwrap();
        assert_eq!(ok.as_str(), "0003_users");

        let err = serde_json::from_str::<MigrationName>("\"users\"").unwrap_err();
        assert!(err.to_string().contains("E007"));
    }

    #[test]
    fn test_random_name_is_valid_label() {
        for _ in 0..32 {
            let name = random_name();
            validate_label(&name).unwrap();
            assert_eq!(name.matches('_').count(), 1);
        }
    }
}
