//! Share identifiers.
//!
//! Identifiers use the 12-byte ObjectId layout rendered as 24 lowercase hex
//! characters, so links created by earlier deployments stay valid:
//!
//! ```text
//! | 4 bytes unix seconds | 5 bytes per-process random | 3 bytes counter |
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;

use crate::{Result, ShareError};

/// Length of the hex form of an identifier.
pub const FILE_ID_LEN: usize = 24;

static PROCESS_RANDOM: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Identifier of a shared file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a new identifier.
    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let random = PROCESS_RANDOM.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>()))
            .fetch_add(1, Ordering::Relaxed)
            & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(random);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse an identifier from its hex form.
    ///
    /// Accepts exactly 24 hex digits in either case.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != FILE_ID_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ShareError::InvalidId(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time embedded in the identifier (unix seconds).
    pub fn timestamp(&self) -> u32 {
        u32::from_str_radix(&self.0[..8], 16).unwrap_or(0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for FileId {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_format() {
        let id = FileId::generate();
        assert_eq!(id.as_str().len(), FILE_ID_LEN);
        assert!(id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn test_generate_unique() {
        let ids: HashSet<FileId> = (0..1000).map(|_| FileId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generate_embeds_timestamp() {
        let before = Utc::now().timestamp() as u32;
        let id = FileId::generate();
        let after = Utc::now().timestamp() as u32;

        assert!(id.timestamp() >= before);
        assert!(id.timestamp() <= after);
    }

    #[test]
    fn test_parse_valid() {
        let id = FileId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
        assert_eq!(id.as_str(), "65a1b2c3d4e5f60718293a4b");
        assert_eq!(id.timestamp(), 0x65a1b2c3);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id = FileId::parse("65A1B2C3D4E5F60718293A4B").unwrap();
        assert_eq!(id.to_string(), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(FileId::parse(""), Err(ShareError::InvalidId(_))));
        assert!(FileId::parse("65a1b2c3d4e5f60718293a4").is_err()); // 23 chars
        assert!(FileId::parse("65a1b2c3d4e5f60718293a4b0").is_err()); // 25 chars
        assert!(FileId::parse("65a1b2c3d4e5f60718293a4g").is_err()); // non-hex
        assert!(FileId::parse("not-a-valid-object-id!!!").is_err());
    }

    #[test]
    fn test_from_str_roundtrip() {
        let id = FileId::generate();
        let parsed: FileId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
