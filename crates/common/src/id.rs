//! ID and permalink generation utilities.

use chrono::Utc;
use rand::Rng;
use ulid::Ulid;

/// Length of the random base36 suffix appended to posting permalinks.
pub const PERMALINK_SUFFIX_LEN: usize = 6;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are lexicographically sortable and shorter than UUIDs when
    /// represented as strings.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a posting permalink: `<unix millis>-<6 random base36 chars>`.
    ///
    /// Uniqueness is not guaranteed by construction; callers insert with a
    /// unique constraint and retry on collision.
    #[must_use]
    pub fn generate_permalink(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..PERMALINK_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{}-{suffix}", Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_permalink_shape() {
        let id_gen = IdGenerator::new();
        let permalink = id_gen.generate_permalink();

        let (millis, suffix) = permalink.split_once('-').unwrap_or_default();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), PERMALINK_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }
}
