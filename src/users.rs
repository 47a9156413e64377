//! User identifier pool loaded from the seeder's output file.
//!
//! The seeder is a separate process that populates the backing store and
//! writes the generated user ids to a flat JSON array. Workers read that file
//! once at startup; it is a hard dependency, so any problem with it fails the
//! worker immediately instead of producing traffic for users that don't exist.

use crate::error::TrafficError;
use rand::Rng;
use std::path::Path;

/// Immutable, ordered pool of user identifiers.
#[derive(Debug, Clone)]
pub struct UserPool {
    ids: Vec<String>,
}

impl UserPool {
    /// Load the pool from a JSON string-array file.
    ///
    /// Fails with [`TrafficError::MissingUserData`] when the file is absent,
    /// unreadable, malformed, or empty. No retries.
    pub fn load(path: &Path) -> Result<Self, TrafficError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TrafficError::MissingUserData(format!(
                "could not read {} (did the seeder run?): {e}",
                path.display()
            ))
        })?;

        let ids: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
            TrafficError::MissingUserData(format!(
                "{} is not a JSON string array: {e}",
                path.display()
            ))
        })?;

        Self::from_ids(ids)
    }

    /// Build a pool from an in-memory id list, rejecting an empty one.
    pub fn from_ids(ids: Vec<String>) -> Result<Self, TrafficError> {
        if ids.is_empty() {
            return Err(TrafficError::MissingUserData(
                "user id pool is empty".to_string(),
            ));
        }
        Ok(Self { ids })
    }

    /// Number of identifiers in the pool.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Uniformly select one identifier.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &str {
        &self.ids[rng.gen_range(0..self.ids.len())]
    }
}
