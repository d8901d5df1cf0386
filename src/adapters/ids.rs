//! UUID-backed identifier generator.

use uuid::Uuid;

use crate::traits::IdGenerator;

/// Generates identifiers from random v4 UUIDs (simple, unhyphenated form).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
