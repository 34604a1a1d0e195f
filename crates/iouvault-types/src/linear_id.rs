//! stable identifier shared by every version of one obligation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// linear id of an obligation.
///
/// every stored version of the same logical obligation carries the same linear id,
/// distinct from the per-version row id assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinearId(Uuid);

impl LinearId {
    /// generate a fresh random (v4) linear id for a new obligation.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// wrap an existing uuid.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// the underlying uuid.
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for LinearId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<LinearId> for Uuid {
    fn from(id: LinearId) -> Self {
        id.0
    }
}

impl FromStr for LinearId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::InvalidLinearId(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: LinearId = "6f1c0d1e-5b8a-4c3e-9f2d-1a2b3c4d5e6f".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c0d1e-5b8a-4c3e-9f2d-1a2b3c4d5e6f");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<LinearId>().unwrap_err();
        assert!(matches!(err, Error::InvalidLinearId(_)));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(LinearId::new_random(), LinearId::new_random());
    }

    #[test]
    fn test_serde_is_plain_uuid_string() {
        let id = LinearId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
