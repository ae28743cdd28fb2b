//! Persisted record types. The whole `Document` is the unit of durability.
//! Distinct from the chirpy-types wire models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub chirps: BTreeMap<u64, Message>,
    #[serde(default)]
    pub users: BTreeMap<u64, User>,
    #[serde(default)]
    pub revoked_tokens: BTreeMap<u64, RevokedToken>,
    #[serde(default)]
    pub sequences: Sequences,
}

/// Last id handed out per collection. Ids are never reused, even after a
/// delete empties the slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub chirps: u64,
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub revoked_tokens: u64,
}

impl Document {
    pub(crate) fn next_chirp_id(&mut self) -> u64 {
        bump(&mut self.sequences.chirps)
    }

    pub(crate) fn next_user_id(&mut self) -> u64 {
        bump(&mut self.sequences.users)
    }

    pub(crate) fn next_revocation_id(&mut self) -> u64 {
        bump(&mut self.sequences.revoked_tokens)
    }
}

fn bump(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author_id: u64,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    #[serde(rename = "is_chirpy_red", default)]
    pub membership: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token_id: String,
    pub revoked_at: DateTime<Utc>,
}
