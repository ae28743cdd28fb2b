use chrono::{DateTime, Utc};
use tracing::info;

use crate::{Database, Result, RevokedToken};

impl Database {
    /// Add `token_id` to the denylist. Revoking a token twice returns the
    /// original entry rather than appending another.
    pub fn revoke_token(&self, token_id: &str, revoked_at: DateTime<Utc>) -> Result<RevokedToken> {
        let (entry, fresh) = self.with_doc_mut(|doc| {
            if let Some(existing) = doc.revoked_tokens.values().find(|t| t.token_id == token_id) {
                return Ok((existing.clone(), false));
            }

            let entry = RevokedToken {
                token_id: token_id.to_string(),
                revoked_at,
            };
            let id = doc.next_revocation_id();
            doc.revoked_tokens.insert(id, entry.clone());
            Ok((entry, true))
        })?;

        if fresh {
            info!("Token added to denylist");
        }
        Ok(entry)
    }

    pub fn is_token_revoked(&self, token_id: &str) -> Result<bool> {
        self.with_doc(|doc| Ok(doc.revoked_tokens.values().any(|t| t.token_id == token_id)))
    }
}
