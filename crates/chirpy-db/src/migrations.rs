use std::path::Path;

use tracing::info;

use crate::{Document, Result, read_document, write_document};

/// Bring the document at `path` up to the current layout.
///
/// A missing or zero-length file becomes an empty document. Documents
/// written before id sequences existed get each sequence seeded from the
/// highest id already present, so later inserts never collide. Caller holds
/// the exclusive lock.
pub fn run(path: &Path) -> Result<()> {
    let is_empty = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if is_empty {
        info!("Creating empty document at {}", path.display());
        return write_document(path, &Document::default());
    }

    let mut doc = read_document(path)?;
    if reconcile_sequences(&mut doc) {
        info!("Seeded id sequences for {}", path.display());
        write_document(path, &doc)?;
    }

    Ok(())
}

/// Raise each sequence to at least the collection's max key.
/// Returns whether anything changed.
fn reconcile_sequences(doc: &mut Document) -> bool {
    let before = doc.sequences;

    let max_key = |keys: Option<&u64>| keys.copied().unwrap_or(0);
    doc.sequences.chirps = doc.sequences.chirps.max(max_key(doc.chirps.keys().next_back()));
    doc.sequences.users = doc.sequences.users.max(max_key(doc.users.keys().next_back()));
    doc.sequences.revoked_tokens = doc
        .sequences
        .revoked_tokens
        .max(max_key(doc.revoked_tokens.keys().next_back()));

    doc.sequences != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbError};

    #[test]
    fn zero_length_file_is_initialised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(&path, b"").unwrap();

        run(&path).unwrap();
        assert_eq!(read_document(&path).unwrap(), Document::default());
    }

    #[test]
    fn legacy_document_gets_sequences_from_existing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(
            &path,
            r#"{
                "chirps": {
                    "1": {"id": 1, "author_id": 1, "body": "a"},
                    "4": {"id": 4, "author_id": 2, "body": "b"}
                },
                "users": {
                    "2": {"id": 2, "email": "b@x.com", "password_hash": "h"}
                }
            }"#,
        )
        .unwrap();

        let db = Database::open(&path).unwrap();
        let doc = db.load().unwrap();
        assert_eq!(doc.sequences.chirps, 4);
        assert_eq!(doc.sequences.users, 2);
        assert_eq!(doc.sequences.revoked_tokens, 0);
        assert!(!doc.users[&2].membership);

        assert_eq!(db.create_message(3, "c").unwrap().id, 5);
    }

    #[test]
    fn garbage_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        assert!(matches!(Database::open(&path), Err(DbError::Decode(_))));
    }
}
