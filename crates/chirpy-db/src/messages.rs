use crate::{Database, DbError, Message, Result};

impl Database {
    pub fn create_message(&self, author_id: u64, body: &str) -> Result<Message> {
        self.with_doc_mut(|doc| {
            let message = Message {
                id: doc.next_chirp_id(),
                author_id,
                body: body.to_string(),
            };
            doc.chirps.insert(message.id, message.clone());
            Ok(message)
        })
    }

    /// All chirps ordered by author id, ties broken by chirp id.
    pub fn list_messages(&self) -> Result<Vec<Message>> {
        self.with_doc(|doc| {
            let mut messages: Vec<Message> = doc.chirps.values().cloned().collect();
            messages.sort_by_key(|m| (m.author_id, m.id));
            Ok(messages)
        })
    }

    /// 1-based position within `list_messages` order.
    pub fn message_at(&self, position: u64) -> Result<Message> {
        let not_found = || DbError::NotFound(format!("chirp at position {}", position));

        let index = position
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(not_found)?;

        self.list_messages()?
            .into_iter()
            .nth(index)
            .ok_or_else(not_found)
    }

    pub fn delete_message(&self, requester_id: u64, message_id: u64) -> Result<()> {
        self.with_doc_mut(|doc| {
            let message = doc
                .chirps
                .get(&message_id)
                .ok_or_else(|| DbError::NotFound(format!("chirp {}", message_id)))?;

            if message.author_id != requester_id {
                return Err(DbError::Forbidden {
                    requester: requester_id,
                    message_id,
                });
            }

            doc.chirps.remove(&message_id);
            Ok(())
        })
    }
}
