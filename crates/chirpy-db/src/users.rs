use tracing::info;

use crate::password::hash_password;
use crate::{Database, DbError, Result, User};

impl Database {
    /// Emails are matched case-sensitively. The password is hashed before
    /// the exclusive lock is taken; the uniqueness scan and the insert
    /// happen under it.
    pub fn create_user(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;

        let user = self.with_doc_mut(|doc| {
            if doc.users.values().any(|u| u.email == email) {
                return Err(DbError::EmailExists(email.to_string()));
            }

            let user = User {
                id: doc.next_user_id(),
                email: email.to_string(),
                password_hash,
                membership: false,
            };
            doc.users.insert(user.id, user.clone());
            Ok(user)
        })?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.with_doc(|doc| {
            doc.users
                .values()
                .find(|u| u.email == email)
                .cloned()
                .ok_or_else(|| DbError::NotFound(format!("user with email {}", email)))
        })
    }

    pub fn get_user(&self, id: u64) -> Result<User> {
        self.with_doc(|doc| {
            doc.users
                .get(&id)
                .cloned()
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
        })
    }

    /// Overwrite email and password in place. The id and membership flag are
    /// kept; an email already owned by a different user is rejected.
    pub fn update_user(&self, id: u64, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;

        self.with_doc_mut(|doc| {
            if doc.users.values().any(|u| u.id != id && u.email == email) {
                return Err(DbError::EmailExists(email.to_string()));
            }

            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
            user.email = email.to_string();
            user.password_hash = password_hash;
            Ok(user.clone())
        })
    }

    pub fn set_membership(&self, id: u64, membership: bool) -> Result<User> {
        let user = self.with_doc_mut(|doc| {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
            user.membership = membership;
            Ok(user.clone())
        })?;

        info!("User {} membership set to {}", id, membership);
        Ok(user)
    }
}
