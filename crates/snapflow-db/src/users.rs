use anyhow::{Result, bail};
use rusqlite::{OptionalExtension, params};

use snapflow_types::models::User;

use crate::{Database, Document};

impl Database {
    /// Exact-match lookup on the email of a user document.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let body: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT body FROM documents
                     WHERE type = ?1 AND json_extract(body, '$.email') = ?2
                     ORDER BY seq
                     LIMIT 1",
                    params![User::KIND, email],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Store a new user. Uniqueness of the email is the caller's pre-check;
    /// the collection itself does not enforce it.
    pub fn create_user(&self, user: &User) -> Result<()> {
        // PHC strings ("$argon2id$v=19$...") always start with '$'
        if !user.password.starts_with('$') {
            bail!("Refusing to store user {} without a hashed password", user.id);
        }
        self.insert_document(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use snapflow_types::models::Role;
    use uuid::Uuid;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: email.into(),
            role: Role::Creator,
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn finds_user_by_exact_email() {
        let db = Database::open_in_memory().unwrap();
        let ann = user("ann@example.com");
        db.create_user(&ann).unwrap();
        db.create_user(&user("bob@example.com")).unwrap();

        let found = db.find_user_by_email("ann@example.com").unwrap().unwrap();
        assert_eq!(found.id, ann.id);
        assert_eq!(found.role, Role::Creator);

        assert!(db.find_user_by_email("ANN@example.com").unwrap().is_none());
        assert!(db.find_user_by_email("carol@example.com").unwrap().is_none());
    }

    #[test]
    fn rejects_plaintext_password() {
        let db = Database::open_in_memory().unwrap();
        let mut ann = user("ann@example.com");
        ann.password = "hunter22".into();
        assert!(db.create_user(&ann).is_err());
        assert!(db.find_user_by_email("ann@example.com").unwrap().is_none());
    }
}
