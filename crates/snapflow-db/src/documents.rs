//! Generic CRUD over the shared `documents` collection.

use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use snapflow_types::models::{Photo, User};

use crate::Database;

/// An entity stored in the shared collection.
pub trait Document: Serialize + DeserializeOwned {
    /// Discriminator tag written to the `type` column.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
}

impl Document for User {
    const KIND: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Photo {
    const KIND: &'static str = "photo";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Database {
    pub fn insert_document<D: Document>(&self, doc: &D) -> Result<()> {
        let body = serde_json::to_string(doc)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (id, type, body) VALUES (?1, ?2, ?3)",
                params![doc.id().to_string(), D::KIND, body],
            )?;
            Ok(())
        })
    }

    pub fn get_document<D: Document>(&self, id: &Uuid) -> Result<Option<D>> {
        self.with_conn(|conn| Ok(read_document::<D>(conn, id)?.map(|(doc, _)| doc)))
    }

    /// Insert the document, or fully replace the stored body if the id
    /// already exists. The version counter moves on every replace.
    pub fn upsert_document<D: Document>(&self, doc: &D) -> Result<()> {
        let body = serde_json::to_string(doc)?;
        let id = doc.id();
        self.with_conn(|conn| {
            let written = conn.execute(
                "INSERT INTO documents (id, type, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE
                    SET body = excluded.body, version = documents.version + 1
                    WHERE documents.type = excluded.type",
                params![id.to_string(), D::KIND, body],
            )?;
            if written == 0 {
                bail!("Document {} already exists with a different type", id);
            }
            Ok(())
        })
    }

    /// Read, mutate and write back one document as a single unit.
    ///
    /// Runs inside an IMMEDIATE transaction and only writes if the version
    /// read is still current, so concurrent deltas on the same document
    /// cannot overwrite each other. Returns `None` if the id is unknown.
    pub fn update_document<D, T, F>(&self, id: &Uuid, mutate: F) -> Result<Option<T>>
    where
        D: Document,
        F: FnOnce(&mut D) -> T,
    {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some((mut doc, version)) = read_document::<D>(&tx, id)? else {
                return Ok(None);
            };

            let out = mutate(&mut doc);
            let body = serde_json::to_string(&doc)?;

            let updated = tx.execute(
                "UPDATE documents SET body = ?1, version = version + 1
                 WHERE id = ?2 AND type = ?3 AND version = ?4",
                params![body, id.to_string(), D::KIND, version],
            )?;
            if updated != 1 {
                bail!("Document {} changed since version {}", id, version);
            }

            tx.commit()?;
            Ok(Some(out))
        })
    }
}

/// Fetch a document body and its current version.
fn read_document<D: Document>(conn: &Connection, id: &Uuid) -> Result<Option<(D, i64)>> {
    let row = conn
        .query_row(
            "SELECT body, version FROM documents WHERE id = ?1 AND type = ?2",
            params![id.to_string(), D::KIND],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    match row {
        Some((body, version)) => Ok(Some((serde_json::from_str(&body)?, version))),
        None => Ok(None),
    }
}
