use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use snapflow_types::models::{Comment, Photo, ReactionKind, Reactions};

use crate::{Database, Document};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// One page of the feed. `before` is the id of the last photo of the
/// previous page; only photos created strictly earlier are returned.
#[derive(Debug, Clone, Copy)]
pub struct FeedPage {
    pub limit: u32,
    pub before: Option<Uuid>,
}

impl Default for FeedPage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            before: None,
        }
    }
}

impl Database {
    pub fn create_photo(&self, photo: &Photo) -> Result<()> {
        self.insert_document(photo)
    }

    pub fn get_photo(&self, id: &Uuid) -> Result<Option<Photo>> {
        self.get_document(id)
    }

    pub fn upsert_photo(&self, photo: &Photo) -> Result<()> {
        self.upsert_document(photo)
    }

    /// Photos, most recently created first.
    pub fn list_photos(&self, page: FeedPage) -> Result<Vec<Photo>> {
        let limit = page.limit.clamp(1, MAX_PAGE_SIZE);
        self.with_conn(|conn| query_photos(conn, limit, page.before))
    }

    // -- Atomic deltas --

    pub fn add_reaction(&self, id: &Uuid, kind: ReactionKind) -> Result<Option<Reactions>> {
        self.update_document(id, |photo: &mut Photo| {
            photo.reactions.increment(kind);
            photo.reactions.clone()
        })
    }

    pub fn add_comment(&self, id: &Uuid, comment: Comment) -> Result<Option<Vec<Comment>>> {
        self.update_document(id, |photo: &mut Photo| {
            photo.comments.push(comment);
            photo.comments.clone()
        })
    }

    pub fn add_share(&self, id: &Uuid) -> Result<Option<u64>> {
        self.update_document(id, |photo: &mut Photo| {
            photo.shares = photo.shares.saturating_add(1);
            photo.shares
        })
    }
}

fn query_photos(conn: &Connection, limit: u32, before: Option<Uuid>) -> Result<Vec<Photo>> {
    // An unknown cursor yields an empty page: `seq < NULL` matches nothing
    let mut stmt = conn.prepare(
        "SELECT body FROM documents
         WHERE type = ?1
           AND (?2 IS NULL OR seq < (SELECT seq FROM documents WHERE id = ?2 AND type = ?1))
         ORDER BY seq DESC
         LIMIT ?3",
    )?;

    let bodies = stmt
        .query_map(
            params![Photo::KIND, before.map(|id| id.to_string()), limit],
            |row| row.get::<_, String>(0),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    bodies
        .iter()
        .map(|body| serde_json::from_str::<Photo>(body).map_err(anyhow::Error::from))
        .collect()
}
