use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Roles --

/// Capability attached to an account. Closed set: every protected endpoint
/// matches on it exhaustively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    #[default]
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Viewer => "viewer",
        }
    }

    /// Whether accounts with this role may publish photos.
    pub fn can_upload(self) -> bool {
        match self {
            Self::Creator => true,
            Self::Viewer => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Users --

/// Stored user document. `password` is always an Argon2 PHC string,
/// never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

// -- Reactions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Wow,
    Sad,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [Self::Like, Self::Love, Self::Wow, Self::Sad];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Wow => "wow",
            Self::Sad => "sad",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction kind '{0}'")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

/// Per-photo reaction counters. Counts only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    pub like: u64,
    pub love: u64,
    pub wow: u64,
    pub sad: u64,
}

impl Reactions {
    pub fn increment(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Love => &mut self.love,
            ReactionKind::Wow => &mut self.wow,
            ReactionKind::Sad => &mut self.sad,
        };
        *counter = counter.saturating_add(1);
    }
}

// -- Photos --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    /// Display name of the uploader, copied at upload time.
    pub creator: String,
    pub reactions: Reactions,
    pub comments: Vec<Comment>,
    pub shares: u64,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// A freshly uploaded photo: zeroed counters, no comments.
    pub fn new(url: String, title: String, creator: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            title,
            creator,
            reactions: Reactions::default(),
            comments: Vec::new(),
            shares: 0,
            created_at: Utc::now(),
        }
    }
}
