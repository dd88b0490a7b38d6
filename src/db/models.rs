use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A row of the post listing, with its reaction tallies.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub author: String,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub author: String,
    pub categories: Vec<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub likes: i64,
    pub dislikes: i64,
}

/// What a reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(TargetKind::Post),
            "comment" => Ok(TargetKind::Comment),
            other => Err(format!("Unknown reaction target: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionValue {
    Like,
    Dislike,
}

impl ReactionValue {
    /// Form input normalization: the literal "1" is a like, anything else a dislike.
    pub fn from_form(raw: &str) -> Self {
        if raw == "1" {
            ReactionValue::Like
        } else {
            ReactionValue::Dislike
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            ReactionValue::Like => 1,
            ReactionValue::Dislike => -1,
        }
    }
}

/// Trims a stored timestamp to minute precision for display.
fn short_timestamp(value: &str) -> &str {
    value.get(..16).unwrap_or(value)
}

impl PostSummary {
    pub fn created_short(&self) -> &str {
        short_timestamp(&self.created_at)
    }
}

impl PostDetail {
    pub fn created_short(&self) -> &str {
        short_timestamp(&self.created_at)
    }
}

impl Comment {
    pub fn created_short(&self) -> &str {
        short_timestamp(&self.created_at)
    }
}
