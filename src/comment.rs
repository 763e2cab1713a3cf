/*! Comments

A [Comment] is decoded from one line of a monthly comment dump.
Upstream ids carry a type prefix (`t1_` for comments, `t3_` for submissions) that is stripped at decoding time,
so that `parent_id` can be matched directly against both comment ids and submission ids.
!*/
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Length of the type prefix found on `link_id` and `parent_id`.
const PREFIX_LEN: usize = 3;

/// Raw record, as it is found in the dump.
#[derive(Debug, Deserialize)]
struct RawComment {
    body: String,
    id: String,
    link_id: String,
    parent_id: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    author: String,
}

/// A decoded comment. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    body: String,
    id: String,
    submission_id: String,
    parent_id: String,
    subreddit: String,
    author: String,
}

impl Comment {
    pub fn new(
        body: String,
        id: String,
        submission_id: String,
        parent_id: String,
        subreddit: String,
        author: String,
    ) -> Self {
        Self {
            body,
            id,
            submission_id,
            parent_id,
            subreddit,
            author,
        }
    }

    /// Decode a single dump line.
    pub fn decode(line: &str) -> Result<Self, Error> {
        let raw: RawComment =
            serde_json::from_str(line).map_err(|e| Error::Decode(e.to_string()))?;
        let submission_id = strip_prefix(&raw.link_id)?;
        let parent_id = strip_prefix(&raw.parent_id)?;

        Ok(Self {
            body: raw.body,
            id: raw.id,
            submission_id,
            parent_id,
            subreddit: raw.subreddit,
            author: raw.author,
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// id of the root-level post (`link_id` without its prefix).
    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    /// id of the parent comment, or the submission id for top-level comments.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

fn strip_prefix(id: &str) -> Result<String, Error> {
    id.get(PREFIX_LEN..)
        .filter(|stripped| !stripped.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::Decode(format!("id {id:?} has no type prefix")))
}

/// An admitted comment, as gathered by the collector.
///
/// `content` is the normalized text returned by the admissibility filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admitted {
    pub content: String,
    pub id: String,
    pub submission_id: String,
    pub parent_id: String,
    pub subreddit: String,
}

impl Admitted {
    /// Build from a comment and the normalized content the filter produced.
    pub fn from_comment(comment: Comment, content: String) -> Self {
        Self {
            content,
            id: comment.id,
            submission_id: comment.submission_id,
            parent_id: comment.parent_id,
            subreddit: comment.subreddit,
        }
    }
}
