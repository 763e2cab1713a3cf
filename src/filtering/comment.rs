//! Comment-level admissibility.
use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::normalize::{normalize, tokens};
use super::{Admit, Filter};
use crate::comment::Comment;
use crate::error::Error;

const AUTOMODERATOR: &str = "AutoModerator";
const REMOVED_BODIES: [&str; 2] = ["[removed]", "[deleted]"];
const REMOVAL_NOTICE: &str = "your submission has been removed";

lazy_static! {
    /// `http(s)://` followed by at least one host character or percent-encoded byte.
    static ref URL: Regex =
        Regex::new(r"https?://(?:[-\w.]|(?:%[\da-fA-F]{2}))+").expect("invalid url regex");
}

/// Drops comments that are unlikely to make good dialogue turns:
/// bots, removed content, very short/long bodies, links and blocklisted subreddits.
pub struct CommentFilter {
    blocklist: HashSet<String>,
    min_chars: usize,
    max_tokens: usize,
    max_unspaced_chars: usize,
    url_scan_budget: usize,
    normalize: bool,
}

impl CommentFilter {
    /// Load a blocklist of subreddits (whitespace separated names, case insensitive).
    pub fn with_blocklist(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let blocklist: HashSet<String> = content
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        debug!("loaded {} blocklisted subreddits", blocklist.len());

        Ok(Self {
            blocklist,
            ..Default::default()
        })
    }

    /// Keep bodies as-is rather than normalizing them.
    pub fn raw_text(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// Set the number of bytes the link detection may scan before giving up (and rejecting).
    pub fn url_scan_budget(mut self, budget: usize) -> Self {
        self.url_scan_budget = budget;
        self
    }

    fn is_removed(body: &str) -> bool {
        REMOVED_BODIES.contains(&body) || body.to_lowercase().contains(REMOVAL_NOTICE)
    }

    /// Rejects if `body` contains a link.
    /// Content that exceeds the scan budget is rejected without being matched.
    fn has_url(&self, body: &str) -> bool {
        if body.len() > self.url_scan_budget {
            debug!("url scan budget exceeded ({} bytes)", body.len());
            return true;
        }
        URL.is_match(body)
    }
}

impl Default for CommentFilter {
    /// Defaults: 5 characters minimum, 128 tokens maximum,
    /// 2048 characters maximum when the body has no space,
    /// 64KiB link scan budget, normalization on.
    fn default() -> Self {
        Self {
            blocklist: HashSet::new(),
            min_chars: 5,
            max_tokens: 128,
            max_unspaced_chars: 2048,
            url_scan_budget: 1 << 16,
            normalize: true,
        }
    }
}

impl Filter<&Comment> for CommentFilter {
    fn detect(&self, comment: &Comment) -> bool {
        let body = comment.body();
        if body.trim().is_empty() {
            return false;
        }
        if !self.blocklist.is_empty()
            && self.blocklist.contains(&comment.subreddit().to_lowercase())
        {
            return false;
        }
        if comment.author() == AUTOMODERATOR || Self::is_removed(body) {
            return false;
        }

        let nb_chars = body.chars().count();
        if (!body.contains(' ') && nb_chars > self.max_unspaced_chars) || nb_chars < self.min_chars
        {
            return false;
        }
        if tokens(body).nth(self.max_tokens).is_some() {
            return false;
        }
        if !body.chars().next().map_or(false, |c| c.is_ascii()) {
            return false;
        }

        !self.has_url(body)
    }
}

impl Admit for CommentFilter {
    fn admit(&self, comment: &Comment) -> Option<String> {
        if !self.detect(comment) {
            return None;
        }
        if self.normalize {
            Some(normalize(comment.body()))
        } else {
            Some(comment.body().to_string())
        }
    }
}
