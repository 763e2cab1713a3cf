//! Filtering traits.
use crate::comment::Comment;

/// immutable, pure filter (2 successive equal inputs -> 2 equal outputs)
///
/// `detect` returns `true` when the item is kept.
pub trait Filter<T>: Default {
    fn detect(&self, item: T) -> bool;
}

/// Admission of a comment into the dialogue corpus.
///
/// Returns the normalized text that will be used as the dialogue turn,
/// or [None] if the comment is rejected.
/// Implementations have to be shareable between filter workers.
pub trait Admit: Sync {
    fn admit(&self, comment: &Comment) -> Option<String>;
}
