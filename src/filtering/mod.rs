/*! Filtering utilities

Filters decide whether a decoded [crate::comment::Comment] is admissible, and produce the normalized text that will be used as a dialogue turn.

- [filter::Filter] is implemented for stateless keep/drop decisions (see [comment::CommentFilter]).
- [filter::Admit] is what the pipeline's filter workers use: a keep/drop decision plus the normalized text.
! */
pub mod comment;
mod filter;
pub mod normalize;

pub use comment::CommentFilter;
pub use filter::Admit;
pub use filter::Filter;
