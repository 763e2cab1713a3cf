/*! Comment forests and dialogue extraction

Comments are grouped by submission into a [Forest] ([builder]), and chains going from a top-level comment down to a leaf are turned into samples ([extract]).

The forest is built once, on the whole set of admitted comments of a dump, then moved into an [Extractor]:
extraction flags nodes that have been used as responses, and nothing else touches the forest afterwards.
!*/
mod builder;
mod extract;

pub use builder::{Forest, Node, Submission};
pub use extract::{
    ExtractStats, Extracted, Extractor, ExtractorBuilder, ExtractorConfig, Mode,
};
