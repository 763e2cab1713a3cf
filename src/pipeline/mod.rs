//! Pipelines.
//!
//! The module provides a light [Pipeline] trait, the building blocks of the comment processing chain
//! ([stages]) and the monthly dialogue extraction pipeline ([Dialogues]).
mod dialogues;
mod message;
#[allow(clippy::module_inception)]
mod pipeline;
pub mod stages;

pub use dialogues::{
    default_workers, input_path, output_paths, process_file, Dialogues, DialoguesBuilder,
    JobOptions, RunStats,
};
pub use message::Message;
pub use pipeline::Pipeline;
