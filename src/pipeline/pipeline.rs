//! Pipeline trait.
use crate::error::Error;

/// Implemented by each runnable pipeline.
///
/// Generic over the return type so that pipelines can report
/// what they did (see [super::RunStats]).
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
