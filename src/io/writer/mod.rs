/*!
# Sample writing

[SampleWriter] appends samples to a zstd-compressed JSON lines stream,
and [SplitWriter] routes samples between a train and a validation [SampleWriter] depending on their submission.

Both implement [WriterTrait].
!*/
mod samples;
mod split;
mod writertrait;

pub use samples::SampleWriter;
pub use split::{split_modulus, SplitWriter};
pub use writertrait::WriterTrait;
