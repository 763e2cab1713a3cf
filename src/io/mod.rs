/*!
# IO utilities

Comment dump reading ([reader]) and dialogue sample writing ([writer]).
Written samples can be read back with [reader::SampleReader].
!*/
pub mod reader;
pub mod writer;
