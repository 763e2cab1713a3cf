//! Channel messages.

/// What travels between pipeline stages.
///
/// Each producer sends exactly one [Message::EndOfStream] per consumer,
/// so that a consumer knows it is done without having to rely on channel disconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Data(T),
    EndOfStream,
}

