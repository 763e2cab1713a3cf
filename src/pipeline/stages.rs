/*! Pipeline stages.

```text
         ┌──────────┐
reader ──┤ filter 1 ├──┐
   │     ├──────────┤  │
   ├─────┤ filter 2 ├──┼── collector
   │     ├──────────┤  │
   └─────┤ filter n ├──┘
         └──────────┘
```

The reader and the collector are single threaded, filters run on `n` threads.
Stages communicate through bounded channels, and termination is signaled with [Message::EndOfStream].
!*/
use std::ops::AddAssign;

use crossbeam::channel::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::comment::{Admitted, Comment};
use crate::error::Error;
use crate::filtering::Admit;

use super::Message;

const READ_LOG_INTERVAL: usize = 100_000;
const FILTER_LOG_INTERVAL: usize = 10_000;

/// Reader counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Records (valid or not) read from the source.
    pub records: usize,
    pub decode_errors: usize,
}

/// Filter counters. Summed over workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub received: usize,
    pub admitted: usize,
}

impl FilterStats {
    pub fn rejected(&self) -> usize {
        self.received - self.admitted
    }
}

impl AddAssign for FilterStats {
    fn add_assign(&mut self, other: Self) {
        self.received += other.received;
        self.admitted += other.admitted;
    }
}

/// Sends every decoded comment of `records` to `tx`, then one [Message::EndOfStream] per consumer.
///
/// Decoding errors are counted and skipped.
/// An I/O error stops the reading: end of stream messages are still sent,
/// and the error is returned once they are.
pub fn read<I>(
    records: I,
    tx: &Sender<Message<Comment>>,
    nb_consumers: usize,
) -> Result<ReadStats, Error>
where
    I: IntoIterator<Item = Result<Comment, Error>>,
{
    let mut stats = ReadStats::default();
    let mut failure = None;

    for record in records {
        stats.records += 1;
        if stats.records % READ_LOG_INTERVAL == 0 {
            info!("read {} records", stats.records);
        }

        match record {
            Ok(comment) => {
                if tx.send(Message::Data(comment)).is_err() {
                    failure = Some(Error::Custom("all filter workers are gone".to_string()));
                    break;
                }
            }
            Err(Error::Io(e)) => {
                error!("stopping read after record {}: {}", stats.records, e);
                failure = Some(Error::Io(e));
                break;
            }
            Err(e) => {
                debug!("record {}: {}", stats.records, e);
                stats.decode_errors += 1;
            }
        }
    }

    for _ in 0..nb_consumers {
        if tx.send(Message::EndOfStream).is_err() {
            break;
        }
    }

    if stats.decode_errors > 0 {
        warn!(
            "{} records out of {} could not be decoded",
            stats.decode_errors, stats.records
        );
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(stats),
    }
}

/// Receives comments until an end of stream message (or a disconnection),
/// forwards admitted ones, then forwards the end of stream.
pub fn filter<A>(
    rx: &Receiver<Message<Comment>>,
    tx: &Sender<Message<Admitted>>,
    admit: &A,
) -> FilterStats
where
    A: Admit + ?Sized,
{
    let mut stats = FilterStats::default();

    while let Ok(message) = rx.recv() {
        let comment = match message {
            Message::Data(comment) => comment,
            Message::EndOfStream => break,
        };
        stats.received += 1;

        if let Some(content) = admit.admit(&comment) {
            stats.admitted += 1;
            if stats.admitted % FILTER_LOG_INTERVAL == 0 {
                debug!("{:?}: admitted {} comments", std::thread::current().id(), stats.admitted);
            }
            if tx
                .send(Message::Data(Admitted::from_comment(comment, content)))
                .is_err()
            {
                error!("collector is gone, stopping filter worker");
                return stats;
            }
        }
    }

    // the collector may already be gone
    let _ = tx.send(Message::EndOfStream);
    stats
}

/// Gathers admitted comments until `nb_producers` end of stream messages were received,
/// or until every producer is gone.
pub fn collect(rx: &Receiver<Message<Admitted>>, nb_producers: usize) -> Vec<Admitted> {
    let mut collected = Vec::new();
    let mut remaining = nb_producers;

    while remaining > 0 {
        match rx.recv() {
            Ok(Message::Data(admitted)) => collected.push(admitted),
            Ok(Message::EndOfStream) => remaining -= 1,
            Err(_) => {
                warn!("{} producer(s) left without signaling end of stream", remaining);
                break;
            }
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::{bounded, unbounded};

    use super::*;
    use crate::filtering::CommentFilter;

    fn comment(id: &str, body: &str) -> Comment {
        Comment::new(
            body.to_string(),
            id.to_string(),
            "sub".to_string(),
            "sub".to_string(),
            "rust".to_string(),
            "someone".to_string(),
        )
    }

    #[test]
    fn read_sends_one_end_per_consumer() {
        let (tx, rx) = unbounded();
        let records = vec![
            Ok(comment("a", "first comment")),
            Err(Error::Decode("bad".to_string())),
            Ok(comment("b", "second comment")),
        ];

        let stats = read(records, &tx, 3).unwrap();
        assert_eq!(
            stats,
            ReadStats {
                records: 3,
                decode_errors: 1
            }
        );

        drop(tx);
        let messages: Vec<_> = rx.iter().collect();
        assert_eq!(messages.len(), 5);
        assert_eq!(
            messages
                .iter()
                .filter(|m| matches!(m, Message::EndOfStream))
                .count(),
            3
        );
        assert!(messages[..2].iter().all(|m| matches!(m, Message::Data(_))));
    }

    #[test]
    fn read_stops_on_io_error() {
        let (tx, rx) = unbounded();
        let records = vec![
            Ok(comment("a", "first comment")),
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated",
            ))),
            Ok(comment("b", "never read")),
        ];

        assert!(read(records, &tx, 2).is_err());
        drop(tx);
        let messages: Vec<_> = rx.iter().collect();
        assert_eq!(
            messages,
            vec![
                Message::Data(comment("a", "first comment")),
                Message::EndOfStream,
                Message::EndOfStream
            ]
        );
    }

    #[test]
    fn filter_forwards_end() {
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();

        in_tx.send(Message::Data(comment("a", "a regular comment"))).unwrap();
        in_tx.send(Message::Data(comment("b", "[deleted]"))).unwrap();
        in_tx.send(Message::EndOfStream).unwrap();
        in_tx.send(Message::Data(comment("c", "after the end"))).unwrap();

        let stats = filter(&in_rx, &out_tx, &CommentFilter::default());
        assert_eq!(stats.received, 2);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.rejected(), 1);

        drop(out_tx);
        let out: Vec<_> = out_rx.iter().collect();
        assert_eq!(out.len(), 2);
        match &out[0] {
            Message::Data(admitted) => assert_eq!(admitted.id, "a"),
            Message::EndOfStream => panic!("expected data"),
        }
        assert_eq!(out[1], Message::EndOfStream);
    }

    #[test]
    fn collect_counts_producers() {
        let (tx, rx) = unbounded();
        let admitted = |id: &str| {
            Message::Data(Admitted::from_comment(
                comment(id, "body"),
                "body".to_string(),
            ))
        };
        tx.send(admitted("a")).unwrap();
        tx.send(Message::EndOfStream).unwrap();
        tx.send(admitted("b")).unwrap();
        tx.send(Message::EndOfStream).unwrap();

        // tx is still alive: collect must stop on the end messages
        let collected = collect(&rx, 2);
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn collect_survives_disconnection() {
        let (tx, rx) = bounded(4);
        tx.send(Message::EndOfStream).unwrap();
        drop(tx);
        assert!(collect(&rx, 3).is_empty());
    }

    #[test]
    fn stages_end_to_end() {
        let nb_workers = 4;
        let (comment_tx, comment_rx) = bounded(8);
        let (admitted_tx, admitted_rx) = bounded(8);
        let admit = CommentFilter::default();

        let records: Vec<Result<Comment, Error>> = (0..1000)
            .map(|i| Ok(comment(&format!("c{i}"), &format!("comment number {i}"))))
            .collect();

        let (read_stats, collected) = crossbeam::scope(|s| {
            let reader = s.spawn(|_| read(records, &comment_tx, nb_workers));
            for _ in 0..nb_workers {
                let rx = comment_rx.clone();
                let tx = admitted_tx.clone();
                let admit = &admit;
                s.spawn(move |_| filter(&rx, &tx, admit));
            }
            let collected = collect(&admitted_rx, nb_workers);
            (reader.join().unwrap(), collected)
        })
        .unwrap();

        assert_eq!(read_stats.unwrap().records, 1000);
        assert_eq!(collected.len(), 1000);
    }
}
