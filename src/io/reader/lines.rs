/*! Line-oriented record reader.
 * !*/
use std::io::BufRead;
use std::marker::PhantomData;
use std::path::Path;

use crate::comment::Comment;
use crate::error::Error;
use crate::sample::Sample;

use super::open_stream;

/// Records that can be built from a single line.
pub trait FromLine: Sized {
    fn from_line(line: &str) -> Result<Self, Error>;
}

impl FromLine for Comment {
    fn from_line(line: &str) -> Result<Self, Error> {
        Comment::decode(line)
    }
}

impl FromLine for Sample {
    fn from_line(line: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Yields one record per non-blank line.
///
/// Decoding errors (including lines that are not valid UTF-8) are yielded as [Error::Decode]
/// and do not stop the iteration,
/// but an I/O error ends it (the underlying stream is most likely truncated or corrupted).
#[derive(Debug)]
pub struct Reader<R, T>
where
    R: BufRead,
{
    reader: R,
    buf: Vec<u8>,
    line_nb: usize,
    failed: bool,
    kind: PhantomData<T>,
}

pub type CommentReader<R> = Reader<R, Comment>;
pub type SampleReader<R> = Reader<R, Sample>;

impl<T: FromLine> Reader<Box<dyn BufRead + Send>, T> {
    /// Open a (possibly compressed) file. See [open_stream].
    pub fn from_path(src: &Path) -> Result<Self, Error> {
        Ok(Self::new(open_stream(src)?))
    }
}

impl<R: BufRead, T: FromLine> Reader<R, T> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_nb: 0,
            failed: false,
            kind: PhantomData,
        }
    }

    /// Number of lines read so far.
    pub fn line_nb(&self) -> usize {
        self.line_nb
    }
}

impl<R: BufRead, T: FromLine> Iterator for Reader<R, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => (),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::Io(e)));
                }
            }
            self.line_nb += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(Error::Decode(format!(
                        "line {}: {}",
                        self.line_nb, e
                    ))))
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(T::from_line(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor, Read};

    use super::*;

    fn gen_data() -> String {
        let lines = [
            r#"{"body":"first","id":"a","link_id":"t3_s","parent_id":"t3_s","subreddit":"rust","author":"x"}"#,
            "",
            r#"{"body":"broken","id":"#,
            r#"{"body":"second","id":"b","link_id":"t3_s","parent_id":"t1_a","subreddit":"rust","author":"y"}"#,
        ];
        lines.join("\n")
    }

    #[test]
    fn skips_blank_and_yields_errors() {
        let mut r: CommentReader<_> = Reader::new(Cursor::new(gen_data()));

        assert_eq!(r.next().unwrap().unwrap().id(), "a");
        assert!(matches!(r.next(), Some(Err(Error::Decode(_)))));
        let second = r.next().unwrap().unwrap();
        assert_eq!(second.parent_id(), "a");
        assert!(r.next().is_none());
        assert_eq!(r.line_nb(), 4);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(br#"{"body":"caf"#);
        data.push(0xff);
        data.extend_from_slice(br#"","id":"a","link_id":"t3_s","parent_id":"t3_s"}"#);
        data.push(b'\n');
        data.extend_from_slice(
            br#"{"body":"next","id":"b","link_id":"t3_s","parent_id":"t3_s"}"#,
        );
        let mut r: CommentReader<_> = Reader::new(Cursor::new(data));

        assert!(matches!(r.next(), Some(Err(Error::Decode(_)))));
        assert_eq!(r.next().unwrap().unwrap().id(), "b");
        assert!(r.next().is_none());
        assert_eq!(r.line_nb(), 2);
    }

    /// Yields its data, then fails.
    struct Truncated(Cursor<Vec<u8>>);

    impl Read for Truncated {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "truncated frame",
                )),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn io_errors_end_iteration() {
        let data = br#"{"body":"first","id":"a","link_id":"t3_s","parent_id":"t3_s"}
{"body":"cut"#
            .to_vec();
        let mut r: CommentReader<_> = Reader::new(BufReader::new(Truncated(Cursor::new(data))));

        assert_eq!(r.next().unwrap().unwrap().id(), "a");
        assert!(matches!(r.next(), Some(Err(Error::Io(_)))));
        assert!(r.next().is_none());
    }

    #[test]
    fn samples() {
        let data = r#"{"context":["a"],"response":"b"}
{"domain":"rust","turns_with_ids":[["1","a"],["2","b"]]}"#;
        let r: SampleReader<_> = Reader::new(Cursor::new(data));
        let samples: Vec<Sample> = r.map(Result::unwrap).collect();
        assert_eq!(samples.len(), 2);
        assert!(matches!(samples[0], Sample::ContextResponse(_)));
        assert!(matches!(samples[1], Sample::Domain(_)));
    }
}
