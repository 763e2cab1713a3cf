/*! Input reading

Dumps are newline-delimited JSON, usually compressed.
[open_stream] picks a decoder from the file extension, and [lines::Reader] turns lines into records.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::Error;

pub mod lines;

pub use lines::{CommentReader, FromLine, Reader, SampleReader};

/// Recent monthly dumps are compressed with a long window.
const ZSTD_WINDOW_LOG_MAX: u32 = 31;

/// Open `src` for reading, decompressing it depending on its extension:
///
/// - `.zst`: zstd
/// - `.gz`: (multi-member) gzip
/// - anything else is read as is.
pub fn open_stream(src: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    let file = File::open(src)?;
    let extension = src.extension().and_then(|ext| ext.to_str());
    debug!("opening {:?} (extension {:?})", src, extension);

    let stream: Box<dyn BufRead + Send> = match extension {
        Some("zst") => {
            let mut decoder = zstd::stream::read::Decoder::new(file)?;
            decoder.window_log_max(ZSTD_WINDOW_LOG_MAX)?;
            Box::new(BufReader::new(decoder))
        }
        Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    };

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    const CONTENT: &str = "line one\nline two\n";

    fn read_all(path: &Path) -> String {
        let mut s = String::new();
        open_stream(path).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn zstd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.zst");
        let compressed = zstd::encode_all(CONTENT.as_bytes(), 0).unwrap();
        std::fs::write(&path, compressed).unwrap();

        assert_eq!(read_all(&path), CONTENT);
    }

    #[test]
    fn multi_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.gz");
        let mut file = File::create(&path).unwrap();
        // two gzip members, one after the other
        for part in ["line one\n", "line two\n"] {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(part.as_bytes()).unwrap();
            file.write_all(&enc.finish().unwrap()).unwrap();
        }
        drop(file);

        assert_eq!(read_all(&path), CONTENT);
    }

    #[test]
    fn plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        std::fs::write(&path, CONTENT).unwrap();

        assert_eq!(read_all(&path), CONTENT);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            open_stream(Path::new("does/not/exist.zst")),
            Err(Error::Io(_))
        ));
    }
}
