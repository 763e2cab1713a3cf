/*! Compressed sample writer.

Samples are serialized as JSON lines into a zstd stream.
The stream is flushed every `dump_interval` samples, so that an interrupted run still leaves readable data,
and the zstd frame is finished on [WriterTrait::close].
!*/
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use zstd::stream::write::Encoder;

use crate::error::Error;
use crate::sample::Sample;

use super::WriterTrait;

pub struct SampleWriter<W: Write> {
    encoder: Encoder<'static, W>,
    dump_interval: usize,
    count: usize,
}

impl SampleWriter<BufWriter<File>> {
    /// Create (or truncate) `dst`.
    pub fn create(dst: &Path, dump_interval: usize) -> Result<Self, Error> {
        debug!("creating sample file {:?}", dst);
        let file = BufWriter::new(File::create(dst)?);
        Self::new(file, dump_interval)
    }
}

impl<W: Write> SampleWriter<W> {
    /// `dump_interval` of 0 is treated as 1.
    pub fn new(inner: W, dump_interval: usize) -> Result<Self, Error> {
        Ok(Self {
            encoder: Encoder::new(inner, 0)?,
            dump_interval: dump_interval.max(1),
            count: 0,
        })
    }

    /// Number of samples written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Finish the zstd frame and give back the inner writer.
    pub fn finish(self) -> Result<W, Error> {
        let mut inner = self.encoder.finish()?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> WriterTrait for SampleWriter<W> {
    type Item = Sample;

    fn write_single(&mut self, sample: &Sample) -> Result<(), Error> {
        serde_json::to_writer(&mut self.encoder, sample)?;
        self.encoder.write_all(b"\n")?;
        self.count += 1;

        if self.count % self.dump_interval == 0 {
            self.encoder.flush()?;
        }
        Ok(())
    }

    fn close(self) -> Result<(), Error> {
        self.finish().map(|_| ())
    }
}
