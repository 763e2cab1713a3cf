/*! Train/validation routing.

A fraction of submissions is sent to a validation file. Routing is done by submission (and not by sample),
so that samples from the same conversation never end up in both files.
!*/
use std::io::Write;

use log::info;

use crate::error::Error;
use crate::forest::Extracted;

use super::{SampleWriter, WriterTrait};

/// Turns a validation fraction into a submission modulus: every `modulus`-th submission goes to validation.
pub fn split_modulus(valid_split: f64) -> Result<usize, Error> {
    if !(valid_split > 0.0 && valid_split <= 1.0) {
        return Err(Error::Custom(format!(
            "validation split has to be in (0, 1], got {valid_split}"
        )));
    }
    Ok(((1.0 / valid_split).round() as usize).max(1))
}

pub struct SplitWriter<W: Write> {
    train: SampleWriter<W>,
    valid: Option<(SampleWriter<W>, usize)>,
}

impl<W: Write> SplitWriter<W> {
    /// Everything goes to `train`.
    pub fn train_only(train: SampleWriter<W>) -> Self {
        Self { train, valid: None }
    }

    /// Submissions whose index is a multiple of `modulus` go to `valid`.
    pub fn with_valid(train: SampleWriter<W>, valid: SampleWriter<W>, modulus: usize) -> Self {
        Self {
            train,
            valid: Some((valid, modulus.max(1))),
        }
    }

    /// (train, validation) sample counts.
    pub fn counts(&self) -> (usize, usize) {
        (
            self.train.count(),
            self.valid.as_ref().map_or(0, |(valid, _)| valid.count()),
        )
    }

    /// Finish both streams, giving back the inner writers.
    pub fn finish(self) -> Result<(W, Option<W>), Error> {
        let (train, valid) = self.counts();
        info!("wrote {} train samples, {} validation samples", train, valid);

        let train = self.train.finish()?;
        let valid = match self.valid {
            Some((valid, _)) => Some(valid.finish()?),
            None => None,
        };
        Ok((train, valid))
    }
}

impl<W: Write> WriterTrait for SplitWriter<W> {
    type Item = Extracted;

    fn write_single(&mut self, extracted: &Extracted) -> Result<(), Error> {
        match &mut self.valid {
            Some((valid, modulus)) if extracted.submission_index % *modulus == 0 => {
                valid.write_single(&extracted.sample)
            }
            _ => self.train.write_single(&extracted.sample),
        }
    }

    fn close(self) -> Result<(), Error> {
        self.finish().map(|_| ())
    }
}
