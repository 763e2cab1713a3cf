/*! Dialogue extraction pipeline.

For each month of the range, the comment dump `RC_YYYY-MM.zst` (or `.gz`) is read, filtered, and gathered
into a [Forest], which is then walked to produce samples written in `DLGS_YYYY_MM.zst`
(and `DLGS_YYYY_MM_valid.zst` if a validation split is set).

Months are processed one after the other. A failing month is logged and skipped, and the pipeline returns an
[Error::Jobs] listing every failure at the end.
!*/
use std::any::Any;
use std::path::{Path, PathBuf};

use crossbeam::channel::bounded;
use log::{error, info, warn};

use crate::error::Error;
use crate::filtering::Admit;
use crate::forest::{ExtractStats, Extractor, ExtractorBuilder, ExtractorConfig, Forest};
use crate::io::reader::CommentReader;
use crate::io::writer::{split_modulus, SampleWriter, SplitWriter, WriterTrait};
use crate::month::MonthRange;

use super::stages::{self, FilterStats, ReadStats};
use super::Pipeline;

/// Queue capacity per filter worker.
const QUEUE_FACTOR: usize = 1000;

/// Per-file job settings.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOptions {
    pub workers: usize,
    pub dump_interval: usize,
    pub valid_split: Option<f64>,
    pub extractor: ExtractorConfig,
}

impl Default for JobOptions {
    /// [default_workers] workers, flush every 1024 samples, no validation split,
    /// and the default [ExtractorConfig].
    fn default() -> Self {
        Self {
            workers: default_workers(),
            dump_interval: 1024,
            valid_split: None,
            extractor: ExtractorBuilder::default().build_or_default(),
        }
    }
}

/// Available parallelism minus one (for the reader), at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// What happened to a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub src: PathBuf,
    pub read: ReadStats,
    pub filtered: FilterStats,
    pub submissions: usize,
    pub nodes: usize,
    pub extract: ExtractStats,
    pub train_samples: usize,
    pub valid_samples: usize,
}

impl RunStats {
    pub fn log(&self) {
        info!(
            "{:?}: {} records, {} decode errors, {} admitted, {} rejected",
            self.src,
            self.read.records,
            self.read.decode_errors,
            self.filtered.admitted,
            self.filtered.rejected()
        );
        info!(
            "{:?}: {} submissions, {} comments, {} chains ({} incomplete, {} too short)",
            self.src,
            self.submissions,
            self.nodes,
            self.extract.chains,
            self.extract.incomplete_chains,
            self.extract.short_chains
        );
        for (length, count) in &self.extract.by_length {
            info!("{:?}: length {}: {} samples", self.src, length, count);
        }
        info!(
            "{:?}: {} train samples, {} validation samples",
            self.src, self.train_samples, self.valid_samples
        );
    }
}

fn panic_to_error(payload: Box<dyn Any + Send>) -> Error {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    Error::WorkerPanic(msg)
}

/// Run the whole chain on a single comment file.
///
/// `valid_dst` has to be provided along with [JobOptions::valid_split], and is ignored otherwise.
pub fn process_file<A>(
    src: &Path,
    dst: &Path,
    valid_dst: Option<&Path>,
    admit: &A,
    options: &JobOptions,
) -> Result<RunStats, Error>
where
    A: Admit + ?Sized,
{
    let split = match (options.valid_split, valid_dst) {
        (Some(p), Some(valid_dst)) => Some((split_modulus(p)?, valid_dst)),
        (Some(_), None) => {
            return Err(Error::Custom(
                "a validation split needs a validation destination".to_string(),
            ))
        }
        (None, _) => None,
    };

    let records = CommentReader::from_path(src)?;
    let workers = options.workers.max(1);
    let (comment_tx, comment_rx) = bounded(QUEUE_FACTOR * workers);
    let (admitted_tx, admitted_rx) = bounded(QUEUE_FACTOR * workers);
    info!("{:?}: reading with {} filter workers", src, workers);

    let (read, filtered, admitted) = crossbeam::scope(|s| {
        let reader = s.spawn(move |_| stages::read(records, &comment_tx, workers));

        let filters: Vec<_> = (0..workers)
            .map(|_| {
                let rx = comment_rx.clone();
                let tx = admitted_tx.clone();
                s.spawn(move |_| stages::filter(&rx, &tx, admit))
            })
            .collect();

        // only workers hold channel ends from now on
        drop(comment_rx);
        drop(admitted_tx);

        let admitted = stages::collect(&admitted_rx, workers);

        let mut filtered = FilterStats::default();
        for handle in filters {
            filtered += handle.join().map_err(panic_to_error)?;
        }
        let read = reader.join().map_err(panic_to_error)??;

        Ok::<_, Error>((read, filtered, admitted))
    })
    .map_err(panic_to_error)??;

    let forest = Forest::from_admitted(admitted);
    let (submissions, nodes) = (forest.nb_submissions(), forest.nb_nodes());

    let train = SampleWriter::create(dst, options.dump_interval)?;
    let mut writer = match split {
        Some((modulus, valid_dst)) => SplitWriter::with_valid(
            train,
            SampleWriter::create(valid_dst, options.dump_interval)?,
            modulus,
        ),
        None => SplitWriter::train_only(train),
    };

    let mut extractor = Extractor::new(forest, options.extractor.clone());
    for extracted in extractor.by_ref() {
        writer.write_single(&extracted)?;
    }
    let (train_samples, valid_samples) = writer.counts();
    writer.close()?;

    Ok(RunStats {
        src: src.to_path_buf(),
        read,
        filtered,
        submissions,
        nodes,
        extract: extractor.stats().clone(),
        train_samples,
        valid_samples,
    })
}

/// Comment dump for a given month: `RC_YYYY-MM.zst`, or `RC_YYYY-MM.gz` if only that one exists.
pub fn input_path(src: &Path, year: i32, month: u32) -> PathBuf {
    let zst = src.join(format!("RC_{year}-{month:02}.zst"));
    if zst.exists() {
        return zst;
    }
    let gz = src.join(format!("RC_{year}-{month:02}.gz"));
    if gz.exists() {
        gz
    } else {
        zst
    }
}

/// Train and validation outputs for a given month.
pub fn output_paths(dst: &Path, year: i32, month: u32) -> (PathBuf, PathBuf) {
    (
        dst.join(format!("DLGS_{year}_{month:02}.zst")),
        dst.join(format!("DLGS_{year}_{month:02}_valid.zst")),
    )
}

/// Monthly dialogue extraction. Build it with [DialoguesBuilder].
pub struct Dialogues<A: Admit> {
    src: PathBuf,
    dst: PathBuf,
    months: MonthRange,
    admit: A,
    options: JobOptions,
}

impl<A: Admit> Dialogues<A> {
    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn months(&self) -> MonthRange {
        self.months
    }
}

impl<A: Admit> Pipeline<Vec<RunStats>> for Dialogues<A> {
    fn run(&self) -> Result<Vec<RunStats>, Error> {
        if !self.dst.exists() {
            warn!("Destination {:?} does not exist. Creating", self.dst);
            std::fs::create_dir_all(&self.dst)?;
        }
        if !self.dst.is_dir() {
            return Err(Error::Custom(format!(
                "destination has to be a directory: {:?}",
                self.dst
            )));
        }

        let mut all_stats = Vec::new();
        let mut failures = Vec::new();

        for (year, month) in self.months {
            let src = input_path(&self.src, year, month);
            let (dst, valid_dst) = output_paths(&self.dst, year, month);
            info!("processing {:?} into {:?}", src, dst);

            let valid_dst = self.options.valid_split.map(|_| valid_dst.as_path());
            match process_file(&src, &dst, valid_dst, &self.admit, &self.options) {
                Ok(stats) => {
                    stats.log();
                    all_stats.push(stats);
                }
                Err(e) => {
                    error!("{:?}: {}", src, e);
                    failures.push((src, e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            Ok(all_stats)
        } else {
            Err(Error::Jobs(failures))
        }
    }
}

/// Builder for [Dialogues].
///
/// `src` and `dst` are mandatory. Other settings default to:
/// - months: 2022-05 only
/// - the [JobOptions] defaults.
#[derive(Debug, Default)]
pub struct DialoguesBuilder {
    src: Option<PathBuf>,
    dst: Option<PathBuf>,
    months: Option<MonthRange>,
    workers: Option<usize>,
    dump_interval: Option<usize>,
    valid_split: Option<f64>,
    extractor: Option<ExtractorConfig>,
}

impl DialoguesBuilder {
    /// Directory holding `RC_*` dumps.
    pub fn src(&mut self, src: &Path) -> &mut DialoguesBuilder {
        self.src = Some(src.to_path_buf());
        self
    }

    /// Directory receiving `DLGS_*` files.
    pub fn dst(&mut self, dst: &Path) -> &mut DialoguesBuilder {
        self.dst = Some(dst.to_path_buf());
        self
    }

    pub fn months(&mut self, months: MonthRange) -> &mut DialoguesBuilder {
        self.months = Some(months);
        self
    }

    pub fn workers(&mut self, workers: usize) -> &mut DialoguesBuilder {
        self.workers = Some(workers);
        self
    }

    pub fn dump_interval(&mut self, dump_interval: usize) -> &mut DialoguesBuilder {
        self.dump_interval = Some(dump_interval);
        self
    }

    /// Fraction of submissions sent to validation files.
    pub fn valid_split(&mut self, valid_split: f64) -> &mut DialoguesBuilder {
        self.valid_split = Some(valid_split);
        self
    }

    pub fn extractor(&mut self, extractor: ExtractorConfig) -> &mut DialoguesBuilder {
        self.extractor = Some(extractor);
        self
    }

    pub fn build<A: Admit>(&self, admit: A) -> Result<Dialogues<A>, Error> {
        let (src, dst) = match (&self.src, &self.dst) {
            (Some(src), Some(dst)) => (src.clone(), dst.clone()),
            _ => {
                return Err(Error::Custom(
                    "source and destination directories are required".to_string(),
                ))
            }
        };
        if let Some(p) = self.valid_split {
            split_modulus(p)?;
        }
        if self.workers == Some(0) {
            return Err(Error::Custom("at least one worker is needed".to_string()));
        }

        let defaults = JobOptions::default();
        let options = JobOptions {
            workers: self.workers.unwrap_or(defaults.workers),
            dump_interval: self.dump_interval.unwrap_or(defaults.dump_interval),
            valid_split: self.valid_split,
            extractor: self.extractor.clone().unwrap_or(defaults.extractor),
        };
        let months = match self.months {
            Some(months) => months,
            None => MonthRange::single(2022, 5)?,
        };

        Ok(Dialogues {
            src,
            dst,
            months,
            admit,
            options,
        })
    }
}
