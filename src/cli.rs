//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use crate::download::DumpKind;
use crate::error::Error;
use crate::forest::{ExtractorBuilder, ExtractorConfig, Mode};
use crate::month::MonthRange;

#[derive(Debug, StructOpt)]
#[structopt(name = "dlgs", about = "reddit dialogue corpus generation tool.")]
/// Holds every command that is callable by the `dlgs` command.
pub enum Dlgs {
    #[structopt(about = "Download monthly reddit dumps")]
    Download(Download),
    #[structopt(about = "Extract dialogues from comment dumps")]
    Process(Process),
}

/// Inclusive range of months to work on.
#[derive(Debug, StructOpt)]
pub struct Dates {
    #[structopt(long = "start-year", default_value = "2022", help = "starting year")]
    pub start_year: i32,
    #[structopt(long = "end-year", default_value = "2022", help = "end year")]
    pub end_year: i32,
    #[structopt(long = "start-month", default_value = "5", help = "starting month")]
    pub start_month: u32,
    #[structopt(long = "end-month", default_value = "5", help = "end month")]
    pub end_month: u32,
}

impl Dates {
    pub fn months(&self) -> Result<MonthRange, Error> {
        MonthRange::new(
            self.start_year,
            self.start_month,
            self.end_year,
            self.end_month,
        )
    }
}

#[derive(Debug, StructOpt)]
/// Download command and parameters.
/// ```sh
/// dlgs-download 0.1.0
/// Download monthly reddit dumps
///
/// USAGE:
///     dlgs download [OPTIONS]
///
/// OPTIONS:
///         --base-url <base-url>          archive location [default: https://files.pushshift.io/reddit/]
///         --kind <kind>                  comments, submissions or both [default: both]
///     -t <n-tasks>                       number of concurrent downloads [default: 4]
///     -o, --output-dir <output-dir>      dumps go in <output-dir>/reddit_tmp [default: res/]
///         --retries <retries>            attempts per file [default: 5]
/// ```
pub struct Download {
    #[structopt(flatten)]
    pub dates: Dates,
    #[structopt(
        short = "o",
        long = "output-dir",
        parse(from_os_str),
        default_value = "res/",
        help = "dumps go in <output-dir>/reddit_tmp"
    )]
    pub output_dir: PathBuf,
    #[structopt(
        long = "kind",
        default_value = "both",
        help = "comments, submissions or both"
    )]
    pub kind: String,
    #[structopt(
        short = "t",
        default_value = "4",
        help = "number of concurrent downloads"
    )]
    pub n_tasks: usize,
    #[structopt(long = "retries", default_value = "5", help = "attempts per file")]
    pub retries: usize,
    #[structopt(
        long = "base-url",
        default_value = "https://files.pushshift.io/reddit/",
        help = "archive location"
    )]
    pub base_url: String,
}

impl Download {
    pub fn kinds(&self) -> Result<Vec<DumpKind>, Error> {
        match self.kind.as_str() {
            "both" => Ok(vec![DumpKind::Comments, DumpKind::Submissions]),
            other => Ok(vec![other.parse()?]),
        }
    }
}

#[derive(Debug, StructOpt)]
/// Process command and parameters.
///
/// Reads `RC_YYYY-MM.zst` from `<output-dir>/reddit_tmp`,
/// writes `DLGS_YYYY_MM.zst` in `<output-dir>/processed_data`.
pub struct Process {
    #[structopt(flatten)]
    pub dates: Dates,
    #[structopt(
        short = "o",
        long = "output-dir",
        parse(from_os_str),
        default_value = "res/",
        help = "working directory"
    )]
    pub output_dir: PathBuf,
    #[structopt(
        long = "max-context-length",
        default_value = "6",
        help = "maximum number of turns before a response"
    )]
    pub max_context_length: usize,
    #[structopt(
        long = "min-dialogue-length",
        default_value = "2",
        help = "minimum number of turns of a chain"
    )]
    pub min_dialogue_length: usize,
    #[structopt(
        long = "mode",
        default_value = "context",
        help = "context (context/response pairs) or domain (whole chains with subreddit)"
    )]
    pub mode: Mode,
    #[structopt(
        long = "dump-interval",
        default_value = "1024",
        help = "number of samples between output flushes"
    )]
    pub dump_interval: usize,
    #[structopt(
        long = "valid-split",
        help = "fraction of submissions written to validation files"
    )]
    pub valid_split: Option<f64>,
    #[structopt(
        short = "t",
        long = "workers",
        help = "number of filter workers. Default is available parallelism - 1."
    )]
    pub workers: Option<usize>,
    #[structopt(
        long = "blocklist",
        parse(from_os_str),
        help = "file of subreddits to drop"
    )]
    pub blocklist: Option<PathBuf>,
    #[structopt(long = "raw-text", help = "keep comment bodies as-is")]
    pub raw_text: bool,
}

impl Process {
    pub fn src(&self) -> PathBuf {
        self.output_dir.join("reddit_tmp")
    }

    pub fn dst(&self) -> PathBuf {
        self.output_dir.join("processed_data")
    }

    pub fn extractor(&self) -> Result<ExtractorConfig, Error> {
        ExtractorBuilder::default()
            .mode(self.mode)
            .max_context_length(self.max_context_length)
            .min_dialogue_length(self.min_dialogue_length)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::BASE_URL;

    #[test]
    fn process_defaults() {
        let opt = Dlgs::from_iter_safe(["dlgs", "process"]).unwrap();
        let p = match opt {
            Dlgs::Process(p) => p,
            Dlgs::Download(_) => panic!("expected process"),
        };
        assert_eq!(p.dates.months().unwrap(), MonthRange::single(2022, 5).unwrap());
        assert_eq!(p.src(), PathBuf::from("res/reddit_tmp"));
        assert_eq!(p.dst(), PathBuf::from("res/processed_data"));
        assert_eq!(p.dump_interval, 1024);
        assert_eq!(p.valid_split, None);
        assert!(!p.raw_text);

        let extractor = p.extractor().unwrap();
        assert_eq!(extractor.mode(), Mode::Context);
        assert_eq!(extractor.max_context_length(), 6);
    }

    #[test]
    fn process_options() {
        let opt = Dlgs::from_iter_safe([
            "dlgs",
            "process",
            "--mode",
            "domain",
            "--start-year",
            "2021",
            "--start-month",
            "11",
            "--valid-split",
            "0.1",
            "-t",
            "3",
        ])
        .unwrap();
        let p = match opt {
            Dlgs::Process(p) => p,
            Dlgs::Download(_) => panic!("expected process"),
        };
        assert_eq!(p.mode, Mode::Domain);
        assert_eq!(p.dates.months().unwrap().start(), (2021, 11));
        assert_eq!(p.valid_split, Some(0.1));
        assert_eq!(p.workers, Some(3));
    }

    #[test]
    fn download_kinds() {
        let opt = Dlgs::from_iter_safe(["dlgs", "download", "--kind", "comments"]).unwrap();
        let d = match opt {
            Dlgs::Download(d) => d,
            Dlgs::Process(_) => panic!("expected download"),
        };
        assert_eq!(d.kinds().unwrap(), vec![DumpKind::Comments]);
        assert_eq!(d.n_tasks, 4);
        assert_eq!(d.base_url, BASE_URL);
    }
}
