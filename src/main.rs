//! # dlgs
//!
//! Reddit dialogue corpus generation.
//!
//! ## Getting started
//!
//! ```sh
//! dlgs 0.1.0
//! reddit dialogue corpus generation tool.
//!
//! USAGE:
//!     dlgs <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     download    Download monthly reddit dumps
//!     help        Prints this message or the help of the given subcommand(s)
//!     process     Extract dialogues from comment dumps
//! ```
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=dlgs=info`).
use std::fs::File;
use std::io::Write;

use dlgs::cli;
use dlgs::download::Downloader;
use dlgs::error::Error;
use dlgs::filtering::CommentFilter;
use dlgs::pipeline::{DialoguesBuilder, Pipeline};
use log::{debug, error, info};
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Dlgs::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Dlgs::Download(d) => {
            let dst = d.output_dir.join("reddit_tmp");
            let downloader = Downloader::new(&d.base_url, d.retries)?;
            let results = downloader
                .download(&d.kinds()?, d.dates.months()?, &dst, d.n_tasks)
                .await?;

            let mut error_file = File::create(d.output_dir.join("errors.txt"))?;
            let mut nb_errors = 0;

            // write eventual download errors
            for failure in results.iter().filter_map(|result| result.as_ref().err()) {
                error!("Error during download: {}", failure);
                nb_errors += 1;
                match failure {
                    Error::Download { url, attempts } => writeln!(error_file, "{url}\t{attempts}")?,
                    other => writeln!(error_file, "{other}")?,
                }
            }
            info!(
                "downloaded {} files, {} errors",
                results.len() - nb_errors,
                nb_errors
            );
        }

        cli::Dlgs::Process(p) => {
            let filter = match &p.blocklist {
                Some(path) => CommentFilter::with_blocklist(path)?,
                None => CommentFilter::default(),
            };
            let filter = if p.raw_text { filter.raw_text() } else { filter };

            let mut builder = DialoguesBuilder::default();
            builder
                .src(&p.src())
                .dst(&p.dst())
                .months(p.dates.months()?)
                .dump_interval(p.dump_interval)
                .extractor(p.extractor()?);
            if let Some(workers) = p.workers {
                builder.workers(workers);
            }
            if let Some(valid_split) = p.valid_split {
                builder.valid_split(valid_split);
            }

            let stats = builder.build(filter)?.run()?;
            let nb_samples: usize = stats
                .iter()
                .map(|s| s.train_samples + s.valid_samples)
                .sum();
            info!("{} files processed, {} samples", stats.len(), nb_samples);
        }
    };
    Ok(())
}
