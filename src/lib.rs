/*! # dlgs

Turns monthly reddit comment dumps into dialogue samples.

Comments are decoded and filtered on worker threads, gathered into a forest of reply trees (one per submission),
and every root-to-leaf reply chain is turned into context/response samples
(or whole dialogues tagged with their subreddit), written as zstd-compressed JSON lines.

The crate can be used as a tool (see the `dlgs` binary) or as a library:

```no_run
use std::path::Path;
use dlgs::filtering::CommentFilter;
use dlgs::month::MonthRange;
use dlgs::pipeline::{DialoguesBuilder, Pipeline};

let pipeline = DialoguesBuilder::default()
    .src(Path::new("res/reddit_tmp"))
    .dst(Path::new("res/processed_data"))
    .months(MonthRange::new(2022, 1, 2022, 5)?)
    .build(CommentFilter::default())?;
for stats in pipeline.run()? {
    stats.log();
}
# Ok::<(), dlgs::error::Error>(())
```
!*/
pub mod cli;
pub mod comment;
pub mod download;
pub mod error;
pub mod filtering;
pub mod forest;
pub mod io;
pub mod month;
pub mod pipeline;
pub mod sample;
