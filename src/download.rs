/*! Monthly dump downloading.

Dumps are listed on an index page per kind (`<base>/comments/`, `<base>/submissions/`).
The index is scraped for links containing a `YYYY-MM` date, so that changes in file extensions
across the archive history don't matter.
!*/
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use futures::StreamExt;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::Error;
use crate::month::MonthRange;

pub const BASE_URL: &str = "https://files.pushshift.io/reddit/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    Comments,
    Submissions,
}

impl DumpKind {
    /// Index location, relative to the base url.
    pub fn path(&self) -> &'static str {
        match self {
            DumpKind::Comments => "comments/",
            DumpKind::Submissions => "submissions/",
        }
    }
}

impl FromStr for DumpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comments" => Ok(DumpKind::Comments),
            "submissions" => Ok(DumpKind::Submissions),
            other => Err(Error::Custom(format!("unknown dump kind: {other}"))),
        }
    }
}

lazy_static! {
    static ref HREF: Regex = Regex::new(r#"href="([^"]+)""#).expect("invalid href regex");
    static ref DATE: Regex = Regex::new(r"(20[0-9]{2})-([0-9]{2})").expect("invalid date regex");
}

/// First `20YY-MM` date found in `s`.
fn find_date(s: &str) -> Option<(i32, u32)> {
    let captures = DATE.captures(s)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Maps each dated link of an index page to its absolute url.
///
/// Links are resolved against `index`. When two links share a date, the last one wins.
pub fn parse_index(index: &Url, html: &str) -> HashMap<(i32, u32), Url> {
    let mut dumps = HashMap::new();

    for captures in HREF.captures_iter(html) {
        let href = &captures[1];
        let date = match find_date(href) {
            Some(date) => date,
            None => continue,
        };
        match index.join(href) {
            Ok(url) => {
                dumps.insert(date, url);
            }
            Err(e) => debug!("skipping link {:?}: {}", href, e),
        }
    }

    dumps
}

/// Downloads dumps with retries.
pub struct Downloader {
    client: reqwest::Client,
    base: Url,
    retries: usize,
    retry_delay: Duration,
}

impl Downloader {
    /// `retries` is the total number of attempts per file (at least one).
    pub fn new(base: &str, retries: usize) -> Result<Self, Error> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            retries: retries.max(1),
            retry_delay: Duration::from_secs(10),
        })
    }

    /// Set the pause between two attempts (default 10s).
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn index_url(&self, kind: DumpKind) -> Result<Url, Error> {
        Ok(self.base.join(kind.path())?)
    }

    /// Fetch and parse the index page of `kind`.
    pub async fn index(&self, kind: DumpKind) -> Result<HashMap<(i32, u32), Url>, Error> {
        let url = self.index_url(kind)?;
        debug!("fetching index {}", url);
        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let dumps = parse_index(&url, &html);
        info!("{}: {} dumps listed", url, dumps.len());
        Ok(dumps)
    }

    async fn fetch_once(&self, url: &Url, dst: &Path) -> Result<(), Error> {
        let mut stream = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes_stream();

        let mut file = tokio::fs::File::create(dst).await?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// Download `url` into `dst`.
    ///
    /// A failed attempt removes what was written before retrying.
    pub async fn fetch(&self, url: &Url, dst: &Path) -> Result<PathBuf, Error> {
        for attempt in 1..=self.retries {
            info!("downloading {} (attempt {}/{})", url, attempt, self.retries);
            match self.fetch_once(url, dst).await {
                Ok(()) => {
                    info!("downloaded {} to {:?}", url, dst);
                    return Ok(dst.to_path_buf());
                }
                Err(e) => {
                    warn!("attempt {} for {} failed: {}", attempt, url, e);
                    if tokio::fs::remove_file(dst).await.is_ok() {
                        debug!("removed partial file {:?}", dst);
                    }
                    if attempt < self.retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(Error::Download {
            url: url.to_string(),
            attempts: self.retries,
        })
    }

    /// Download every dump of `kinds` in `months` into `dst`, running at most `n_tasks` downloads at once.
    ///
    /// Failing to get an index is an error, failing to get a dump is reported in the returned vector
    /// (in completion order).
    pub async fn download(
        &self,
        kinds: &[DumpKind],
        months: MonthRange,
        dst: &Path,
        n_tasks: usize,
    ) -> Result<Vec<Result<PathBuf, Error>>, Error> {
        tokio::fs::create_dir_all(dst).await?;

        let mut jobs = Vec::new();
        for kind in kinds {
            let index = self.index(*kind).await?;
            for date in months {
                match index.get(&date) {
                    Some(url) => jobs.push(Ok(url.clone())),
                    None => {
                        warn!("no {:?} dump for {}-{:02}", kind, date.0, date.1);
                        jobs.push(Err(Error::MissingDump(date)));
                    }
                }
            }
        }

        let results: Vec<Result<PathBuf, Error>> = futures::stream::iter(jobs)
            .map(|job| async move {
                let url = job?;
                let file_name = url
                    .path_segments()
                    .and_then(|segments| segments.last())
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| Error::Custom(format!("no file name in {url}")))?
                    .to_string();
                self.fetch(&url, &dst.join(file_name)).await
            })
            .buffer_unordered(n_tasks.max(1))
            .collect()
            .await;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><body>
<a href="../">parent</a>
<tr class="file"><td><a href="./RC_2022-04.zst">RC_2022-04.zst</a></td></tr>
<tr class="file"><td><a href="./RC_2022-05.zst">RC_2022-05.zst</a></td></tr>
<tr class="file"><td><a href="RC_2011-12.bz2">RC_2011-12.bz2</a></td></tr>
<tr class="file"><td><a href="./sha256sums.txt">sha256sums.txt</a></td></tr>
<tr class="file"><td><a href="./RC_1999-01.zst">RC_1999-01.zst</a></td></tr>
</body></html>"#;

    #[test]
    fn dates() {
        assert_eq!(find_date("./RC_2022-05.zst"), Some((2022, 5)));
        assert_eq!(find_date("RS_v2_2008-01.xz"), Some((2008, 1)));
        assert_eq!(find_date("RC_2022-13.zst"), None);
        assert_eq!(find_date("RC_1999-01.zst"), None);
        assert_eq!(find_date("2022"), None);
    }

    #[test]
    fn index() {
        let base = Url::parse("https://files.example.org/reddit/comments/").unwrap();
        let dumps = parse_index(&base, INDEX);

        assert_eq!(dumps.len(), 3);
        assert_eq!(
            dumps[&(2022, 5)].as_str(),
            "https://files.example.org/reddit/comments/RC_2022-05.zst"
        );
        assert_eq!(
            dumps[&(2011, 12)].as_str(),
            "https://files.example.org/reddit/comments/RC_2011-12.bz2"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!("comments".parse::<DumpKind>().unwrap(), DumpKind::Comments);
        assert_eq!(
            "submissions".parse::<DumpKind>().unwrap(),
            DumpKind::Submissions
        );
        assert!("both".parse::<DumpKind>().is_err());
    }

    #[test]
    fn index_urls() {
        let d = Downloader::new("https://files.example.org/reddit", 0).unwrap();
        assert_eq!(
            d.index_url(DumpKind::Submissions).unwrap().as_str(),
            "https://files.example.org/reddit/submissions/"
        );
        assert_eq!(d.retries, 1);
        assert!(Downloader::new("not a url", 3).is_err());
    }

    #[tokio::test]
    async fn failed_fetch_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("RC_2022-05.zst");
        let d = Downloader::new("http://127.0.0.1:9/", 2)
            .unwrap()
            .retry_delay(Duration::from_millis(1));

        let url = Url::parse("http://127.0.0.1:9/comments/RC_2022-05.zst").unwrap();
        match d.fetch(&url, &dst).await {
            Err(Error::Download { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected a download error, got {other:?}"),
        }
        assert!(!dst.exists());
    }
}
