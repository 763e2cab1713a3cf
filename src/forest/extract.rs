//! Dialogue extraction.
//!
//! [Extractor] takes ownership of a [Forest] and lazily turns every leaf-to-root chain into samples.
//!
//! In [Mode::Context], each chain yields one `(context, response)` sample per position,
//! and a node is used as a response at most once per submission:
//! leaves sharing ancestors would otherwise emit the same pair once per leaf.
use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;

use log::debug;

use super::builder::{Forest, Submission};
use crate::error::Error;
use crate::sample::{ContextResponse, DomainDialogue, Sample};

/// Output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `{context, response}` samples.
    Context,
    /// `{domain, turns_with_ids}` samples, one per chain.
    Domain,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "context" => Ok(Mode::Context),
            "domain" => Ok(Mode::Domain),
            other => Err(Error::Custom(format!(
                "unknown mode {other:?} (expected context or domain)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    mode: Mode,
    max_context_length: usize,
    min_dialogue_length: usize,
}

impl ExtractorConfig {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn max_context_length(&self) -> usize {
        self.max_context_length
    }

    pub fn min_dialogue_length(&self) -> usize {
        self.min_dialogue_length
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorBuilder::default().build_or_default()
    }
}

/// Builds an [ExtractorConfig].
#[derive(Debug, Default)]
pub struct ExtractorBuilder {
    mode: Option<Mode>,
    max_context_length: Option<usize>,
    min_dialogue_length: Option<usize>,
}

impl ExtractorBuilder {
    /// Build, resorting to the following defaults if not set:
    /// - mode: [Mode::Context]
    /// - max_context_length: 6
    /// - min_dialogue_length: 2
    pub fn build_or_default(&self) -> ExtractorConfig {
        ExtractorConfig {
            mode: self.mode.unwrap_or(Mode::Context),
            max_context_length: self.max_context_length.unwrap_or(6),
            min_dialogue_length: self.min_dialogue_length.unwrap_or(2),
        }
    }

    /// Build and check values: a dialogue has at least two turns, and a sample at least one turn of context.
    pub fn build(&self) -> Result<ExtractorConfig, Error> {
        let config = self.build_or_default();
        if config.max_context_length == 0 {
            return Err(Error::Custom(
                "max_context_length has to be at least 1".to_string(),
            ));
        }
        if config.min_dialogue_length < 2 {
            return Err(Error::Custom(
                "min_dialogue_length has to be at least 2".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn mode(&mut self, mode: Mode) -> &mut ExtractorBuilder {
        self.mode = Some(mode);
        self
    }

    pub fn max_context_length(&mut self, max_context_length: usize) -> &mut ExtractorBuilder {
        self.max_context_length = Some(max_context_length);
        self
    }

    pub fn min_dialogue_length(&mut self, min_dialogue_length: usize) -> &mut ExtractorBuilder {
        self.min_dialogue_length = Some(min_dialogue_length);
        self
    }
}

/// A sample along with the index of the submission it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub submission_index: usize,
    pub sample: Sample,
}

/// Extraction counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub submissions: usize,
    pub chains: usize,
    pub incomplete_chains: usize,
    pub short_chains: usize,
    /// Number of samples by context length ([Mode::Context]) or by number of turns ([Mode::Domain]).
    pub by_length: BTreeMap<usize, usize>,
}

struct Current {
    submission: Submission,
    index: usize,
    leaves: std::vec::IntoIter<usize>,
}

/// Lazy sample sequence over a [Forest].
///
/// Submissions are consumed as extraction goes, so the sequence can't be restarted.
pub struct Extractor<I: Iterator<Item = Submission>> {
    config: ExtractorConfig,
    submissions: I,
    current: Option<Current>,
    pending: VecDeque<Sample>,
    stats: ExtractStats,
}

impl Extractor<Box<dyn Iterator<Item = Submission>>> {
    pub fn new(forest: Forest, config: ExtractorConfig) -> Self {
        Self::from_submissions(Box::new(forest.into_submissions()), config)
    }
}

impl<I: Iterator<Item = Submission>> Extractor<I> {
    pub fn from_submissions(submissions: I, config: ExtractorConfig) -> Self {
        Self {
            config,
            submissions,
            current: None,
            pending: VecDeque::new(),
            stats: ExtractStats::default(),
        }
    }

    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Walk `leaf` and queue the resulting samples.
    fn extract_leaf(
        config: &ExtractorConfig,
        submission: &mut Submission,
        leaf: usize,
        pending: &mut VecDeque<Sample>,
        stats: &mut ExtractStats,
    ) {
        let chain = match submission.chain(leaf) {
            Some(chain) => chain,
            None => {
                stats.incomplete_chains += 1;
                return;
            }
        };
        if chain.len() < config.min_dialogue_length {
            stats.short_chains += 1;
            return;
        }
        stats.chains += 1;

        match config.mode {
            Mode::Context => {
                let last = config.max_context_length.min(chain.len() - 1);
                for i in 1..=last {
                    if submission.node(chain[i]).responded() {
                        continue;
                    }
                    let context = chain[..i]
                        .iter()
                        .map(|&idx| submission.node(idx).content().to_string())
                        .collect();
                    let response = submission.node(chain[i]).content().to_string();
                    pending.push_back(Sample::ContextResponse(ContextResponse {
                        context,
                        response,
                    }));
                    submission.set_responded(chain[i]);
                    *stats.by_length.entry(i).or_insert(0) += 1;
                }
            }
            Mode::Domain => {
                let domain = submission.subreddit().to_lowercase();
                if domain.is_empty() {
                    debug!("submission {} has no subreddit", submission.id());
                    return;
                }
                let turns_with_ids: Vec<(String, String)> = chain
                    .iter()
                    .map(|&idx| {
                        let node = submission.node(idx);
                        (node.id().to_string(), node.content().to_string())
                    })
                    .collect();
                if turns_with_ids.iter().any(|(id, _)| id.trim().is_empty()) {
                    return;
                }
                let sample = Sample::Domain(DomainDialogue {
                    domain,
                    turns_with_ids,
                });
                *stats.by_length.entry(sample.nb_turns()).or_insert(0) += 1;
                pending.push_back(sample);
            }
        }
    }
}

impl<I: Iterator<Item = Submission>> Iterator for Extractor<I> {
    type Item = Extracted;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sample) = self.pending.pop_front() {
                // pending samples always come from the current submission
                let submission_index = self.current.as_ref().map_or(0, |c| c.index);
                return Some(Extracted {
                    submission_index,
                    sample,
                });
            }

            let current = match self.current.as_mut() {
                Some(current) => current,
                None => {
                    let submission = self.submissions.next()?;
                    let leaves = submission.leaves().into_iter();
                    let index = self.stats.submissions;
                    self.stats.submissions += 1;
                    self.current = Some(Current {
                        submission,
                        index,
                        leaves,
                    });
                    continue;
                }
            };

            match current.leaves.next() {
                Some(leaf) => Self::extract_leaf(
                    &self.config,
                    &mut current.submission,
                    leaf,
                    &mut self.pending,
                    &mut self.stats,
                ),
                None => self.current = None,
            }
        }
    }
}
