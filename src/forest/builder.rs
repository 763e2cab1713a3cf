//! Forest construction.
//!
//! Admitted comments are grouped by submission into a [Submission] arena,
//! parent links are resolved into indices, then internal nodes are marked.
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use log::{debug, info};
use twox_hash::XxHash64;

use crate::comment::Admitted;

pub(crate) type FastMap<K, V> = HashMap<K, V, BuildHasherDefault<XxHash64>>;

/// A comment inside a submission forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    content: String,
    parent_id: String,
    /// index of the parent node, if it is in the submission.
    parent: Option<usize>,
    has_child: bool,
    responded: bool,
}

impl Node {
    fn new(id: String, content: String, parent_id: String) -> Self {
        Self {
            id,
            content,
            parent_id,
            parent: None,
            has_child: false,
            responded: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// `true` if at least one other node of the submission has this node as parent.
    pub fn has_child(&self) -> bool {
        self.has_child
    }

    /// `true` once the node has been used as the response of a sample.
    pub fn responded(&self) -> bool {
        self.responded
    }
}

/// All the admitted comments of a submission.
///
/// Nodes live in a [Vec] and are never moved nor removed after construction,
/// so indices are stable and can be used to flag nodes while walking chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    id: String,
    subreddit: String,
    nodes: Vec<Node>,
    index: FastMap<String, usize>,
}

impl Submission {
    pub fn new(id: String) -> Self {
        Self {
            id,
            subreddit: String::new(),
            nodes: Vec::new(),
            index: FastMap::default(),
        }
    }

    /// Insert a comment. A comment with an already known id replaces the previous one.
    pub fn insert(&mut self, id: String, content: String, parent_id: String) {
        let node = Node::new(id, content, parent_id);
        match self.index.get(&node.id) {
            Some(&idx) => {
                debug!("duplicate comment {} in submission {}", node.id, self.id);
                self.nodes[idx] = node;
            }
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Resolve parent ids into indices, then mark internal nodes.
    ///
    /// Marking walks up from every node that is not yet marked,
    /// and stops at the first ancestor that already is: its own ancestors have been marked by a previous walk.
    /// This keeps the whole pass linear in the number of nodes.
    pub fn link(&mut self) {
        for idx in 0..self.nodes.len() {
            let parent = self
                .index
                .get(&self.nodes[idx].parent_id)
                .copied()
                .filter(|&parent| parent != idx);
            let node = &mut self.nodes[idx];
            node.parent = parent;
            node.has_child = false;
        }

        for idx in 0..self.nodes.len() {
            if self.nodes[idx].has_child {
                continue;
            }
            let mut current = self.nodes[idx].parent;
            while let Some(parent) = current {
                let parent = &mut self.nodes[parent];
                if parent.has_child {
                    break;
                }
                parent.has_child = true;
                current = parent.parent;
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subreddit of the submission (first non-empty one seen), as found in the dump.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indices of leaves, in ascending id order.
    pub fn leaves(&self) -> Vec<usize> {
        let mut leaves: Vec<usize> = (0..self.nodes.len())
            .filter(|&idx| !self.nodes[idx].has_child)
            .collect();
        leaves.sort_by(|a, b| self.nodes[*a].id.cmp(&self.nodes[*b].id));
        leaves
    }

    /// Walk from `leaf` up to a top-level comment of the submission.
    ///
    /// Returns node indices in root to leaf order,
    /// or [None] if the walk reaches a comment that is not in the submission.
    /// Walks longer than the submission (cyclic parent links) are discarded too.
    pub fn chain(&self, leaf: usize) -> Option<Vec<usize>> {
        let mut chain = Vec::new();
        let mut current = leaf;
        loop {
            if chain.len() == self.nodes.len() {
                debug!("cyclic chain in submission {}", self.id);
                return None;
            }
            chain.push(current);
            let node = &self.nodes[current];
            if node.parent_id == self.id {
                break;
            }
            current = node.parent?;
        }

        chain.reverse();
        Some(chain)
    }

    /// Chains of every leaf, in leaf order. Leaves with no complete chain are skipped.
    pub fn chains(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.leaves()
            .into_iter()
            .filter_map(move |leaf| self.chain(leaf))
    }

    pub(crate) fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub(crate) fn set_responded(&mut self, idx: usize) {
        self.nodes[idx].responded = true;
    }
}

/// Comment forests, by submission id.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    submissions: FastMap<String, Submission>,
    nb_nodes: usize,
}

impl Forest {
    /// Build the forest from the whole set of admitted comments.
    pub fn from_admitted(admitted: Vec<Admitted>) -> Self {
        let mut submissions: FastMap<String, Submission> = FastMap::default();

        for comment in admitted {
            let submission = submissions
                .entry(comment.submission_id.clone())
                .or_insert_with(|| Submission::new(comment.submission_id));
            if submission.subreddit.is_empty() {
                submission.subreddit = comment.subreddit;
            }
            submission.insert(comment.id, comment.content, comment.parent_id);
        }

        let mut nb_nodes = 0;
        for submission in submissions.values_mut() {
            submission.link();
            nb_nodes += submission.len();
        }

        info!(
            "built forest: {} comments in {} submissions",
            nb_nodes,
            submissions.len()
        );
        Self {
            submissions,
            nb_nodes,
        }
    }

    pub fn nb_submissions(&self) -> usize {
        self.submissions.len()
    }

    pub fn nb_nodes(&self) -> usize {
        self.nb_nodes
    }

    pub fn get(&self, submission_id: &str) -> Option<&Submission> {
        self.submissions.get(submission_id)
    }

    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.submissions.values()
    }

    pub(crate) fn into_submissions(self) -> impl Iterator<Item = Submission> {
        self.submissions.into_values()
    }
}
