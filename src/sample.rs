//! Dialogue samples, as written to output files.
use serde::{Deserialize, Serialize};

/// `{"context": [...], "response": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: Vec<String>,
    pub response: String,
}

/// `{"domain": "...", "turns_with_ids": [[id, text], ...]}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainDialogue {
    pub domain: String,
    pub turns_with_ids: Vec<(String, String)>,
}

/// One output record. Serialized without a tag, the shape tells the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    ContextResponse(ContextResponse),
    Domain(DomainDialogue),
}

impl Sample {
    /// Number of turns in the sample (context + response for [ContextResponse]).
    pub fn nb_turns(&self) -> usize {
        match self {
            Sample::ContextResponse(s) => s.context.len() + 1,
            Sample::Domain(d) => d.turns_with_ids.len(),
        }
    }
}
