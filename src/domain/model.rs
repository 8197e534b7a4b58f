use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row from a record source or for a record sink: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.data.insert(field.to_string(), value.to_string());
        self
    }

    /// Trimmed value of `field`, `None` when absent or blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A giver/receiver combination that must not be drawn again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForbiddenPair {
    pub giver_id: String,
    pub receiver_id: String,
}

impl ForbiddenPair {
    pub fn new(giver_id: impl Into<String>, receiver_id: impl Into<String>) -> Self {
        Self {
            giver_id: giver_id.into(),
            receiver_id: receiver_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub giver: Participant,
    pub receiver: Participant,
}

/// A complete draw. Pairs follow the input order of the givers.
///
/// The draw is a pseudo-random valid matching: every valid matching can come
/// out, but not with equal probability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub pairs: Vec<Pairing>,
    /// Seed that reproduces this draw for the same inputs.
    pub seed: u64,
    /// Receiver placements tried by the search.
    pub steps: usize,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pairing> {
        self.pairs.iter()
    }

    pub fn receiver_of(&self, giver_id: &str) -> Option<&Participant> {
        self.pairs
            .iter()
            .find(|p| p.giver.id == giver_id)
            .map(|p| &p.receiver)
    }
}

/// Column names used when reading and writing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub participant_id: String,
    pub participant_name: String,
    pub prior_giver_id: String,
    pub prior_receiver_id: String,
    pub giver_name: String,
    pub giver_id: String,
    pub receiver_name: String,
    pub receiver_id: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        // 與前一年的輸出檔相容，可直接當作歷史紀錄讀回
        Self {
            participant_id: "Employee_EmailID".to_string(),
            participant_name: "Employee_Name".to_string(),
            prior_giver_id: "Employee_EmailID".to_string(),
            prior_receiver_id: "Secret_Child_EmailID".to_string(),
            giver_name: "Employee_Name".to_string(),
            giver_id: "Employee_EmailID".to_string(),
            receiver_name: "Secret_Child_Name".to_string(),
            receiver_id: "Secret_Child_EmailID".to_string(),
        }
    }
}

impl FieldMapping {
    pub fn output_headers(&self) -> [&str; 4] {
        [
            &self.giver_name,
            &self.giver_id,
            &self.receiver_name,
            &self.receiver_id,
        ]
    }
}

/// Raw records handed from the source to the engine stage.
#[derive(Debug, Clone, Default)]
pub struct DrawInput {
    pub participants: Vec<Record>,
    pub prior_pairs: Vec<Record>,
}

#[derive(Debug, Clone)]
pub struct DrawResult {
    pub assignment: Assignment,
    pub records: Vec<Record>,
    pub attempts: u32,
}
