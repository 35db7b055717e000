//! Report types shared between the simulator library and its front-ends.
//!
//! Everything in here is plain data: it is what the CLI prints as JSON and
//! what the engine stores after a gel run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PROTOCOL_VERSION: &str = "v1";

/// One segment of a strand, as printed: its label and its bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandToken {
    pub label: String,
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandReport {
    pub start_id: usize,
    pub tokens: Vec<StrandToken>,
}

impl StrandReport {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn joined_sequence(&self) -> String {
        self.tokens.iter().map(|t| t.sequence.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplexReport {
    pub size: usize,
    pub upper: StrandReport,
    pub lower: StrandReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GelReport {
    pub target_size: usize,
    /// Band size (segment count) to number of duplexes in that band.
    pub band_counts: BTreeMap<usize, usize>,
    pub selected: Vec<DuplexReport>,
}

impl GelReport {
    pub fn duplex_count(&self) -> usize {
        self.band_counts.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub member_count: usize,
    pub primer_count: usize,
    pub free_count: usize,
    pub center_bound_count: usize,
    pub staggered_count: usize,
    pub strand_count: usize,
}
