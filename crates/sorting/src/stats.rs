//! Sorting statistics context
//!
//! ## Table of Contents
//! - **Outcome**: Result of classifying one belt object
//! - **Classification**: One classification event, the only input to the stats
//! - **SortingStats**: Owned counter aggregate with read accessors and a single
//!   mutation entry point
//!
//! Invariant: `total == accepted + rejected + uncertain`.

use serde::Serialize;

use crate::material::{Material, Verdict};

pub const DEFAULT_CHLORINE: f64 = 1.5;
pub const DEFAULT_PCI: f64 = 14.0;
pub const DEFAULT_PRECISION: f64 = 97.2;

/// Classification result for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
    /// The object left the belt without passing through the scan window.
    Uncertain,
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => Outcome::Accepted,
            Verdict::Reject => Outcome::Rejected,
        }
    }
}

/// A single classification event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub object_id: u64,
    pub material: &'static Material,
    pub outcome: Outcome,
    /// Detection confidence (%), 0 for uncertain objects
    pub confidence: f64,
}

/// Counters and running averages derived from classification events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortingStats {
    total: u64,
    accepted: u64,
    rejected: u64,
    uncertain: u64,
    average_confidence: f64,
    chlorine: f64,
    pci: f64,
    precision: f64,
}

impl Default for SortingStats {
    fn default() -> Self {
        Self {
            total: 0,
            accepted: 0,
            rejected: 0,
            uncertain: 0,
            average_confidence: 0.0,
            chlorine: DEFAULT_CHLORINE,
            pci: DEFAULT_PCI,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl SortingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classification into the aggregate.
    pub fn record(&mut self, event: &Classification) {
        self.total += 1;
        self.average_confidence = running_mean(self.average_confidence, event.confidence, self.total);

        match event.outcome {
            Outcome::Accepted => {
                self.accepted += 1;
                self.pci = running_mean(self.pci, event.material.calorific_value, self.accepted);
                self.chlorine = running_mean(self.chlorine, event.material.chlorine, self.accepted);
            }
            Outcome::Rejected => self.rejected += 1,
            Outcome::Uncertain => self.uncertain += 1,
        }

        if event.outcome != Outcome::Uncertain {
            let decisive = self.accepted + self.rejected;
            self.precision = running_mean(self.precision, event.confidence, decisive);
        }
    }

    /// Back to the documented defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn uncertain(&self) -> u64 {
        self.uncertain
    }

    /// Mean confidence over every classification (%).
    pub fn average_confidence(&self) -> f64 {
        self.average_confidence
    }

    /// Mean chlorine content of the accepted stream (%).
    pub fn chlorine(&self) -> f64 {
        self.chlorine
    }

    /// Mean calorific value of the accepted stream (MJ/kg).
    pub fn pci(&self) -> f64 {
        self.pci
    }

    /// Mean confidence over accepted and rejected objects (%).
    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn accept_rate(&self) -> f64 {
        self.percent(self.accepted)
    }

    pub fn reject_rate(&self) -> f64 {
        self.percent(self.rejected)
    }

    pub fn uncertain_rate(&self) -> f64 {
        self.percent(self.uncertain)
    }

    fn percent(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

fn running_mean(mean: f64, sample: f64, count: u64) -> f64 {
    mean + (sample - mean) / count as f64
}
