//! Final ordered dataset

use crate::crawler::{PageOutcome, PageResult};
use serde::Serialize;

/// One review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub rating: i64,
    pub date: String,
    pub body: String,
}

/// Records of every page that produced any, in page order
///
/// Built once at the end of a run and read-only afterwards. An abandoned
/// page contributes no rows and leaves no marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Concatenates page results in the given order
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = PageResult>,
    {
        Self {
            records: results.into_iter().flatten().collect(),
        }
    }

    /// Concatenates the records of ordered page outcomes
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = PageOutcome>,
    {
        Self::from_results(outcomes.into_iter().map(PageOutcome::into_records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
