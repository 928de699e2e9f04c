//! Page tasks and their outcomes

use crate::config::CrawlJob;
use crate::output::Record;
use crate::state::TaskState;
use std::fmt;
use std::sync::Arc;

/// Records extracted from one page: exactly `page_size` of them, or none
pub type PageResult = Vec<Record>;

/// One page to extract
#[derive(Debug, Clone)]
pub struct PageTask {
    pub job: Arc<CrawlJob>,

    /// Target page, 1-based
    pub page_index: u32,
}

impl PageTask {
    pub fn new(job: Arc<CrawlJob>, page_index: u32) -> Self {
        Self { job, page_index }
    }
}

/// Why a task stopped without records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbandonReason {
    /// The site answered with its blocked page
    Blocked,
    /// A user interrupt arrived while the task was running
    Interrupted,
    /// The retry policy ran out before the page succeeded
    RetriesExhausted,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Blocked => "blocked",
            Self::Interrupted => "interrupted",
            Self::RetriesExhausted => "retries exhausted",
        };
        write!(f, "{}", label)
    }
}

/// Final result of one page task
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Succeeded { records: PageResult, attempts: u32 },
    Abandoned { reason: AbandonReason, attempts: u32 },
    Aborted { attempts: u32 },
}

impl PageOutcome {
    /// Terminal task state this outcome corresponds to
    pub fn state(&self) -> TaskState {
        match self {
            Self::Succeeded { .. } => TaskState::Succeeded,
            Self::Abandoned { .. } => TaskState::Abandoned,
            Self::Aborted { .. } => TaskState::Aborted,
        }
    }

    /// Number of session attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Abandoned { attempts, .. }
            | Self::Aborted { attempts } => *attempts,
        }
    }

    /// Records contributed to the dataset (empty unless succeeded)
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Succeeded { records, .. } => records,
            _ => &[],
        }
    }

    pub fn into_records(self) -> PageResult {
        match self {
            Self::Succeeded { records, .. } => records,
            _ => Vec::new(),
        }
    }
}
