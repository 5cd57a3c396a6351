/// Job state definitions for tracking pipeline progress
///
/// This module defines all states a job passes through while it is executed
/// by the worker pool, and which transitions between them are legal.
use std::fmt;

/// Represents the current state of a job in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    // ===== Active States =====
    /// Job has been created but has not started executing
    Pending,

    /// Job is retrieving the target over the network
    Fetching,

    /// Job is running the handler's parse stage over the fetched text
    Parsing,

    /// Parse produced payload data; the handler's archive stage is running
    Archiving,

    /// Parse produced a follow-up request that was pushed onto the queue
    Enqueued,

    // ===== Terminal States =====
    /// Job ran to completion (archive outcome does not affect this)
    Done,

    /// Fetch or parse failed beyond recovery
    Failed,
}

impl JobState {
    /// Returns true if this is a terminal state (the job will never run again)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the transition from `self` to `next` is legal
    ///
    /// Legal transitions:
    /// `Pending → Fetching → Parsing → {Archiving | Enqueued} → Done`,
    /// with `Failed` reachable from `Fetching` and `Parsing`, and `Done`
    /// reachable directly from `Parsing` when parse produced nothing.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Fetching) => true,
            (Self::Fetching, Self::Parsing) => true,
            (Self::Fetching, Self::Failed) => true,
            (Self::Parsing, Self::Archiving) => true,
            (Self::Parsing, Self::Enqueued) => true,
            (Self::Parsing, Self::Done) => true,
            (Self::Parsing, Self::Failed) => true,
            (Self::Archiving, Self::Done) => true,
            (Self::Enqueued, Self::Done) => true,
            _ => false,
        }
    }

    /// Returns all job states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Parsing,
            Self::Archiving,
            Self::Enqueued,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Archiving => "archiving",
            Self::Enqueued => "enqueued",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
