//! Errors for id-addressed lineup operations.

use thiserror::Error;

use crate::models::{GroupId, JobId, MemberId};

/// Errors returned by id-addressed [`Lineup`](crate::models::Lineup) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineupError {
    #[error("Member not found: {0}")]
    UnknownMember(MemberId),

    #[error("Group not found: {0}")]
    UnknownGroup(GroupId),

    #[error("Job not found: {0}")]
    UnknownJob(JobId),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

/// Result alias for lineup operations.
pub type Result<T> = std::result::Result<T, LineupError>;
