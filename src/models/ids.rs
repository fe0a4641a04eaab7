//! Entity identifiers and their allocator.
//!
//! Identities are only used for equality and membership tests, never for
//! ordering or display. Each entity kind has its own monotonically
//! increasing sequence; an id is never handed out twice by the same
//! allocator, even after the entity it named has been removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a [`Member`](super::Member).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u64);

/// Identity of a [`Group`](super::Group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// Identity of a [`Job`](super::Job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Hands out fresh ids, one sequence per entity kind.
///
/// Owned by the [`Lineup`](super::Lineup) so that id assignment is
/// deterministic per aggregate and resets with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_member: u64,
    next_group: u64,
    next_job: u64,
}

impl IdAllocator {
    /// Creates an allocator whose sequences all start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next member id.
    pub fn next_member(&mut self) -> MemberId {
        let id = MemberId(self.next_member);
        self.next_member += 1;
        id
    }

    /// Allocates the next group id.
    pub fn next_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Allocates the next job id.
    pub fn next_job(&mut self) -> JobId {
        let id = JobId(self.next_job);
        self.next_job += 1;
        id
    }

    /// Advances the member sequence past `id` so it is never reissued.
    pub(crate) fn reserve_member(&mut self, id: MemberId) {
        self.next_member = self.next_member.max(id.0 + 1);
    }

    pub(crate) fn reserve_group(&mut self, id: GroupId) {
        self.next_group = self.next_group.max(id.0 + 1);
    }

    pub(crate) fn reserve_job(&mut self, id: JobId) {
        self.next_job = self.next_job.max(id.0 + 1);
    }
}
