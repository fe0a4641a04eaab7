//! Roster (result) model.
//!
//! A roster records the acceptances made by one scheduling run: which
//! member went into which job, in which role, and whether it came in on
//! its own or together with its group. The jobs themselves hold the
//! authoritative state; the roster is the audit trail of the run.

use serde::{Deserialize, Serialize};

use super::{GroupId, JobId, MemberId, Role};

/// Acceptances made by one scheduling run, in the order they happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Placements in acceptance order.
    pub placements: Vec<Placement>,
}

/// One member accepted into one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Job the member was accepted into.
    pub job_id: JobId,
    /// Accepted member.
    pub member_id: MemberId,
    /// Set the member landed in.
    pub role: Role,
    /// Whether the member came alone or with its group.
    pub admission: Admission,
}

/// How a placement came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// The member was drawn and accepted alone.
    Individual,
    /// The member was accepted as part of a group admission.
    Group(GroupId),
}

impl Placement {
    /// Creates a placement.
    pub fn new(job_id: JobId, member_id: MemberId, role: Role, admission: Admission) -> Self {
        Self {
            job_id,
            member_id,
            role,
            admission,
        }
    }

    /// Whether this placement came through a group admission.
    pub fn via_group(&self) -> bool {
        matches!(self.admission, Admission::Group(_))
    }
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a placement.
    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the run accepted nobody.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// All placements into one job.
    pub fn placements_for_job(&self, job_id: JobId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.job_id == job_id)
            .collect()
    }

    /// All placements of one member.
    pub fn placements_for_member(&self, member_id: MemberId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.member_id == member_id)
            .collect()
    }

    /// The placement of `member_id` in `job_id`, if any.
    pub fn placement(&self, job_id: JobId, member_id: MemberId) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.job_id == job_id && p.member_id == member_id)
    }

    /// Number of jobs `member_id` was accepted into during the run.
    pub fn assignments_of(&self, member_id: MemberId) -> usize {
        self.placements
            .iter()
            .filter(|p| p.member_id == member_id)
            .count()
    }

    /// Number of placements that came through a group admission.
    pub fn group_placement_count(&self) -> usize {
        self.placements.iter().filter(|p| p.via_group()).count()
    }
}
