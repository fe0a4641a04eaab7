//! Roster domain models.
//!
//! Provides the entities of a scheduling round and the record of a run.
//!
//! # Domain Mappings
//!
//! | u-roster | Volunteering | Healthcare | Retail |
//! |----------|--------------|------------|--------|
//! | Member | Volunteer | Nurse | Clerk |
//! | Group | Team / Family | Ward crew | Store crew |
//! | Job | Service / Event duty | Shift | Shift |
//! | Manager | Team lead | Charge nurse | Shift supervisor |
//! | Lineup | Duty plan | Rota | Schedule |

mod group;
mod ids;
mod job;
mod lineup;
mod member;
mod roster;

pub use group::Group;
pub use ids::{GroupId, IdAllocator, JobId, MemberId};
pub use job::{GroupAdmission, Job, Role};
pub use lineup::Lineup;
pub use member::Member;
pub use roster::{Admission, Placement, Roster};

/// Finds a member record by id.
pub(crate) fn find_member(directory: &[Member], id: MemberId) -> Option<&Member> {
    directory.iter().find(|m| m.id() == id)
}
