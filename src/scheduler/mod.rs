//! Lineup scheduler and staffing metrics.
//!
//! Provides the greedy job-filling scheduler and a report of how well the
//! resulting lineup is staffed.
//!
//! # Algorithm
//!
//! `LineupScheduler` visits jobs from the smallest candidate pool to the
//! largest. For each job it fills ordinary members, then managers, up to
//! their minimums, always drawing from the few least-assigned candidates.
//! A picked candidate brings their whole first group along when the job
//! has room for it. It is not optimal, but keeps assignment counts even
//! across rounds.
//!
//! # Report
//!
//! `StaffingReport` computes shortfall, overflow, fill rate, and the spread
//! of member assignment counts.

mod config;
mod greedy;
mod report;

pub use config::SchedulerConfig;
pub use greedy::LineupScheduler;
pub use report::{JobStaffing, StaffingReport};
