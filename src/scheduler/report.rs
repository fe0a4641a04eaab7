//! Staffing metrics.
//!
//! Summarizes how well a lineup's jobs are staffed and how evenly the work
//! is spread across members. Meant to be computed after
//! [`Lineup::create_lineup`](crate::models::Lineup::create_lineup), since
//! the scheduler itself never reports unmet minimums.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Shortfall | max(0, minimum - accepted), per role |
//! | Overflow | max(0, accepted - maximum), per role |
//! | Fill rate | Fraction of jobs meeting both minimums |
//! | Count spread | min / max / mean of member counts |

use serde::Serialize;

use crate::models::{Job, JobId, Lineup, Role};

/// Staffing state of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStaffing {
    /// Job this entry describes.
    pub job_id: JobId,
    /// Accepted ordinary members.
    pub subscribers: usize,
    /// Accepted managers.
    pub managers: usize,
    /// Ordinary members still missing to reach the minimum.
    pub subscriber_shortfall: usize,
    /// Managers still missing to reach the minimum.
    pub manager_shortfall: usize,
    /// Ordinary members beyond the maximum.
    pub subscriber_overflow: usize,
    /// Managers beyond the maximum.
    pub manager_overflow: usize,
}

impl JobStaffing {
    /// Computes the staffing state of a job.
    pub fn of(job: &Job) -> Self {
        Self {
            job_id: job.id(),
            subscribers: job.subscribers().len(),
            managers: job.managers().len(),
            subscriber_shortfall: shortfall(job, Role::Subscriber),
            manager_shortfall: shortfall(job, Role::Manager),
            subscriber_overflow: overflow(job, Role::Subscriber),
            manager_overflow: overflow(job, Role::Manager),
        }
    }

    /// Whether both minimums are met.
    pub fn is_staffed(&self) -> bool {
        self.subscriber_shortfall == 0 && self.manager_shortfall == 0
    }
}

/// Lineup-wide staffing indicators.
#[derive(Debug, Clone, Serialize)]
pub struct StaffingReport {
    /// Per-job staffing, in lineup order.
    pub jobs: Vec<JobStaffing>,
    /// Number of jobs missing at least one minimum.
    pub understaffed_jobs: usize,
    /// Total missing headcount across jobs and roles.
    pub total_shortfall: usize,
    /// Fraction of jobs meeting both minimums (1.0 for an empty lineup).
    pub fill_rate: f64,
    /// Lowest member count (0 without members).
    pub min_count: u32,
    /// Highest member count (0 without members).
    pub max_count: u32,
    /// Mean member count (0.0 without members).
    pub mean_count: f64,
}

impl StaffingReport {
    /// Computes the report for the current state of `lineup`.
    pub fn calculate(lineup: &Lineup) -> Self {
        let jobs: Vec<JobStaffing> = lineup.jobs().iter().map(JobStaffing::of).collect();
        let understaffed_jobs = jobs.iter().filter(|j| !j.is_staffed()).count();
        let total_shortfall = jobs
            .iter()
            .map(|j| j.subscriber_shortfall + j.manager_shortfall)
            .sum();
        let fill_rate = if jobs.is_empty() {
            1.0
        } else {
            (jobs.len() - understaffed_jobs) as f64 / jobs.len() as f64
        };

        let counts: Vec<u32> = lineup.members().iter().map(|m| m.count()).collect();
        let min_count = counts.iter().copied().min().unwrap_or(0);
        let max_count = counts.iter().copied().max().unwrap_or(0);
        let mean_count = if counts.is_empty() {
            0.0
        } else {
            counts.iter().map(|&c| f64::from(c)).sum::<f64>() / counts.len() as f64
        };

        Self {
            jobs,
            understaffed_jobs,
            total_shortfall,
            fill_rate,
            min_count,
            max_count,
            mean_count,
        }
    }

    /// Whether every job meets both minimums.
    pub fn is_fully_staffed(&self) -> bool {
        self.understaffed_jobs == 0
    }

    /// Difference between the most and least assigned member.
    pub fn count_spread(&self) -> u32 {
        self.max_count - self.min_count
    }

    /// Staffing of one job.
    pub fn job(&self, job_id: JobId) -> Option<&JobStaffing> {
        self.jobs.iter().find(|j| j.job_id == job_id)
    }
}

fn shortfall(job: &Job, role: Role) -> usize {
    job.minimum(role).saturating_sub(job.accepted(role).len())
}

fn overflow(job: &Job, role: Role) -> usize {
    job.accepted(role).len().saturating_sub(job.maximum(role))
}
