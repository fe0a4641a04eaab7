//! Greedy, fairness-weighted lineup scheduler.
//!
//! # Algorithm
//!
//! 1. Order jobs by candidate-pool size, ascending (stable).
//! 2. For each job, split its pool into ordinary members and managers.
//! 3. Fill ordinary slots up to `min_subscriber_count`:
//!    - sort candidates by assignment count, ascending (stable);
//!    - draw uniformly among the first `candidate_window` (default 3);
//!    - if the drawn member is already accepted, drop it and draw again;
//!    - if it belongs to a group, try to admit its first group as a whole,
//!      falling back to the member alone when the group does not fit;
//!    - otherwise accept the member alone;
//!    - drop the drawn member from the list whatever the outcome.
//! 4. Fill manager slots up to `min_manager_count` the same way, sorting by
//!    the counts as they are after step 3.
//!
//! No backtracking and no feasibility check: a job whose pool cannot cover
//! its minimums stays under-staffed.
//!
//! # Complexity
//! O(j · p · (p + g)) where j=jobs, p=pool size, g=group size (linear
//! member lookups).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SchedulerConfig;
use crate::models::{
    find_member, Admission, Group, Job, JobId, Lineup, Member, MemberId, Placement, Role, Roster,
};

/// Fills every job of a [`Lineup`] from its candidate pool.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use u_roster::models::Lineup;
/// use u_roster::scheduler::{LineupScheduler, SchedulerConfig};
///
/// let mut lineup = Lineup::new();
/// let job = lineup.create_job(Utc::now(), "Ushers");
/// lineup.job_mut(job).unwrap().set_min_subscriber_count(2);
/// lineup.job_mut(job).unwrap().set_max_subscriber_count(2);
/// for name in ["Ann", "Bob", "Cat"] {
///     let m = lineup.create_member(name, "Doe", false);
///     lineup.offer(job, m).unwrap();
/// }
///
/// let scheduler = LineupScheduler::with_config(SchedulerConfig::default().with_seed(1));
/// let roster = scheduler.run(&mut lineup);
/// assert_eq!(roster.len(), 2);
/// assert_eq!(lineup.job(job).unwrap().subscribers().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineupScheduler {
    config: SchedulerConfig,
}

impl LineupScheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Fills every job, seeding from the configuration if a seed is set.
    pub fn run(&self, lineup: &mut Lineup) -> Roster {
        match self.config.seed {
            Some(seed) => self.run_with_rng(lineup, &mut StdRng::seed_from_u64(seed)),
            None => self.run_with_rng(lineup, &mut rand::rng()),
        }
    }

    /// Fills every job, drawing candidates from `rng`.
    pub fn run_with_rng<R: Rng>(&self, lineup: &mut Lineup, rng: &mut R) -> Roster {
        let order = sort_jobs(lineup.jobs());
        let (jobs, members, groups) = lineup.parts_mut();
        let mut roster = Roster::new();

        for idx in order {
            self.fill_job(&mut jobs[idx], members, groups, rng, &mut roster);
        }

        tracing::info!(
            jobs = jobs.len(),
            placements = roster.len(),
            via_group = roster.group_placement_count(),
            "lineup created"
        );
        roster
    }

    /// Ids of the lineup's jobs in the order a run processes them.
    pub fn job_order(&self, lineup: &Lineup) -> Vec<JobId> {
        sort_jobs(lineup.jobs())
            .into_iter()
            .map(|idx| lineup.jobs()[idx].id())
            .collect()
    }

    fn fill_job<R: Rng>(
        &self,
        job: &mut Job,
        members: &mut [Member],
        groups: &[Group],
        rng: &mut R,
        roster: &mut Roster,
    ) {
        let mut ordinary = Vec::new();
        let mut managers = Vec::new();
        for &id in job.possible_subscribers() {
            match find_member(members, id) {
                Some(m) if m.is_manager() => managers.push(id),
                Some(_) => ordinary.push(id),
                None => {
                    tracing::warn!(job_id = %job.id(), member_id = %id, "candidate has no member record, skipped");
                }
            }
        }

        tracing::debug!(
            job_id = %job.id(),
            pool = job.possible_subscribers().len(),
            min_subscribers = job.min_subscriber_count(),
            min_managers = job.min_manager_count(),
            "filling job"
        );

        self.fill_role(job, Role::Subscriber, ordinary, members, groups, rng, roster);
        self.fill_role(job, Role::Manager, managers, members, groups, rng, roster);

        if !job.is_staffed(Role::Subscriber) || !job.is_staffed(Role::Manager) {
            tracing::warn!(
                job_id = %job.id(),
                subscribers = job.subscribers().len(),
                min_subscribers = job.min_subscriber_count(),
                managers = job.managers().len(),
                min_managers = job.min_manager_count(),
                "job left below its minimum headcount"
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_role<R: Rng>(
        &self,
        job: &mut Job,
        role: Role,
        mut candidates: Vec<MemberId>,
        members: &mut [Member],
        groups: &[Group],
        rng: &mut R,
        roster: &mut Roster,
    ) {
        let directory: &[Member] = members;
        candidates.sort_by_key(|&id| find_member(directory, id).map_or(0, Member::count));

        let window = self.config.effective_window();
        while job.accepted(role).len() < job.minimum(role) && !candidates.is_empty() {
            let pick = rng.random_range(0..window.min(candidates.len()));
            let id = candidates[pick];
            let Some(idx) = members.iter().position(|m| m.id() == id) else {
                candidates.remove(pick);
                continue;
            };
            if job.is_subscriber(&members[idx]) {
                candidates.remove(pick);
                continue;
            }

            tracing::trace!(job_id = %job.id(), member_id = %id, count = members[idx].count(), "candidate drawn");

            let group = members[idx]
                .primary_group()
                .and_then(|gid| groups.iter().find(|g| g.id() == gid));

            let mut placed = false;
            if let Some(group) = group {
                let outcome = job.admit_group(group, members);
                record(
                    roster,
                    job.id(),
                    members,
                    outcome.admitted(),
                    Admission::Group(group.id()),
                );
                placed = outcome.is_admitted();
                if !placed {
                    tracing::debug!(job_id = %job.id(), group_id = %group.id(), outcome = ?outcome, "group not admitted, trying member alone");
                }
            }
            if !placed && job.add_subscriber(&mut members[idx]) {
                record(roster, job.id(), members, &[id], Admission::Individual);
            }

            candidates.remove(pick);
        }
    }
}

/// Job indices ordered by candidate-pool size, ascending (stable).
fn sort_jobs(jobs: &[Job]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..jobs.len()).collect();
    indices.sort_by_key(|&i| jobs[i].possible_subscribers().len());
    indices
}

fn record(
    roster: &mut Roster,
    job_id: JobId,
    members: &[Member],
    admitted: &[MemberId],
    admission: Admission,
) {
    for &member_id in admitted {
        if let Some(member) = find_member(members, member_id) {
            roster.add_placement(Placement::new(
                job_id,
                member_id,
                Role::of(member),
                admission,
            ));
        }
    }
}
