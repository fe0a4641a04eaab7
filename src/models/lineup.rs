//! Lineup aggregate.
//!
//! The lineup owns every member, group and job of one scheduling round,
//! plus the id allocator that names them. Operations that touch more than
//! one entity (group membership, job acceptance, removal) go through here
//! so both sides of each relation change together.
//!
//! Members and groups are long-lived: their counts and memberships carry
//! over from round to round. Jobs are created per round, filled with
//! bounds and candidates, and then consumed by [`Lineup::create_lineup`].

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    find_member, Group, GroupAdmission, GroupId, IdAllocator, Job, JobId, Member, MemberId, Roster,
};
use crate::error::{LineupError, Result};
use crate::notify::{Property, PropertyNotifier, Source};
use crate::scheduler::LineupScheduler;

/// Members, groups and jobs of one scheduling round.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use u_roster::models::Lineup;
///
/// let mut lineup = Lineup::new();
/// let ann = lineup.create_member("Ann", "Lee", false);
/// let bob = lineup.create_member("Bob", "Ray", false);
/// let job = lineup.create_job(Utc::now(), "Set up chairs");
/// lineup.job_mut(job).unwrap().set_min_subscriber_count(1);
/// lineup.job_mut(job).unwrap().set_max_subscriber_count(2);
/// lineup.offer(job, ann).unwrap();
/// lineup.offer(job, bob).unwrap();
///
/// let roster = lineup.create_lineup();
/// assert_eq!(roster.len(), 1);
/// assert_eq!(lineup.job(job).unwrap().subscribers().len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lineup {
    members: Vec<Member>,
    groups: Vec<Group>,
    jobs: Vec<Job>,
    ids: IdAllocator,
    #[serde(skip)]
    notifier: PropertyNotifier,
}

impl Lineup {
    /// Creates an empty lineup with fresh id sequences.
    pub fn new() -> Self {
        Self::default()
    }

    /// All members, in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// All groups, in insertion order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// All jobs, in insertion order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Id sequences, for callers building entities themselves.
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Observers of the lineup collections.
    pub fn notifier(&self) -> &PropertyNotifier {
        &self.notifier
    }

    /// Mutable access for registering observers.
    pub fn notifier_mut(&mut self) -> &mut PropertyNotifier {
        &mut self.notifier
    }

    /// Looks up a member by id.
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        find_member(&self.members, id)
    }

    /// Looks up a member by id for editing.
    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id() == id)
    }

    /// Looks up a group by id.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    /// Looks up a group by id for editing.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    /// Looks up a job by id.
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id() == id)
    }

    /// Looks up a job by id for editing.
    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id() == id)
    }

    /// Creates and stores a member. `count` starts at zero.
    pub fn create_member(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        is_manager: bool,
    ) -> MemberId {
        let id = self.ids.next_member();
        self.members
            .push(Member::new(id, first_name, last_name).with_manager(is_manager));
        self.emit(Property::Members);
        id
    }

    /// Stores a member built by the caller.
    ///
    /// The id sequence is advanced past its id. Group back-references on
    /// the record are kept as they are.
    pub fn insert_member(&mut self, member: Member) -> Result<MemberId> {
        let id = member.id();
        if self.member(id).is_some() {
            return Err(LineupError::DuplicateId(id.to_string()));
        }
        self.ids.reserve_member(id);
        self.members.push(member);
        self.emit(Property::Members);
        Ok(id)
    }

    /// Creates and stores an empty, named group.
    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = self.ids.next_group();
        self.groups.push(Group::new(id).with_name(name));
        self.emit(Property::Groups);
        id
    }

    /// Stores a group built by the caller.
    pub fn insert_group(&mut self, group: Group) -> Result<GroupId> {
        let id = group.id();
        if self.group(id).is_some() {
            return Err(LineupError::DuplicateId(id.to_string()));
        }
        self.ids.reserve_group(id);
        self.groups.push(group);
        self.emit(Property::Groups);
        Ok(id)
    }

    /// Creates and stores a job with all bounds at zero.
    pub fn create_job(&mut self, time: DateTime<Utc>, name: impl Into<String>) -> JobId {
        let id = self.ids.next_job();
        self.jobs.push(Job::at(id, time).with_name(name));
        self.emit(Property::Jobs);
        id
    }

    /// Stores a job built by the caller.
    pub fn insert_job(&mut self, job: Job) -> Result<JobId> {
        let id = job.id();
        if self.job(id).is_some() {
            return Err(LineupError::DuplicateId(id.to_string()));
        }
        self.ids.reserve_job(id);
        self.jobs.push(job);
        self.emit(Property::Jobs);
        Ok(id)
    }

    /// Adds a member to a group. `Ok(false)` if it already belongs.
    pub fn add_to_group(&mut self, group: GroupId, member: MemberId) -> Result<bool> {
        let (g, m) = self.group_and_member(group, member)?;
        Ok(self.groups[g].add_member(&mut self.members[m]))
    }

    /// Removes a member from a group. `Ok(false)` if it did not belong.
    pub fn remove_from_group(&mut self, group: GroupId, member: MemberId) -> Result<bool> {
        let (g, m) = self.group_and_member(group, member)?;
        Ok(self.groups[g].remove_member(&mut self.members[m]))
    }

    /// Changes a member's manager flag and refreshes its groups.
    ///
    /// When the flag actually changes, every group the member belongs to
    /// re-announces `NormalCount` and `ManagerCount`.
    pub fn set_member_manager(&mut self, member: MemberId, is_manager: bool) -> Result<bool> {
        let m = self.member_index(member)?;
        let changed = self.members[m].set_manager(is_manager);
        if changed {
            let groups = self.members[m].groups();
            for group in self.groups.iter().filter(|g| groups.contains(&g.id())) {
                group.emit_counts();
            }
        }
        Ok(changed)
    }

    /// Live number of non-managers in a group.
    pub fn normal_count(&self, group: GroupId) -> Result<usize> {
        let g = self.group(group).ok_or(LineupError::UnknownGroup(group))?;
        Ok(g.normal_count(&self.members))
    }

    /// Live number of managers in a group.
    pub fn manager_count(&self, group: GroupId) -> Result<usize> {
        let g = self.group(group).ok_or(LineupError::UnknownGroup(group))?;
        Ok(g.manager_count(&self.members))
    }

    /// Puts a member into a job's candidate pool.
    pub fn offer(&mut self, job: JobId, member: MemberId) -> Result<bool> {
        let (j, m) = self.job_and_member(job, member)?;
        Ok(self.jobs[j].add_candidate(&self.members[m]))
    }

    /// Accepts a member into a job (see [`Job::add_subscriber`]).
    pub fn subscribe(&mut self, job: JobId, member: MemberId) -> Result<bool> {
        let (j, m) = self.job_and_member(job, member)?;
        Ok(self.jobs[j].add_subscriber(&mut self.members[m]))
    }

    /// Releases a member from a job (see [`Job::remove_subscriber`]).
    pub fn unsubscribe(&mut self, job: JobId, member: MemberId) -> Result<bool> {
        let (j, m) = self.job_and_member(job, member)?;
        Ok(self.jobs[j].remove_subscriber(&mut self.members[m]))
    }

    /// Accepts a whole group into a job (see [`Job::add_subscriber_group`]).
    pub fn subscribe_group(&mut self, job: JobId, group: GroupId) -> Result<bool> {
        Ok(self.admit_group(job, group)?.is_admitted())
    }

    /// Accepts a whole group into a job and reports the detailed outcome.
    pub fn admit_group(&mut self, job: JobId, group: GroupId) -> Result<GroupAdmission> {
        let j = self.job_index(job)?;
        let g = self.group_index(group)?;
        Ok(self.jobs[j].admit_group(&self.groups[g], &mut self.members))
    }

    /// Removes a member from the lineup.
    ///
    /// The member leaves every group (last joined first) and every job
    /// reference to it is dropped. Counts of other members are untouched.
    pub fn remove_member(&mut self, member: MemberId) -> Result<Member> {
        let m = self.member_index(member)?;
        let mut record = self.members.remove(m);
        record.leave_all_groups(&mut self.groups);
        for job in self.jobs.iter_mut() {
            job.forget(member);
        }
        tracing::debug!(member_id = %member, "member removed from lineup");
        self.emit(Property::Members);
        Ok(record)
    }

    /// Removes a group, detaching all of its members first.
    pub fn remove_group(&mut self, group: GroupId) -> Result<Group> {
        let g = self.group_index(group)?;
        let mut record = self.groups.remove(g);
        record.dissolve(&mut self.members);
        tracing::debug!(group_id = %group, "group dissolved");
        self.emit(Property::Groups);
        Ok(record)
    }

    /// Removes a job. Member counts are left as they are.
    pub fn remove_job(&mut self, job: JobId) -> Result<Job> {
        let j = self.job_index(job)?;
        let record = self.jobs.remove(j);
        tracing::debug!(job_id = %job, "job removed from lineup");
        self.emit(Property::Jobs);
        Ok(record)
    }

    /// Jobs ordered by scheduled time (stable).
    pub fn jobs_by_time(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.jobs.iter().collect();
        jobs.sort_by(|a, b| a.cmp_by_time(b));
        jobs
    }

    /// Groups ordered by size (stable).
    pub fn groups_by_size(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        groups.sort_by(|a, b| a.cmp_by_size(b));
        groups
    }

    /// Members ordered by assignment count (stable).
    pub fn members_by_count(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.iter().collect();
        members.sort_by(|a, b| a.cmp_by_count(b));
        members
    }

    /// Fills every job with the default scheduler.
    ///
    /// See [`LineupScheduler`] for the algorithm.
    pub fn create_lineup(&mut self) -> Roster {
        LineupScheduler::new().run(self)
    }

    /// Fills every job with the default scheduler and the given random
    /// source.
    pub fn create_lineup_with_rng<R: Rng>(&mut self, rng: &mut R) -> Roster {
        LineupScheduler::new().run_with_rng(self, rng)
    }

    /// Split borrow used by the scheduler.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Job], &mut [Member], &[Group]) {
        (&mut self.jobs, &mut self.members, &self.groups)
    }

    fn member_index(&self, id: MemberId) -> Result<usize> {
        self.members
            .iter()
            .position(|m| m.id() == id)
            .ok_or(LineupError::UnknownMember(id))
    }

    fn group_index(&self, id: GroupId) -> Result<usize> {
        self.groups
            .iter()
            .position(|g| g.id() == id)
            .ok_or(LineupError::UnknownGroup(id))
    }

    fn job_index(&self, id: JobId) -> Result<usize> {
        self.jobs
            .iter()
            .position(|j| j.id() == id)
            .ok_or(LineupError::UnknownJob(id))
    }

    fn group_and_member(&self, group: GroupId, member: MemberId) -> Result<(usize, usize)> {
        Ok((self.group_index(group)?, self.member_index(member)?))
    }

    fn job_and_member(&self, job: JobId, member: MemberId) -> Result<(usize, usize)> {
        Ok((self.job_index(job)?, self.member_index(member)?))
    }

    fn emit(&self, property: Property) {
        self.notifier.notify(Source::Lineup, property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_create_entities_allocates_ids() {
        let mut l = Lineup::new();
        let a = l.create_member("Ann", "Lee", false);
        let b = l.create_member("Bob", "Ray", true);
        let g = l.create_group("Band");
        let j = l.create_job(at(9), "Doors");

        assert_eq!(a, MemberId(0));
        assert_eq!(b, MemberId(1));
        assert_eq!(g, GroupId(0));
        assert_eq!(j, JobId(0));
        assert!(l.member(b).unwrap().is_manager());
        assert_eq!(l.group(g).unwrap().name(), Some("Band"));
        assert_eq!(l.job(j).unwrap().name(), "Doors");
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut l = Lineup::new();
        l.insert_member(Member::new(MemberId(5), "a", "b")).unwrap();
        let err = l
            .insert_member(Member::new(MemberId(5), "c", "d"))
            .unwrap_err();
        assert_eq!(err, LineupError::DuplicateId("M5".into()));

        // Ids are never reissued after an explicit insert.
        assert_eq!(l.create_member("e", "f", false), MemberId(6));
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut l = Lineup::new();
        let m = l.create_member("a", "b", false);
        assert_eq!(
            l.add_to_group(GroupId(3), m),
            Err(LineupError::UnknownGroup(GroupId(3)))
        );
        assert_eq!(
            l.subscribe(JobId(1), m),
            Err(LineupError::UnknownJob(JobId(1)))
        );
        assert_eq!(
            l.remove_member(MemberId(42)).unwrap_err(),
            LineupError::UnknownMember(MemberId(42))
        );
        assert_eq!(
            LineupError::UnknownJob(JobId(1)).to_string(),
            "Job not found: J1"
        );
    }

    #[test]
    fn test_group_membership_symmetry() {
        let mut l = Lineup::new();
        let m = l.create_member("a", "b", false);
        let g = l.create_group("G");

        assert_eq!(l.add_to_group(g, m), Ok(true));
        assert_eq!(l.add_to_group(g, m), Ok(false));
        assert!(l.group(g).unwrap().contains(m));
        assert_eq!(l.member(m).unwrap().groups(), &[g]);

        assert_eq!(l.remove_from_group(g, m), Ok(true));
        assert!(!l.group(g).unwrap().contains(m));
        assert!(l.member(m).unwrap().groups().is_empty());
    }

    #[test]
    fn test_set_member_manager_refreshes_groups() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut l = Lineup::new();
        let m = l.create_member("a", "b", false);
        let g = l.create_group("G");
        l.add_to_group(g, m).unwrap();
        l.group_mut(g)
            .unwrap()
            .notifier_mut()
            .subscribe(Property::ManagerCount, move |c| sink.lock().unwrap().push(c.source));

        assert_eq!(l.normal_count(g), Ok(1));
        assert_eq!(l.set_member_manager(m, true), Ok(true));
        assert_eq!(l.set_member_manager(m, true), Ok(false));

        assert_eq!(l.normal_count(g), Ok(0));
        assert_eq!(l.manager_count(g), Ok(1));
        assert_eq!(*log.lock().unwrap(), vec![Source::Group(g)]);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut l = Lineup::new();
        let m = l.create_member("a", "b", false);
        let j = l.create_job(at(8), "Kitchen");
        l.offer(j, m).unwrap();

        assert_eq!(l.subscribe(j, m), Ok(true));
        assert_eq!(l.member(m).unwrap().count(), 1);
        assert_eq!(l.unsubscribe(j, m), Ok(true));
        assert_eq!(l.unsubscribe(j, m), Ok(false));
        assert_eq!(l.member(m).unwrap().count(), 0);
        assert_eq!(l.job(j).unwrap().possible_subscribers(), &[m]);
    }

    #[test]
    fn test_resubscribe_after_manager_flip_is_rejected() {
        let mut l = Lineup::new();
        let m = l.create_member("a", "b", false);
        let j = l.create_job(at(8), "Kitchen");
        l.offer(j, m).unwrap();
        l.subscribe(j, m).unwrap();
        l.set_member_manager(m, true).unwrap();

        assert_eq!(l.subscribe(j, m), Ok(false));

        let job = l.job(j).unwrap();
        assert_eq!(job.subscribers(), &[m]);
        assert!(job.managers().is_empty());
        assert_eq!(l.member(m).unwrap().count(), 1);
        let errors = crate::validation::validate_lineup(&l).unwrap_err();
        assert!(errors
            .iter()
            .all(|e| e.kind != crate::validation::ValidationErrorKind::OverlappingSets));
    }

    #[test]
    fn test_subscribe_group() {
        let mut l = Lineup::new();
        let a = l.create_member("a", "a", false);
        let b = l.create_member("b", "b", false);
        let g = l.create_group("G");
        l.add_to_group(g, a).unwrap();
        l.add_to_group(g, b).unwrap();
        let small = l.create_job(at(8), "small");
        let big = l.create_job(at(9), "big");
        l.job_mut(small).unwrap().set_max_subscriber_count(1);
        l.job_mut(big).unwrap().set_max_subscriber_count(2);

        assert_eq!(l.subscribe_group(small, g), Ok(false));
        assert_eq!(l.subscribe_group(big, g), Ok(true));
        assert_eq!(l.job(big).unwrap().subscribers(), &[a, b]);
    }

    #[test]
    fn test_remove_member_cleans_groups_and_jobs() {
        let mut l = Lineup::new();
        let a = l.create_member("a", "a", false);
        let b = l.create_member("b", "b", false);
        let g1 = l.create_group("G1");
        let g2 = l.create_group("G2");
        l.add_to_group(g1, a).unwrap();
        l.add_to_group(g2, a).unwrap();
        l.add_to_group(g1, b).unwrap();
        let j = l.create_job(at(10), "J");
        l.offer(j, a).unwrap();
        l.offer(j, b).unwrap();
        l.subscribe(j, b).unwrap();

        let removed = l.remove_member(a).unwrap();

        assert!(removed.groups().is_empty());
        assert_eq!(l.group(g1).unwrap().members(), &[b]);
        assert!(l.group(g2).unwrap().is_empty());
        assert!(l.job(j).unwrap().possible_subscribers().is_empty());
        assert_eq!(l.job(j).unwrap().subscribers(), &[b]);
        assert!(l.member(a).is_none());
    }

    #[test]
    fn test_remove_group_dissolves() {
        let mut l = Lineup::new();
        let a = l.create_member("a", "a", false);
        let b = l.create_member("b", "b", true);
        let g = l.create_group("G");
        l.add_to_group(g, a).unwrap();
        l.add_to_group(g, b).unwrap();

        let removed = l.remove_group(g).unwrap();

        assert!(removed.is_empty());
        assert!(l.members().iter().all(|m| m.groups().is_empty()));
        assert!(l.group(g).is_none());
        // Ids are not reused.
        assert_eq!(l.create_group("H"), GroupId(1));
    }

    #[test]
    fn test_remove_job_leaves_counts() {
        let mut l = Lineup::new();
        let a = l.create_member("a", "a", false);
        let j = l.create_job(at(10), "J");
        l.subscribe(j, a).unwrap();

        let removed = l.remove_job(j).unwrap();

        assert_eq!(removed.subscribers(), &[a]);
        assert_eq!(l.member(a).unwrap().count(), 1);
        assert!(l.jobs().is_empty());
    }

    #[test]
    fn test_ordered_views() {
        let mut l = Lineup::new();
        let late = l.create_job(at(12), "late");
        let early = l.create_job(at(7), "early");
        let ids: Vec<JobId> = l.jobs_by_time().iter().map(|j| j.id()).collect();
        assert_eq!(ids, vec![early, late]);

        let busy = l.create_member("busy", "x", false);
        let idle = l.create_member("idle", "x", false);
        l.subscribe(late, busy).unwrap();
        let ids: Vec<MemberId> = l.members_by_count().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![idle, busy]);

        let big = l.create_group("big");
        let small = l.create_group("small");
        l.add_to_group(big, busy).unwrap();
        l.add_to_group(big, idle).unwrap();
        let ids: Vec<GroupId> = l.groups_by_size().iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec![small, big]);
    }

    #[test]
    fn test_lineup_notifies_collection_changes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut l = Lineup::new();
        l.notifier_mut()
            .subscribe_all(move |c| sink.lock().unwrap().push(c.property));

        let m = l.create_member("a", "b", false);
        l.create_group("G");
        l.create_job(at(9), "J");
        l.remove_member(m).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Property::Members,
                Property::Groups,
                Property::Jobs,
                Property::Members
            ]
        );
    }

    #[test]
    fn test_lineup_json_round_trip_keeps_relations() {
        let mut l = Lineup::new();
        let a = l.create_member("a", "b", false);
        let g = l.create_group("G");
        l.add_to_group(g, a).unwrap();

        let json = serde_json::to_string(&l).unwrap();
        let mut back: Lineup = serde_json::from_str(&json).unwrap();

        assert_eq!(back.member(a).unwrap().groups(), &[g]);
        assert_eq!(back.create_member("c", "d", false), MemberId(1));
    }
}
