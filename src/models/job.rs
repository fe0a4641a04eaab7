//! Job model.
//!
//! A job is a task at a point in time that needs a number of ordinary
//! members ("subscribers") and managers. It holds three disjoint member
//! sequences:
//!
//! | Sequence | Content |
//! |----------|---------|
//! | `possible_subscribers` | Candidate pool, supplied by the caller |
//! | `subscribers` | Accepted non-managers |
//! | `managers` | Accepted managers |
//!
//! Acceptance moves a member out of the pool and increments its count;
//! removal reverses both effects.
//!
//! # Capacity
//! [`Job::add_subscriber`] does not check the maximum bounds. Callers that
//! care about capacity check it first; [`Job::add_subscriber_group`] does
//! so for whole groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::{Group, JobId, Member, MemberId};
use crate::notify::{self, Property, PropertyNotifier, Source};

/// Which accepted set a member lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Ordinary member.
    Subscriber,
    Manager,
}

impl Role {
    /// Role a member is routed to by its current manager flag.
    pub fn of(member: &Member) -> Self {
        if member.is_manager() {
            Role::Manager
        } else {
            Role::Subscriber
        }
    }
}

/// Outcome of admitting a whole group into a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAdmission {
    /// Every member was accepted, in group order.
    Admitted(Vec<MemberId>),
    /// The capacity precheck failed; nothing changed.
    OverCapacity,
    /// A member was already accepted. Members before it stay accepted.
    Interrupted {
        admitted: Vec<MemberId>,
        duplicate: MemberId,
    },
}

impl GroupAdmission {
    /// Whether every group member was accepted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, GroupAdmission::Admitted(_))
    }

    /// Members newly accepted by this admission, whatever the outcome.
    pub fn admitted(&self) -> &[MemberId] {
        match self {
            GroupAdmission::Admitted(ids) => ids.as_slice(),
            GroupAdmission::Interrupted { admitted, .. } => admitted.as_slice(),
            GroupAdmission::OverCapacity => &[],
        }
    }
}

/// A scheduled task with headcount bounds and a candidate pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    name: String,
    time: DateTime<Utc>,
    min_subscriber_count: usize,
    max_subscriber_count: usize,
    min_manager_count: usize,
    max_manager_count: usize,
    possible_subscribers: Vec<MemberId>,
    subscribers: Vec<MemberId>,
    managers: Vec<MemberId>,
    #[serde(skip)]
    notifier: PropertyNotifier,
}

impl Job {
    /// Creates a job scheduled now, with all bounds at zero.
    pub fn new(id: JobId) -> Self {
        Self::at(id, Utc::now())
    }

    /// Creates a job scheduled at `time`.
    pub fn at(id: JobId, time: DateTime<Utc>) -> Self {
        Self {
            id,
            name: String::new(),
            time,
            min_subscriber_count: 0,
            max_subscriber_count: 0,
            min_manager_count: 0,
            max_manager_count: 0,
            possible_subscribers: Vec::new(),
            subscribers: Vec::new(),
            managers: Vec::new(),
            notifier: PropertyNotifier::new(),
        }
    }

    /// Sets the job name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the ordinary member bounds.
    pub fn with_subscriber_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_subscriber_count = min;
        self.max_subscriber_count = max;
        self
    }

    /// Sets the manager bounds.
    pub fn with_manager_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_manager_count = min;
        self.max_manager_count = max;
        self
    }

    /// Adds members to the candidate pool (see [`Job::add_candidate`]).
    pub fn with_candidates<'a>(mut self, members: impl IntoIterator<Item = &'a Member>) -> Self {
        for m in members {
            self.add_candidate(m);
        }
        self
    }

    /// Job identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scheduled time.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Minimum number of ordinary members.
    pub fn min_subscriber_count(&self) -> usize {
        self.min_subscriber_count
    }

    /// Maximum number of ordinary members.
    pub fn max_subscriber_count(&self) -> usize {
        self.max_subscriber_count
    }

    /// Minimum number of managers.
    pub fn min_manager_count(&self) -> usize {
        self.min_manager_count
    }

    /// Maximum number of managers.
    pub fn max_manager_count(&self) -> usize {
        self.max_manager_count
    }

    /// Candidate pool.
    pub fn possible_subscribers(&self) -> &[MemberId] {
        &self.possible_subscribers
    }

    /// Accepted non-managers.
    pub fn subscribers(&self) -> &[MemberId] {
        &self.subscribers
    }

    /// Accepted managers.
    pub fn managers(&self) -> &[MemberId] {
        &self.managers
    }

    /// Accepted members of one role.
    pub fn accepted(&self, role: Role) -> &[MemberId] {
        match role {
            Role::Subscriber => &self.subscribers,
            Role::Manager => &self.managers,
        }
    }

    /// Minimum headcount for one role.
    pub fn minimum(&self, role: Role) -> usize {
        match role {
            Role::Subscriber => self.min_subscriber_count,
            Role::Manager => self.min_manager_count,
        }
    }

    /// Maximum headcount for one role.
    pub fn maximum(&self, role: Role) -> usize {
        match role {
            Role::Subscriber => self.max_subscriber_count,
            Role::Manager => self.max_manager_count,
        }
    }

    /// Whether the accepted headcount of `role` has reached its minimum.
    pub fn is_staffed(&self, role: Role) -> bool {
        self.accepted(role).len() >= self.minimum(role)
    }

    /// Change observers of this job.
    pub fn notifier(&self) -> &PropertyNotifier {
        &self.notifier
    }

    /// Mutable access for registering observers.
    pub fn notifier_mut(&mut self) -> &mut PropertyNotifier {
        &mut self.notifier
    }

    /// Renames the job; notifies `Name` on change.
    pub fn set_name(&mut self, name: impl Into<String>) {
        if notify::replace(&mut self.name, name.into()) {
            self.emit(Property::Name);
        }
    }

    /// Reschedules the job; notifies `Time` on change.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        if notify::replace(&mut self.time, time) {
            self.emit(Property::Time);
        }
    }

    /// Sets the ordinary member minimum.
    pub fn set_min_subscriber_count(&mut self, value: usize) {
        if notify::replace(&mut self.min_subscriber_count, value) {
            self.emit(Property::MinSubscriberCount);
        }
    }

    /// Sets the ordinary member maximum.
    pub fn set_max_subscriber_count(&mut self, value: usize) {
        if notify::replace(&mut self.max_subscriber_count, value) {
            self.emit(Property::MaxSubscriberCount);
        }
    }

    /// Sets the manager minimum.
    pub fn set_min_manager_count(&mut self, value: usize) {
        if notify::replace(&mut self.min_manager_count, value) {
            self.emit(Property::MinManagerCount);
        }
    }

    /// Sets the manager maximum.
    pub fn set_max_manager_count(&mut self, value: usize) {
        if notify::replace(&mut self.max_manager_count, value) {
            self.emit(Property::MaxManagerCount);
        }
    }

    /// Puts a member into the candidate pool.
    ///
    /// Returns `false` if it is already a candidate or already accepted.
    pub fn add_candidate(&mut self, member: &Member) -> bool {
        let id = member.id();
        if self.possible_subscribers.contains(&id) || self.holds(id) {
            return false;
        }
        self.possible_subscribers.push(id);
        self.emit(Property::PossibleSubscribers);
        true
    }

    /// Takes a member out of the candidate pool without accepting it.
    pub fn withdraw_candidate(&mut self, member: MemberId) -> bool {
        let before = self.possible_subscribers.len();
        self.possible_subscribers.retain(|&id| id != member);
        let changed = self.possible_subscribers.len() != before;
        if changed {
            self.emit(Property::PossibleSubscribers);
        }
        changed
    }

    /// Accepts a member into the set matching its manager flag.
    ///
    /// Increments the member's count and removes it from the candidate
    /// pool. Returns `false` without any change if it is already accepted
    /// in either set, whatever its current flag. Maximum bounds are not
    /// checked.
    pub fn add_subscriber(&mut self, member: &mut Member) -> bool {
        if self.holds(member.id()) {
            return false;
        }
        let role = Role::of(member);
        self.accepted_mut(role).push(member.id());
        member.increment_count();
        self.emit(role_property(role));
        self.withdraw_candidate(member.id());
        true
    }

    /// Releases an accepted member back into the candidate pool.
    ///
    /// Looks in the set matching the member's current manager flag. On
    /// success the member's count is decremented. Returns `false` without
    /// any change if the member is not accepted there.
    pub fn remove_subscriber(&mut self, member: &mut Member) -> bool {
        let role = Role::of(member);
        let set = self.accepted_mut(role);
        let Some(pos) = set.iter().position(|&id| id == member.id()) else {
            return false;
        };
        set.remove(pos);
        member.decrement_count();
        self.emit(role_property(role));
        self.possible_subscribers.push(member.id());
        self.emit(Property::PossibleSubscribers);
        true
    }

    /// Whether the member is accepted in the set matching its flag.
    pub fn is_subscriber(&self, member: &Member) -> bool {
        self.accepted(Role::of(member)).contains(&member.id())
    }

    /// Accepts a whole group if it fits the remaining capacity.
    ///
    /// Returns `true` only if every member was accepted. See
    /// [`Job::admit_group`] for the detailed outcome.
    pub fn add_subscriber_group(&mut self, group: &Group, directory: &mut [Member]) -> bool {
        self.admit_group(group, directory).is_admitted()
    }

    /// Accepts a whole group if it fits the remaining capacity.
    ///
    /// # Algorithm
    /// 1. Precheck: the group's non-managers must fit into
    ///    `max_subscriber_count - subscribers`, and its managers into
    ///    `max_manager_count - managers`. Otherwise nothing changes.
    /// 2. Accept members in group order via [`Job::add_subscriber`].
    /// 3. Stop at the first member that is already accepted. Members
    ///    accepted before it are kept (no rollback).
    ///
    /// Group members with no record in `directory` are skipped.
    pub fn admit_group(&mut self, group: &Group, directory: &mut [Member]) -> GroupAdmission {
        let normal = group.normal_count(directory);
        let managers = group.manager_count(directory);
        if !fits(normal, self.subscribers.len(), self.max_subscriber_count)
            || !fits(managers, self.managers.len(), self.max_manager_count)
        {
            return GroupAdmission::OverCapacity;
        }

        let mut admitted = Vec::with_capacity(group.len());
        for &id in group.members() {
            let Some(member) = directory.iter_mut().find(|m| m.id() == id) else {
                tracing::warn!(job_id = %self.id, group_id = %group.id(), member_id = %id, "group member has no record, skipped");
                continue;
            };
            if !self.add_subscriber(member) {
                return GroupAdmission::Interrupted {
                    admitted,
                    duplicate: id,
                };
            }
            admitted.push(id);
        }
        GroupAdmission::Admitted(admitted)
    }

    /// Orders by scheduled time, ascending.
    pub fn cmp_by_time(&self, other: &Job) -> Ordering {
        self.time.cmp(&other.time)
    }

    /// Drops every reference to `member` without touching its count.
    ///
    /// Used when the member record itself goes away.
    pub(crate) fn forget(&mut self, member: MemberId) {
        for (set, property) in [
            (&mut self.possible_subscribers, Property::PossibleSubscribers),
            (&mut self.subscribers, Property::Subscribers),
            (&mut self.managers, Property::Managers),
        ] {
            let before = set.len();
            set.retain(|&id| id != member);
            if set.len() != before {
                self.notifier.notify(Source::Job(self.id), property);
            }
        }
    }

    /// Whether `member` is in either accepted set.
    fn holds(&self, member: MemberId) -> bool {
        self.subscribers.contains(&member) || self.managers.contains(&member)
    }

    fn accepted_mut(&mut self, role: Role) -> &mut Vec<MemberId> {
        match role {
            Role::Subscriber => &mut self.subscribers,
            Role::Manager => &mut self.managers,
        }
    }

    fn emit(&self, property: Property) {
        self.notifier.notify(Source::Job(self.id), property);
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.time, self.name)
    }
}

fn fits(wanted: usize, taken: usize, max: usize) -> bool {
    wanted + taken <= max
}

fn role_property(role: Role) -> Property {
    match role {
        Role::Subscriber => Property::Subscribers,
        Role::Manager => Property::Managers,
    }
}
