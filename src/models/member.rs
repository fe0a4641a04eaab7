//! Member model.
//!
//! A member is a person who can be accepted into jobs and belong to
//! groups. Its `count` records how many job slots it currently holds and
//! is the fairness weight used by the scheduler: members with a lower
//! count are preferred.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::{Group, GroupId, MemberId};
use crate::notify::{self, Property, PropertyNotifier, Source};

/// A person eligible for job assignment.
///
/// Equality is identity-based. Use [`Member::cmp_by_count`] to order
/// members by how often they have been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    first_name: String,
    last_name: String,
    is_manager: bool,
    count: u32,
    /// Back-references maintained by [`Group`]; never edited directly.
    groups: Vec<GroupId>,
    #[serde(skip)]
    notifier: PropertyNotifier,
}

impl Member {
    /// Creates an ordinary (non-manager) member with a zero count.
    pub fn new(id: MemberId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_manager: false,
            count: 0,
            groups: Vec::new(),
            notifier: PropertyNotifier::new(),
        }
    }

    /// Sets the manager flag.
    pub fn with_manager(mut self, is_manager: bool) -> Self {
        self.is_manager = is_manager;
        self
    }

    /// Sets the initial assignment count (carried over from earlier rounds).
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Member identifier.
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Whether the member fills manager slots.
    pub fn is_manager(&self) -> bool {
        self.is_manager
    }

    /// Number of job slots this member currently holds.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Groups this member belongs to, in joining order.
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    /// The group used for joint admission: the first one joined.
    pub fn primary_group(&self) -> Option<GroupId> {
        self.groups.first().copied()
    }

    /// Change observers of this member.
    pub fn notifier(&self) -> &PropertyNotifier {
        &self.notifier
    }

    /// Mutable access for registering observers.
    pub fn notifier_mut(&mut self) -> &mut PropertyNotifier {
        &mut self.notifier
    }

    /// Changes the given name; notifies `FirstName` on change.
    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        if notify::replace(&mut self.first_name, first_name.into()) {
            self.emit(Property::FirstName);
        }
    }

    /// Changes the family name; notifies `LastName` on change.
    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        if notify::replace(&mut self.last_name, last_name.into()) {
            self.emit(Property::LastName);
        }
    }

    /// Changes the manager flag. Returns `true` if it changed.
    ///
    /// Jobs route members by their *current* flag, so flipping it while the
    /// member is accepted somewhere makes that job's `remove_subscriber`
    /// look in the wrong set. Groups are not notified from here; use
    /// [`Lineup::set_member_manager`](super::Lineup::set_member_manager)
    /// to refresh their derived counts as well.
    pub fn set_manager(&mut self, is_manager: bool) -> bool {
        let changed = notify::replace(&mut self.is_manager, is_manager);
        if changed {
            self.emit(Property::IsManager);
        }
        changed
    }

    /// Orders by assignment count, ascending. Equal counts compare equal.
    pub fn cmp_by_count(&self, other: &Member) -> Ordering {
        self.count.cmp(&other.count)
    }

    /// Detaches this member from every group it belongs to.
    ///
    /// Groups are visited from the most recently joined backwards, each
    /// through [`Group::remove_member`] so their own notifications fire.
    /// Back-references to groups missing from `groups` (or that do not list
    /// this member) are dropped directly.
    pub fn leave_all_groups(&mut self, groups: &mut [Group]) {
        while let Some(&group_id) = self.groups.last() {
            let removed = groups
                .iter_mut()
                .find(|g| g.id() == group_id)
                .is_some_and(|group| group.remove_member(self));
            if !removed {
                self.unsubscribe_from_group(group_id);
            }
        }
    }

    pub(crate) fn subscribe_to_group(&mut self, group: GroupId) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub(crate) fn unsubscribe_from_group(&mut self, group: GroupId) {
        self.groups.retain(|&g| g != group);
    }

    pub(crate) fn increment_count(&mut self) {
        self.count += 1;
        self.emit(Property::Count);
    }

    pub(crate) fn decrement_count(&mut self) {
        if self.count > 0 {
            self.count -= 1;
            self.emit(Property::Count);
        }
    }

    fn emit(&self, property: Property) {
        self.notifier.notify(Source::Member(self.id), property);
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_member_builder() {
        let m = Member::new(MemberId(1), "Grace", "Hopper")
            .with_manager(true)
            .with_count(4);

        assert_eq!(m.id(), MemberId(1));
        assert_eq!(m.first_name(), "Grace");
        assert_eq!(m.last_name(), "Hopper");
        assert!(m.is_manager());
        assert_eq!(m.count(), 4);
        assert!(m.groups().is_empty());
        assert_eq!(m.to_string(), "Grace Hopper");
    }

    #[test]
    fn test_member_defaults() {
        let m = Member::new(MemberId(0), "A", "B");
        assert!(!m.is_manager());
        assert_eq!(m.count(), 0);
        assert_eq!(m.primary_group(), None);
    }

    #[test]
    fn test_cmp_by_count() {
        let low = Member::new(MemberId(0), "a", "a").with_count(1);
        let high = Member::new(MemberId(1), "b", "b").with_count(5);
        let tie = Member::new(MemberId(2), "c", "c").with_count(1);

        assert_eq!(low.cmp_by_count(&high), Ordering::Less);
        assert_eq!(high.cmp_by_count(&low), Ordering::Greater);
        assert_eq!(low.cmp_by_count(&tie), Ordering::Equal);
        // Equal count does not make them the same member.
        assert_ne!(low, tie);
    }

    #[test]
    fn test_group_subscription_is_idempotent() {
        let mut m = Member::new(MemberId(0), "a", "b");
        m.subscribe_to_group(GroupId(3));
        m.subscribe_to_group(GroupId(3));
        m.subscribe_to_group(GroupId(1));
        assert_eq!(m.groups(), &[GroupId(3), GroupId(1)]);
        assert_eq!(m.primary_group(), Some(GroupId(3)));

        m.unsubscribe_from_group(GroupId(3));
        assert_eq!(m.groups(), &[GroupId(1)]);
    }

    #[test]
    fn test_count_never_underflows() {
        let mut m = Member::new(MemberId(0), "a", "b");
        m.decrement_count();
        assert_eq!(m.count(), 0);
        m.increment_count();
        m.increment_count();
        m.decrement_count();
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_setters_notify_only_on_change() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut m = Member::new(MemberId(0), "a", "b");
        m.notifier_mut()
            .subscribe_all(move |c| sink.lock().unwrap().push(c.property));

        m.set_first_name("a");
        m.set_first_name("z");
        m.set_last_name("y");
        assert!(m.set_manager(true));
        assert!(!m.set_manager(true));
        m.increment_count();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Property::FirstName,
                Property::LastName,
                Property::IsManager,
                Property::Count
            ]
        );
    }

    #[test]
    fn test_leave_all_groups() {
        let mut m = Member::new(MemberId(0), "a", "b");
        let mut groups = vec![Group::new(GroupId(0)), Group::new(GroupId(1))];
        for g in groups.iter_mut() {
            g.add_member(&mut m);
        }
        // A dangling back-reference is cleaned up as well.
        m.subscribe_to_group(GroupId(9));

        m.leave_all_groups(&mut groups);

        assert!(m.groups().is_empty());
        assert!(groups.iter().all(|g| !g.is_group_member(&m)));
    }
}
