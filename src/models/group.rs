//! Group model.
//!
//! A group is a named, ordered collection of members that prefer to be
//! scheduled together. Membership is many-to-many: a group references its
//! members by id and does not own them. The relation is kept symmetric by
//! routing every change through [`Group::add_member`] and
//! [`Group::remove_member`], which update the member's back-references in
//! the same call.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::{find_member, GroupId, Member, MemberId};
use crate::notify::{self, Property, PropertyNotifier, Source};

/// A named set of members used as a unit of joint assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: Option<String>,
    members: Vec<MemberId>,
    #[serde(skip)]
    notifier: PropertyNotifier,
}

impl Group {
    /// Creates an unnamed, empty group.
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            name: None,
            members: Vec::new(),
            notifier: PropertyNotifier::new(),
        }
    }

    /// Sets the group name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Group identifier.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Group name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Member ids in joining order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Change observers of this group.
    pub fn notifier(&self) -> &PropertyNotifier {
        &self.notifier
    }

    /// Mutable access for registering observers.
    pub fn notifier_mut(&mut self) -> &mut PropertyNotifier {
        &mut self.notifier
    }

    /// Renames the group; notifies `Name` on change.
    pub fn set_name(&mut self, name: Option<String>) {
        if notify::replace(&mut self.name, name) {
            self.emit(Property::Name);
        }
    }

    /// Adds a member. Returns `false` (and does nothing) if already present.
    pub fn add_member(&mut self, member: &mut Member) -> bool {
        if self.contains(member.id()) {
            return false;
        }
        self.members.push(member.id());
        member.subscribe_to_group(self.id);
        self.emit_counts();
        true
    }

    /// Removes a member. Returns `false` (and does nothing) if absent.
    pub fn remove_member(&mut self, member: &mut Member) -> bool {
        let Some(pos) = self.members.iter().position(|&id| id == member.id()) else {
            return false;
        };
        self.members.remove(pos);
        member.unsubscribe_from_group(self.id);
        self.emit_counts();
        true
    }

    /// Whether `member` belongs to this group.
    pub fn is_group_member(&self, member: &Member) -> bool {
        self.contains(member.id())
    }

    /// Whether the member id is listed.
    pub fn contains(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    /// Number of non-manager members, looked up live in `directory`.
    ///
    /// Ids with no record in `directory` are not counted.
    pub fn normal_count(&self, directory: &[Member]) -> usize {
        self.count_where(directory, |m| !m.is_manager())
    }

    /// Number of manager members, looked up live in `directory`.
    pub fn manager_count(&self, directory: &[Member]) -> usize {
        self.count_where(directory, Member::is_manager)
    }

    /// Orders by number of members, ascending.
    pub fn cmp_by_size(&self, other: &Group) -> Ordering {
        self.members.len().cmp(&other.members.len())
    }

    /// Removes every member, last first, clearing their back-references.
    ///
    /// Ids with no record in `directory` are dropped from the group as is.
    pub fn dissolve(&mut self, directory: &mut [Member]) {
        while let Some(&last) = self.members.last() {
            match directory.iter_mut().find(|m| m.id() == last) {
                Some(member) => {
                    self.remove_member(member);
                }
                None => {
                    self.members.pop();
                    self.emit_counts();
                }
            }
        }
    }

    /// Re-announces the derived counts, e.g. after a member's flag changed.
    pub(crate) fn emit_counts(&self) {
        self.emit(Property::NormalCount);
        self.emit(Property::ManagerCount);
    }

    fn count_where(&self, directory: &[Member], pred: impl Fn(&Member) -> bool) -> usize {
        self.members
            .iter()
            .filter_map(|&id| find_member(directory, id))
            .filter(|m| pred(*m))
            .count()
    }

    fn emit(&self, property: Property) {
        self.notifier.notify(Source::Group(self.id), property);
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Group {}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}
