//! Property change notification.
//!
//! Every mutable entity owns a [`PropertyNotifier`]. Observers (typically a
//! UI layer) register a handler for one [`Property`] or for all of them and
//! are called synchronously after the property actually changed. Setting a
//! property to its current value does not notify.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use u_roster::models::{Member, MemberId};
//! use u_roster::notify::Property;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let mut member = Member::new(MemberId(0), "Ada", "Byron");
//! member.notifier_mut().subscribe(Property::IsManager, move |change| {
//!     sink.lock().unwrap().push(change.property);
//! });
//!
//! member.set_manager(true);
//! member.set_manager(true); // unchanged, no second event
//! assert_eq!(*seen.lock().unwrap(), vec![Property::IsManager]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::models::{GroupId, JobId, MemberId};

/// Observable attributes across all entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    FirstName,
    LastName,
    IsManager,
    Count,
    Name,
    NormalCount,
    ManagerCount,
    Time,
    MinSubscriberCount,
    MaxSubscriberCount,
    MinManagerCount,
    MaxManagerCount,
    PossibleSubscribers,
    Subscribers,
    Managers,
    Members,
    Groups,
    Jobs,
}

/// The entity that emitted a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Member(MemberId),
    Group(GroupId),
    Job(JobId),
    Lineup,
}

/// Payload delivered to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChanged {
    /// Entity whose property changed.
    pub source: Source,
    /// Property that changed.
    pub property: Property,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&PropertyChanged) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    /// `None` listens to every property.
    filter: Option<Property>,
    handler: Handler,
}

/// Registry of change handlers owned by one entity.
///
/// Cloning an entity clones its registry; handlers are shared, not
/// duplicated.
#[derive(Default, Clone)]
pub struct PropertyNotifier {
    next_id: u64,
    subscriptions: Vec<Arc<Subscription>>,
}

impl PropertyNotifier {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for changes of `property`.
    pub fn subscribe<F>(&mut self, property: Property, handler: F) -> SubscriptionId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        self.insert(Some(property), Arc::new(handler))
    }

    /// Registers `handler` for changes of any property.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        self.insert(None, Arc::new(handler))
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers a change to every matching handler, in registration order.
    pub fn notify(&self, source: Source, property: Property) {
        let change = PropertyChanged { source, property };
        for sub in &self.subscriptions {
            if sub.filter.map_or(true, |p| p == property) {
                (sub.handler)(&change);
            }
        }
    }

    fn insert(&mut self, filter: Option<Property>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Arc::new(Subscription {
            id,
            filter,
            handler,
        }));
        id
    }
}

impl fmt::Debug for PropertyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyNotifier")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Assigns `value` to `field` and reports whether it changed.
pub(crate) fn replace<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}
