use std::fmt::Display;

use enumset::EnumSet;
use enumset::EnumSetType;

use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::propagation::PropagatorId;

/// A description of the kinds of events that can happen on a domain.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// The domain collapsed to a single value.
    Assign,
    /// The lower bound was tightened.
    LowerBound,
    /// The upper bound was tightened.
    UpperBound,
    /// At least one value was removed.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// For every domain, the propagators which are enqueued when one of its events fires.
#[derive(Default, Debug)]
pub(crate) struct WatchListDomainEvents {
    watchers: KeyedVec<DomainId, Watcher>,
}

#[derive(Debug, Default, Clone)]
struct Watcher {
    lower_bound_watchers: Vec<PropagatorId>,
    upper_bound_watchers: Vec<PropagatorId>,
    assign_watchers: Vec<PropagatorId>,
    removal_watchers: Vec<PropagatorId>,
}

impl Watcher {
    fn watchers_mut(&mut self, event: DomainEvent) -> &mut Vec<PropagatorId> {
        match event {
            DomainEvent::Assign => &mut self.assign_watchers,
            DomainEvent::LowerBound => &mut self.lower_bound_watchers,
            DomainEvent::UpperBound => &mut self.upper_bound_watchers,
            DomainEvent::Removal => &mut self.removal_watchers,
        }
    }
}

impl WatchListDomainEvents {
    pub(crate) fn watch_all(
        &mut self,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
        propagator: PropagatorId,
    ) {
        self.watchers.accommodate(domain, Watcher::default());

        for event in events {
            let watchers = self.watchers[domain].watchers_mut(event);
            if !watchers.contains(&propagator) {
                watchers.push(propagator);
            }
        }
    }

    pub(crate) fn get_affected_propagators(
        &self,
        event: DomainEvent,
        domain: DomainId,
    ) -> &[PropagatorId] {
        let Some(watcher) = self.watchers.get(domain) else {
            return &[];
        };

        match event {
            DomainEvent::Assign => &watcher.assign_watchers,
            DomainEvent::LowerBound => &watcher.lower_bound_watchers,
            DomainEvent::UpperBound => &watcher.upper_bound_watchers,
            DomainEvent::Removal => &watcher.removal_watchers,
        }
    }
}

/// Used to register a propagator for notifications about events to a particular domain.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator: PropagatorId,
    watch_list: &'a mut WatchListDomainEvents,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(propagator: PropagatorId, watch_list: &'a mut WatchListDomainEvents) -> Self {
        Watchers {
            propagator,
            watch_list,
        }
    }

    pub(crate) fn watch_all(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        self.watch_list.watch_all(domain, events, self.propagator);
    }
}
