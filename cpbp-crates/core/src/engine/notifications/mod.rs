//! Domain events and the lists of propagators watching them.
mod domain_events;
mod watch_list_domain_events;

pub use domain_events::DomainEvents;
pub use watch_list_domain_events::DomainEvent;
pub(crate) use watch_list_domain_events::WatchListDomainEvents;
pub use watch_list_domain_events::Watchers;
