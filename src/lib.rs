pub mod diff;
pub mod listing;
pub mod model;
pub mod notify;
pub mod report;
pub mod store;
pub mod watcher;
