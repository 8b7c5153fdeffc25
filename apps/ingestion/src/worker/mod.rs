//! Polling worker
//!
//! - Poller: one scan cycle over both key namespaces, plus the adaptive wait loop
//! - supervise: bounded, fixed-delay retry of a whole session
//! - run_session: connects both stores and drives the poller until it fails

pub mod poller;
pub mod session;
pub mod supervisor;

pub use poller::Poller;
pub use session::run_session;
pub use supervisor::supervise;
