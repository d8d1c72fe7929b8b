//! Event pipeline (C5) and typed handlers (C6): the orchestration layer
//! that sits between the hook HTTP server and the stateful machinery in
//! `discode-hooks`. `dispatch::handle_event` is the crate's single entry
//! point; everything else is internal wiring it depends on.

pub mod dispatch;
pub mod handlers;
pub mod metrics;
pub mod structured;
pub mod timers;

pub use dispatch::{handle_event, Deps, DispatchOutcome, KeyLocks};
pub use metrics::Metrics;
pub use timers::TimerRegistry;
