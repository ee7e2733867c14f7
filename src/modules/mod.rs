//! Cross-cutting services module
//!
//! Lifecycle events and the metrics they feed.

pub mod events;
pub mod metrics;

pub use events::{
    EventDispatcher, EventHandler, FailedEvent, LoggingHandler, MetricsHandler, PollEvent,
    PollOutcome, SolveEvent, SolvedEvent, TaskCreatedEvent, TimedOutEvent,
};
pub use metrics::{GlobalStats, MetricsCollector, MetricsSnapshot, TaskTypeStats};
