//! Task submission and polling.
//!
//! [`Solver`] drives a task from validation through creation and a
//! deadline-bounded poll loop; [`TimingProfile`] and [`PollSchedule`]
//! decide when each poll fires.

mod engine;
mod errors;
mod schedule;
mod timing;

pub use engine::{SolveError, SolveOptions, SolveStage, Solver};
pub use errors::{CAPTCHA_NOT_READY, RemoteError, RemoteErrorKind};
pub use schedule::{PollPhase, PollSchedule};
pub use timing::TimingProfile;
