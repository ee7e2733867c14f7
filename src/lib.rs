//! # capmonster-cloud
//!
//! Async client for the CapMonster Cloud captcha solving service.
//!
//! Build a typed task, hand it to the client and await the solution. The
//! client validates the task, creates it remotely and polls for the result
//! on a per-variant schedule until it is ready, fails or times out.
//!
//! ## Features
//!
//! - Typed tasks for reCAPTCHA v2/v2 Enterprise/v3, hCaptcha, FunCaptcha,
//!   GeeTest, Turnstile, image-to-text and complex image recognition
//! - Local validation before anything is sent
//! - Per-variant poll timings with no-cache support
//! - Classified service errors
//! - Lifecycle events and per task type metrics
//!
//! ## Example
//!
//! ```no_run
//! use capmonster_cloud::{CapMonsterClient, RecaptchaV2Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CapMonsterClient::from_env()?;
//!     let task = RecaptchaV2Task::proxyless(
//!         "https://lessons.zennolab.com/captchas/recaptcha/v2_simple.php?level=high",
//!         "6Lcg7CMUAAAAANphynKgn9YAgA4tQ2KI_iqRyTwd",
//!     );
//!     let solution = client.solve(&task).await?;
//!     println!("token: {}", solution.g_recaptcha_response);
//!     Ok(())
//! }
//! ```

mod client;

pub mod config;
pub mod modules;
pub mod solving;
pub mod tasks;
pub mod transport;

pub use crate::client::{
    CapMonsterClient,
    CapMonsterClientBuilder,
    CapMonsterError,
    CapMonsterResult,
};

pub use crate::config::{ClientConfig, ConfigError};

pub use crate::solving::{
    PollPhase,
    PollSchedule,
    RemoteError,
    RemoteErrorKind,
    SolveError,
    SolveOptions,
    SolveStage,
    Solver,
    TimingProfile,
};

pub use crate::tasks::{
    ComplexImageAnswer,
    ComplexImageClass,
    ComplexImageMetadata,
    ComplexImageSolution,
    ComplexImageTask,
    EnterprisePayload,
    FunCaptchaSolution,
    FunCaptchaTask,
    GeeTestSolution,
    GeeTestTask,
    GeeTestVersion,
    HCaptchaSolution,
    HCaptchaTask,
    ImageToTextSolution,
    ImageToTextTask,
    ProxyType,
    RecaptchaV2EnterpriseSolution,
    RecaptchaV2EnterpriseTask,
    RecaptchaV2Solution,
    RecaptchaV2Task,
    RecaptchaV3Solution,
    RecaptchaV3Task,
    Task,
    TaskProxy,
    TurnstileSolution,
    TurnstileTask,
    UserAgentAndCookies,
    ValidationError,
};

pub use crate::transport::{
    ReqwestTransport,
    SolverTransport,
    TaskId,
    TransportError,
};

pub use crate::modules::{
    EventDispatcher,
    EventHandler,
    LoggingHandler,
    MetricsCollector,
    MetricsHandler,
    MetricsSnapshot,
    SolveEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
