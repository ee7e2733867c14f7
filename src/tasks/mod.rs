//! Typed task models for every captcha variant the service understands.
//!
//! Each variant is a plain value built through a named factory and refined
//! with by-value `with_*` setters. Proxy and browser settings are composed
//! from [`TaskProxy`] and [`UserAgentAndCookies`] rather than duplicated per
//! variant, and every task validates itself before the client talks to the
//! network.

mod common;
mod complex_image;
mod funcaptcha;
mod geetest;
mod hcaptcha;
mod image_to_text;
mod recaptcha;
mod turnstile;

pub use common::{ProxyType, TaskProxy, UserAgentAndCookies};
pub use complex_image::{
    ComplexImageAnswer, ComplexImageClass, ComplexImageMetadata, ComplexImageSolution,
    ComplexImageTask,
};
pub use funcaptcha::{FunCaptchaSolution, FunCaptchaTask};
pub use geetest::{GeeTestSolution, GeeTestTask, GeeTestVersion};
pub use hcaptcha::{HCaptchaSolution, HCaptchaTask};
pub use image_to_text::{ImageToTextSolution, ImageToTextTask};
pub use recaptcha::{
    EnterprisePayload, RecaptchaV2EnterpriseSolution, RecaptchaV2EnterpriseTask,
    RecaptchaV2Solution, RecaptchaV2Task, RecaptchaV3Solution, RecaptchaV3Task,
};
pub use turnstile::{TurnstileSolution, TurnstileTask};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::solving::TimingProfile;

/// Upper bound accepted for site keys, public keys and similar identifiers.
pub const MAX_WEBSITE_KEY_LEN: usize = 512;

/// Contract shared by every task the client can submit.
///
/// The serialized form of a task carries only its variant fields; the wire
/// `type` discriminator comes from [`Task::task_type`].
pub trait Task: Serialize + Send + Sync {
    /// Payload returned by the service once the task is solved.
    type Solution: DeserializeOwned + Send;

    /// Value of the `type` field sent to `createTask`.
    fn task_type(&self) -> &'static str;

    /// Polling schedule used while waiting for this task.
    fn timings(&self) -> TimingProfile;

    /// Check the task fields without touching the network.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Reasons a task is rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid website url")]
    InvalidWebsiteUrl,
    #[error("invalid website key")]
    InvalidWebsiteKey,
    #[error("invalid proxy type")]
    InvalidProxyType,
    #[error("invalid proxy address")]
    InvalidProxyAddress,
    #[error("invalid proxy port")]
    InvalidProxyPort,
    #[error("user agent is required when data is set")]
    UserAgentRequired,
    #[error("image body is empty")]
    EmptyImageBody,
    #[error("recognizing threshold must be within 0..=100")]
    InvalidRecognizingThreshold,
    #[error("min score must be within 0.1..=0.9")]
    InvalidMinScore,
    #[error("invalid geetest gt")]
    InvalidGt,
    #[error("geetest v3 requires a challenge")]
    ChallengeRequired,
    #[error("at least one image is required")]
    NoImages,
    #[error("image urls and base64 images are mutually exclusive")]
    ConflictingImageSources,
    #[error("task or task definition metadata is required")]
    MissingTaskDefinition,
}

pub(crate) fn validate_website_url(raw: &str) -> Result<(), ValidationError> {
    match Url::parse(raw) {
        Ok(url) if url.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidWebsiteUrl),
    }
}

pub(crate) fn validate_website_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() || key.len() > MAX_WEBSITE_KEY_LEN {
        return Err(ValidationError::InvalidWebsiteKey);
    }
    Ok(())
}

/// Raw page data is only accepted together with the browser that produced it.
pub(crate) fn validate_data_user_agent(
    data: Option<&str>,
    browser: &UserAgentAndCookies,
) -> Result<(), ValidationError> {
    if data.is_some() && browser.user_agent.is_none() {
        return Err(ValidationError::UserAgentRequired);
    }
    Ok(())
}

pub(crate) fn validate_proxy(proxy: Option<&TaskProxy>) -> Result<(), ValidationError> {
    match proxy {
        Some(proxy) => proxy.validate(),
        None => Ok(()),
    }
}
