//! reCAPTCHA v2, v2 Enterprise and v3 tasks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    Task, TaskProxy, UserAgentAndCookies, ValidationError, validate_proxy, validate_website_key,
    validate_website_url,
};
use crate::solving::TimingProfile;

/// reCAPTCHA v2 checkbox or invisible widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2Task {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha_data_s_value: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl RecaptchaV2Task {
    /// Task solved through the caller's proxy.
    pub fn new(
        website_url: impl Into<String>,
        website_key: impl Into<String>,
        proxy: TaskProxy,
    ) -> Self {
        Self {
            proxy: Some(proxy),
            ..Self::proxyless(website_url, website_key)
        }
    }

    /// Task solved from the service's own infrastructure.
    pub fn proxyless(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            website_key: website_key.into(),
            recaptcha_data_s_value: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_recaptcha_data_s_value(mut self, value: impl Into<String>) -> Self {
        self.recaptcha_data_s_value = Some(value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.browser = self.browser.with_user_agent(user_agent);
        self
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.browser = self.browser.with_cookies(cookies);
        self
    }
}

impl Task for RecaptchaV2Task {
    type Solution = RecaptchaV2Solution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "NoCaptchaTask"
        } else {
            "NoCaptchaTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::RECAPTCHA_V2
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_key)?;
        validate_proxy(self.proxy.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2Solution {
    pub g_recaptcha_response: String,
    #[serde(default)]
    pub cookies: Option<HashMap<String, String>>,
}

/// Extra parameters some Enterprise integrations pass to `grecaptcha.enterprise.render`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterprisePayload {
    pub s: String,
}

/// reCAPTCHA v2 Enterprise widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2EnterpriseTask {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_payload: Option<EnterprisePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl RecaptchaV2EnterpriseTask {
    pub fn new(
        website_url: impl Into<String>,
        website_key: impl Into<String>,
        proxy: TaskProxy,
    ) -> Self {
        Self {
            proxy: Some(proxy),
            ..Self::proxyless(website_url, website_key)
        }
    }

    pub fn proxyless(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            website_key: website_key.into(),
            enterprise_payload: None,
            api_domain: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_enterprise_payload(mut self, s: impl Into<String>) -> Self {
        self.enterprise_payload = Some(EnterprisePayload { s: s.into() });
        self
    }

    pub fn with_api_domain(mut self, api_domain: impl Into<String>) -> Self {
        self.api_domain = Some(api_domain.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.browser = self.browser.with_user_agent(user_agent);
        self
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.browser = self.browser.with_cookies(cookies);
        self
    }
}

impl Task for RecaptchaV2EnterpriseTask {
    type Solution = RecaptchaV2EnterpriseSolution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "RecaptchaV2EnterpriseTask"
        } else {
            "RecaptchaV2EnterpriseTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::RECAPTCHA_V2_ENTERPRISE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_key)?;
        validate_proxy(self.proxy.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV2EnterpriseSolution {
    pub g_recaptcha_response: String,
}

/// Score-based reCAPTCHA v3. The service only offers it proxyless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV3Task {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_action: Option<String>,
}

impl RecaptchaV3Task {
    pub const MIN_SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=0.9;

    pub fn proxyless(website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            website_key: website_key.into(),
            min_score: None,
            page_action: None,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_page_action(mut self, page_action: impl Into<String>) -> Self {
        self.page_action = Some(page_action.into());
        self
    }
}

impl Task for RecaptchaV3Task {
    type Solution = RecaptchaV3Solution;

    fn task_type(&self) -> &'static str {
        "RecaptchaV3TaskProxyless"
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::RECAPTCHA_V3
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_key)?;
        if let Some(score) = self.min_score
            && !Self::MIN_SCORE_RANGE.contains(&score)
        {
            return Err(ValidationError::InvalidMinScore);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecaptchaV3Solution {
    pub g_recaptcha_response: String,
}
