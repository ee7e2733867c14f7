//! hCaptcha tasks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    Task, TaskProxy, UserAgentAndCookies, ValidationError, validate_data_user_agent,
    validate_proxy, validate_website_key, validate_website_url,
};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HCaptchaTask {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_invisible: Option<bool>,
    /// Custom `rqdata` taken from the page, only honoured with a matching user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl HCaptchaTask {
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
            is_invisible: None,
            data: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_is_invisible(mut self, is_invisible: bool) -> Self {
        self.is_invisible = Some(is_invisible);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
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

impl Task for HCaptchaTask {
    type Solution = HCaptchaSolution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "HCaptchaTask"
        } else {
            "HCaptchaTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::HCAPTCHA
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_key)?;
        validate_data_user_agent(self.data.as_deref(), &self.browser)?;
        validate_proxy(self.proxy.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HCaptchaSolution {
    pub g_recaptcha_response: String,
    #[serde(default)]
    pub resp_key: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub cookies: Option<HashMap<String, String>>,
}
