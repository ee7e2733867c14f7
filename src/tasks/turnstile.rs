//! Cloudflare Turnstile tasks.

use serde::{Deserialize, Serialize};

use super::{
    Task, TaskProxy, UserAgentAndCookies, ValidationError, validate_proxy, validate_website_key,
    validate_website_url,
};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnstileTask {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_action: Option<String>,
    /// Value of the widget's `cData` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl TurnstileTask {
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
            page_action: None,
            data: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_page_action(mut self, page_action: impl Into<String>) -> Self {
        self.page_action = Some(page_action.into());
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
}

impl Task for TurnstileTask {
    type Solution = TurnstileSolution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "TurnstileTask"
        } else {
            "TurnstileTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::TURNSTILE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_key)?;
        validate_proxy(self.proxy.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnstileSolution {
    pub token: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}
