//! Arkose Labs FunCaptcha tasks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    Task, TaskProxy, UserAgentAndCookies, ValidationError, validate_data_user_agent,
    validate_proxy, validate_website_key, validate_website_url,
};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunCaptchaTask {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub website_public_key: String,
    #[serde(
        rename = "funcaptchaApiJSSubdomain",
        skip_serializing_if = "Option::is_none"
    )]
    pub funcaptcha_api_js_subdomain: Option<String>,
    /// Extra `blob` value some sites pass to the widget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl FunCaptchaTask {
    /// Proxied FunCaptcha always runs with the caller's browser identity.
    pub fn new(
        website_url: impl Into<String>,
        website_public_key: impl Into<String>,
        proxy: TaskProxy,
        user_agent: impl Into<String>,
    ) -> Self {
        let task = Self::proxyless(website_url, website_public_key).with_user_agent(user_agent);
        Self {
            proxy: Some(proxy),
            ..task
        }
    }

    pub fn proxyless(
        website_url: impl Into<String>,
        website_public_key: impl Into<String>,
    ) -> Self {
        Self {
            website_url: website_url.into(),
            website_public_key: website_public_key.into(),
            funcaptcha_api_js_subdomain: None,
            data: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_funcaptcha_api_js_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.funcaptcha_api_js_subdomain = Some(subdomain.into());
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

impl Task for FunCaptchaTask {
    type Solution = FunCaptchaSolution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "FunCaptchaTask"
        } else {
            "FunCaptchaTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::FUNCAPTCHA
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        validate_website_key(&self.website_public_key)?;
        validate_data_user_agent(self.data.as_deref(), &self.browser)?;
        validate_proxy(self.proxy.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunCaptchaSolution {
    #[serde(alias = "Token")]
    pub token: String,
    #[serde(default)]
    pub cookies: Option<HashMap<String, String>>,
}
