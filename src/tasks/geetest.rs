//! GeeTest v3 / v4 tasks.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{
    MAX_WEBSITE_KEY_LEN, Task, TaskProxy, UserAgentAndCookies, ValidationError, validate_proxy,
    validate_website_url,
};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeeTestVersion {
    #[default]
    V3,
    V4,
}

impl Serialize for GeeTestVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GeeTestVersion::V3 => serializer.serialize_u8(3),
            GeeTestVersion::V4 => serializer.serialize_u8(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeeTestTask {
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub gt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<GeeTestVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geetest_api_server_subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geetest_get_lib: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_parameters: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
    #[serde(flatten)]
    pub proxy: Option<TaskProxy>,
}

impl GeeTestTask {
    pub fn new(website_url: impl Into<String>, gt: impl Into<String>, proxy: TaskProxy) -> Self {
        Self {
            proxy: Some(proxy),
            ..Self::proxyless(website_url, gt)
        }
    }

    pub fn proxyless(website_url: impl Into<String>, gt: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            gt: gt.into(),
            challenge: None,
            version: None,
            geetest_api_server_subdomain: None,
            geetest_get_lib: None,
            init_parameters: None,
            browser: UserAgentAndCookies::default(),
            proxy: None,
        }
    }

    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    pub fn with_version(mut self, version: GeeTestVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_api_server_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.geetest_api_server_subdomain = Some(subdomain.into());
        self
    }

    pub fn with_get_lib(mut self, get_lib: impl Into<String>) -> Self {
        self.geetest_get_lib = Some(get_lib.into());
        self
    }

    pub fn with_init_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.init_parameters
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.browser = self.browser.with_user_agent(user_agent);
        self
    }
}

impl Task for GeeTestTask {
    type Solution = GeeTestSolution;

    fn task_type(&self) -> &'static str {
        if self.proxy.is_some() {
            "GeeTestTask"
        } else {
            "GeeTestTaskProxyless"
        }
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::GEETEST
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_website_url(&self.website_url)?;
        if self.gt.is_empty() || self.gt.len() > MAX_WEBSITE_KEY_LEN {
            return Err(ValidationError::InvalidGt);
        }
        let is_v3 = self.version.unwrap_or_default() == GeeTestVersion::V3;
        if is_v3 && self.challenge.as_deref().is_none_or(str::is_empty) {
            return Err(ValidationError::ChallengeRequired);
        }
        validate_proxy(self.proxy.as_ref())
    }
}

/// Union of the v3 and v4 answer shapes; only one set is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeeTestSolution {
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub validate: Option<String>,
    #[serde(default)]
    pub seccode: Option<String>,
    #[serde(default)]
    pub captcha_id: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub pass_token: Option<String>,
    #[serde(default)]
    pub gen_time: Option<String>,
    #[serde(default)]
    pub captcha_output: Option<String>,
}
