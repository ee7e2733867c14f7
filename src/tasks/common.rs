//! Field groups shared by several task variants.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::ValidationError;

/// Proxy protocols accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyType::Http),
            "https" => Ok(ProxyType::Https),
            "socks4" => Ok(ProxyType::Socks4),
            "socks5" => Ok(ProxyType::Socks5),
            _ => Err(ValidationError::InvalidProxyType),
        }
    }
}

/// Caller-supplied proxy the service routes the solving browser through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProxy {
    pub proxy_type: ProxyType,
    pub proxy_address: String,
    pub proxy_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<String>,
}

impl TaskProxy {
    pub fn new(proxy_type: ProxyType, proxy_address: impl Into<String>, proxy_port: u16) -> Self {
        Self {
            proxy_type,
            proxy_address: proxy_address.into(),
            proxy_port,
            proxy_login: None,
            proxy_password: None,
        }
    }

    /// Build a proxy from loosely typed parts, e.g. values read from a config file.
    pub fn parse(
        proxy_type: &str,
        proxy_address: impl Into<String>,
        proxy_port: i64,
    ) -> Result<Self, ValidationError> {
        let proxy_type = proxy_type.parse()?;
        let proxy_port = u16::try_from(proxy_port).map_err(|_| ValidationError::InvalidProxyPort)?;
        let proxy = Self::new(proxy_type, proxy_address, proxy_port);
        proxy.validate()?;
        Ok(proxy)
    }

    pub fn with_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_login = Some(login.into());
        self.proxy_password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_proxy_address(&self.proxy_address) {
            return Err(ValidationError::InvalidProxyAddress);
        }
        if self.proxy_port == 0 {
            return Err(ValidationError::InvalidProxyPort);
        }
        Ok(())
    }
}

/// Browser identity forwarded to the solver. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentAndCookies {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

impl UserAgentAndCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }
}

fn is_valid_proxy_address(address: &str) -> bool {
    let address = address.trim();
    if address.is_empty() {
        return false;
    }
    if address.parse::<IpAddr>().is_ok() {
        return true;
    }
    address.len() <= 253 && HOSTNAME_RE.is_match(address)
}

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("invalid proxy host name regex")
});
