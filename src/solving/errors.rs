//! Classification of error codes reported by the service.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Code the service uses while a task is still being worked on.
pub const CAPTCHA_NOT_READY: &str = "CAPTCHA_NOT_READY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    KeyDoesNotExist,
    ZeroCaptchaFilesize,
    TooBigCaptchaFilesize,
    ZeroBalance,
    IpNotAllowed,
    CaptchaUnsolvable,
    NoSuchCaptchaId,
    WrongCaptchaId,
    IpBanned,
    NoSuchMethod,
    TooMuchRequests,
    DomainNotAllowed,
    TokenExpired,
    NoSlotAvailable,
    MaximumTimeExceed,
    BadParameters,
    Unknown,
}

static ERROR_CODES: Lazy<HashMap<&'static str, RemoteErrorKind>> = Lazy::new(|| {
    use RemoteErrorKind::*;
    HashMap::from([
        ("ERROR_KEY_DOES_NOT_EXIST", KeyDoesNotExist),
        ("ERROR_ZERO_CAPTCHA_FILESIZE", ZeroCaptchaFilesize),
        ("ERROR_TOO_BIG_CAPTCHA_FILESIZE", TooBigCaptchaFilesize),
        ("ERROR_ZERO_BALANCE", ZeroBalance),
        ("ERROR_IP_NOT_ALLOWED", IpNotAllowed),
        ("ERROR_CAPTCHA_UNSOLVABLE", CaptchaUnsolvable),
        ("ERROR_NO_SUCH_CAPCHA_ID", NoSuchCaptchaId),
        ("WRONG_CAPTCHA_ID", WrongCaptchaId),
        ("ERROR_IP_BANNED", IpBanned),
        ("ERROR_NO_SUCH_METHOD", NoSuchMethod),
        ("ERROR_TOO_MUCH_REQUESTS", TooMuchRequests),
        ("ERROR_DOMAIN_NOT_ALLOWED", DomainNotAllowed),
        ("ERROR_TOKEN_EXPIRED", TokenExpired),
        ("ERROR_NO_SLOT_AVAILABLE", NoSlotAvailable),
        ("ERROR_MAXIMUM_TIME_EXCEED", MaximumTimeExceed),
        ("ERROR_BAD_PARAMETERS", BadParameters),
    ])
});

impl RemoteErrorKind {
    /// Look a service error code up; unrecognised codes collapse to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        ERROR_CODES
            .get(code)
            .copied()
            .unwrap_or(RemoteErrorKind::Unknown)
    }

    fn message(&self) -> &'static str {
        match self {
            RemoteErrorKind::KeyDoesNotExist => "client key does not exist",
            RemoteErrorKind::ZeroCaptchaFilesize => "captcha image is empty",
            RemoteErrorKind::TooBigCaptchaFilesize => "captcha image is too big",
            RemoteErrorKind::ZeroBalance => "account balance is zero",
            RemoteErrorKind::IpNotAllowed => "requests from this ip are not allowed",
            RemoteErrorKind::CaptchaUnsolvable => "captcha could not be solved",
            RemoteErrorKind::NoSuchCaptchaId => "no captcha with this id",
            RemoteErrorKind::WrongCaptchaId => "wrong captcha id",
            RemoteErrorKind::IpBanned => "ip is banned",
            RemoteErrorKind::NoSuchMethod => "no such method",
            RemoteErrorKind::TooMuchRequests => "too many requests",
            RemoteErrorKind::DomainNotAllowed => "captchas from this domain are not allowed",
            RemoteErrorKind::TokenExpired => "captcha token expired",
            RemoteErrorKind::NoSlotAvailable => "no free solving slots",
            RemoteErrorKind::MaximumTimeExceed => "maximum solving time exceeded",
            RemoteErrorKind::BadParameters => "bad task parameters",
            RemoteErrorKind::Unknown => "unknown remote error",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error reported by the service in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} ({code})")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub code: String,
    pub description: Option<String>,
}

impl RemoteError {
    pub fn from_code(code: impl Into<String>, description: Option<String>) -> Self {
        let code = code.into();
        Self {
            kind: RemoteErrorKind::from_code(&code),
            code,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_their_kind() {
        assert_eq!(
            RemoteErrorKind::from_code("ERROR_ZERO_BALANCE"),
            RemoteErrorKind::ZeroBalance
        );
        assert_eq!(
            RemoteErrorKind::from_code("WRONG_CAPTCHA_ID"),
            RemoteErrorKind::WrongCaptchaId
        );
        assert_eq!(
            RemoteErrorKind::from_code("ERROR_NO_SUCH_CAPCHA_ID"),
            RemoteErrorKind::NoSuchCaptchaId
        );
    }

    #[test]
    fn unrecognised_codes_are_unknown() {
        assert_eq!(
            RemoteErrorKind::from_code("ERROR_FROM_THE_FUTURE"),
            RemoteErrorKind::Unknown
        );
        assert_eq!(
            RemoteErrorKind::from_code(CAPTCHA_NOT_READY),
            RemoteErrorKind::Unknown
        );
        assert_eq!(RemoteErrorKind::from_code(""), RemoteErrorKind::Unknown);
    }

    #[test]
    fn display_keeps_raw_code() {
        let err = RemoteError::from_code("ERROR_IP_BANNED", None);
        assert_eq!(err.to_string(), "ip is banned (ERROR_IP_BANNED)");
    }
}
