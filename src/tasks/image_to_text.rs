//! Classic distorted-text image recognition.

use serde::{Deserialize, Serialize};

use super::{Task, ValidationError};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageToTextTask {
    /// Base64-encoded image, without the `data:` prefix.
    pub body: String,
    #[serde(rename = "CapMonsterModule", skip_serializing_if = "Option::is_none")]
    pub capmonster_module: Option<String>,
    #[serde(rename = "recognizingThreshold", skip_serializing_if = "Option::is_none")]
    pub recognizing_threshold: Option<u8>,
    #[serde(rename = "Case", skip_serializing_if = "Option::is_none")]
    pub case: Option<bool>,
    /// The service expects `1` for digits only and `0` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub math: Option<bool>,
}

impl ImageToTextTask {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            capmonster_module: None,
            recognizing_threshold: None,
            case: None,
            numeric: None,
            math: None,
        }
    }

    pub fn with_capmonster_module(mut self, module: impl Into<String>) -> Self {
        self.capmonster_module = Some(module.into());
        self
    }

    pub fn with_recognizing_threshold(mut self, threshold: u8) -> Self {
        self.recognizing_threshold = Some(threshold);
        self
    }

    pub fn with_case(mut self, case_sensitive: bool) -> Self {
        self.case = Some(case_sensitive);
        self
    }

    pub fn with_numeric(mut self, digits_only: bool) -> Self {
        self.numeric = Some(u8::from(digits_only));
        self
    }

    pub fn with_math(mut self, math: bool) -> Self {
        self.math = Some(math);
        self
    }
}

impl Task for ImageToTextTask {
    type Solution = ImageToTextSolution;

    fn task_type(&self) -> &'static str {
        "ImageToTextTask"
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::IMAGE_TO_TEXT
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.body.trim().is_empty() {
            return Err(ValidationError::EmptyImageBody);
        }
        if self.recognizing_threshold.is_some_and(|t| t > 100) {
            return Err(ValidationError::InvalidRecognizingThreshold);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageToTextSolution {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_service_field_names() {
        let task = ImageToTextTask::new("R0lGODlhAQABAAAAACw=")
            .with_capmonster_module("yandex")
            .with_recognizing_threshold(70)
            .with_case(true)
            .with_numeric(true);
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "body": "R0lGODlhAQABAAAAACw=",
                "CapMonsterModule": "yandex",
                "recognizingThreshold": 70,
                "Case": true,
                "numeric": 1
            })
        );
    }

    #[test]
    fn rejects_empty_body_and_bad_threshold() {
        assert_eq!(
            ImageToTextTask::new("  ").validate(),
            Err(ValidationError::EmptyImageBody)
        );
        assert_eq!(
            ImageToTextTask::new("R0lGODlh")
                .with_recognizing_threshold(101)
                .validate(),
            Err(ValidationError::InvalidRecognizingThreshold)
        );
    }
}
