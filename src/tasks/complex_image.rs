//! Image-grid challenges (hCaptcha, reCAPTCHA and FunCaptcha tiles) solved
//! from screenshots rather than a live page.

use serde::{Deserialize, Serialize};

use super::{Task, UserAgentAndCookies, ValidationError, validate_website_url};
use crate::solving::TimingProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexImageClass {
    Hcaptcha,
    Recaptcha,
    Funcaptcha,
}

/// Challenge description as rendered above the tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComplexImageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<String>,
    /// Tile layout such as `3x3` or `4x4`, reCAPTCHA only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
}

impl ComplexImageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_task_definition(mut self, definition: impl Into<String>) -> Self {
        self.task_definition = Some(definition.into());
        self
    }

    pub fn with_grid(mut self, grid: impl Into<String>) -> Self {
        self.grid = Some(grid.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexImageTask {
    pub class: ComplexImageClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_base64: Option<Vec<String>>,
    pub metadata: ComplexImageMetadata,
    #[serde(rename = "websiteURL", skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(flatten)]
    pub browser: UserAgentAndCookies,
}

impl ComplexImageTask {
    pub fn new(class: ComplexImageClass, metadata: ComplexImageMetadata) -> Self {
        Self {
            class,
            image_urls: None,
            images_base64: None,
            metadata,
            website_url: None,
            browser: UserAgentAndCookies::default(),
        }
    }

    pub fn hcaptcha(task: impl Into<String>) -> Self {
        Self::new(
            ComplexImageClass::Hcaptcha,
            ComplexImageMetadata::new().with_task(task),
        )
    }

    pub fn recaptcha(grid: impl Into<String>, task: impl Into<String>) -> Self {
        Self::new(
            ComplexImageClass::Recaptcha,
            ComplexImageMetadata::new().with_grid(grid).with_task(task),
        )
    }

    pub fn funcaptcha(task: impl Into<String>) -> Self {
        Self::new(
            ComplexImageClass::Funcaptcha,
            ComplexImageMetadata::new().with_task(task),
        )
    }

    pub fn with_image_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_images_base64<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images_base64 = Some(images.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_website_url(mut self, website_url: impl Into<String>) -> Self {
        self.website_url = Some(website_url.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.browser = self.browser.with_user_agent(user_agent);
        self
    }
}

impl Task for ComplexImageTask {
    type Solution = ComplexImageSolution;

    fn task_type(&self) -> &'static str {
        "ComplexImageTask"
    }

    fn timings(&self) -> TimingProfile {
        TimingProfile::COMPLEX_IMAGE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let has_urls = self.image_urls.as_ref().is_some_and(|v| !v.is_empty());
        let has_base64 = self.images_base64.as_ref().is_some_and(|v| !v.is_empty());
        match (has_urls, has_base64) {
            (false, false) => return Err(ValidationError::NoImages),
            (true, true) => return Err(ValidationError::ConflictingImageSources),
            _ => {}
        }
        if self.metadata.task.is_none() && self.metadata.task_definition.is_none() {
            return Err(ValidationError::MissingTaskDefinition);
        }
        if let Some(url) = &self.website_url {
            validate_website_url(url)?;
        }
        Ok(())
    }
}

/// Grid challenges answer with a flag per tile, FunCaptcha with tile indexes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ComplexImageAnswer {
    Grid(Vec<bool>),
    Indexes(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComplexImageSolution {
    pub answer: ComplexImageAnswer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recaptcha_grid_serializes_pascal_case_metadata() {
        let task = ComplexImageTask::recaptcha("3x3", "Click on traffic lights")
            .with_image_urls(["https://i.postimg.cc/yW8Fzd3j/grid.png"]);
        assert!(task.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "class": "recaptcha",
                "imageUrls": ["https://i.postimg.cc/yW8Fzd3j/grid.png"],
                "metadata": { "Task": "Click on traffic lights", "Grid": "3x3" }
            })
        );
    }

    #[test]
    fn image_sources_are_checked() {
        let task = ComplexImageTask::hcaptcha("Please click each image containing a bus");
        assert_eq!(task.validate(), Err(ValidationError::NoImages));

        let both = task
            .with_image_urls(["https://example.com/1.png"])
            .with_images_base64(["iVBORw0KGgo="]);
        assert_eq!(both.validate(), Err(ValidationError::ConflictingImageSources));
    }

    #[test]
    fn metadata_needs_a_task() {
        let task = ComplexImageTask::new(ComplexImageClass::Funcaptcha, ComplexImageMetadata::new())
            .with_images_base64(["iVBORw0KGgo="]);
        assert_eq!(task.validate(), Err(ValidationError::MissingTaskDefinition));
    }

    #[test]
    fn answers_decode_as_grid_or_indexes() {
        let grid: ComplexImageSolution =
            serde_json::from_value(json!({ "answer": [false, true, false] })).unwrap();
        assert_eq!(grid.answer, ComplexImageAnswer::Grid(vec![false, true, false]));

        let indexes: ComplexImageSolution =
            serde_json::from_value(json!({ "answer": [3] })).unwrap();
        assert_eq!(indexes.answer, ComplexImageAnswer::Indexes(vec![3]));
    }
}
