//! Domain and wire types for the Veo 2 generation API.
//!
//! Domain types (`GenerationRequest`, `GenerationResult`) are what callers
//! construct and receive; wire types (`SubmitBody`, `Operation`) mirror the
//! remote service's JSON schema and stay private to the crate where possible.
use std::fmt;
use std::str::FromStr;

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};

/// Aspect ratio accepted by the Veo 2 model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            other => Err(format!("Unsupported aspect ratio '{}', expected 16:9 or 9:16", other)),
        }
    }
}

/// Person generation policy forwarded to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    DontAllow,
    AllowAdult,
}

impl PersonGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonGeneration::DontAllow => "dont_allow",
            PersonGeneration::AllowAdult => "allow_adult",
        }
    }
}

impl fmt::Display for PersonGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dont_allow" => Ok(PersonGeneration::DontAllow),
            "allow_adult" => Ok(PersonGeneration::AllowAdult),
            other => Err(format!(
                "Unsupported person_generation '{}', expected dont_allow or allow_adult",
                other
            )),
        }
    }
}

/// Optional seed image for image-to-video generation.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Parameters for one video generation run. Immutable once submitted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: AspectRatio,
    pub person_generation: PersonGeneration,
    pub duration_seconds: u8,
    pub video_count: u8,
    pub seed: u64,
    pub source_image: Option<SourceImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            negative_prompt: None,
            aspect_ratio: AspectRatio::Landscape,
            person_generation: PersonGeneration::DontAllow,
            duration_seconds: 8,
            video_count: 1,
            seed: 0,
            source_image: None,
        }
    }

    pub fn with_negative_prompt(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.negative_prompt = if text.is_empty() { None } else { Some(text) };
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn with_person_generation(mut self, policy: PersonGeneration) -> Self {
        self.person_generation = policy;
        self
    }

    pub fn with_duration_seconds(mut self, secs: u8) -> Self {
        self.duration_seconds = secs;
        self
    }

    pub fn with_video_count(mut self, count: u8) -> Self {
        self.video_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_source_image(mut self, image: SourceImage) -> Self {
        self.source_image = Some(image);
        self
    }

    /// Validate field ranges before anything goes on the wire.
    pub fn validate(&self) -> AppResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Service("Prompt cannot be empty".to_string()));
        }
        if !(5..=8).contains(&self.duration_seconds) {
            return Err(AppError::Service(format!(
                "duration_seconds must be between 5 and 8, got {}",
                self.duration_seconds
            )));
        }
        if !(1..=2).contains(&self.video_count) {
            return Err(AppError::Service(format!(
                "video_count must be 1 or 2, got {}",
                self.video_count
            )));
        }
        Ok(())
    }

    /// Map this request onto the remote API's request schema. The image and
    /// no-image paths differ only in the presence of the instance `image`.
    pub(crate) fn to_submit_body(&self) -> SubmitBody {
        SubmitBody {
            instances: vec![Instance {
                prompt: self.prompt.clone(),
                image: self.source_image.as_ref().map(|img| ImagePayload {
                    bytes_base64_encoded: BASE64_STANDARD.encode(&img.bytes),
                    mime_type: img.mime_type.clone(),
                }),
            }],
            parameters: Parameters {
                aspect_ratio: self.aspect_ratio,
                person_generation: self.person_generation,
                duration_seconds: self.duration_seconds,
                sample_count: self.video_count,
                negative_prompt: self.negative_prompt.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitBody {
    pub instances: Vec<Instance>,
    pub parameters: Parameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Instance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImagePayload {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Parameters {
    pub aspect_ratio: AspectRatio,
    pub person_generation: PersonGeneration,
    pub duration_seconds: u8,
    pub sample_count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// Remote long-running operation, replaced wholesale on each refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

impl Operation {
    /// Error message reported by the remote job, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Download references for every generated sample, in service order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
            .map(|g| {
                g.generated_samples
                    .iter()
                    .map(|s| Artifact { uri: s.video.uri.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSample {
    pub video: VideoRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRef {
    pub uri: String,
}

/// One generated video attached to a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Failure,
}

/// Metadata recorded alongside a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: String,
    pub duration: u8,
    pub seed: u64,
    pub timestamp: String,
}

/// Terminal outcome of one generation flow. Created once, never mutated.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub output_file_path: String,
    pub status: GenerationStatus,
    pub error_message: Option<String>,
    pub metadata: Option<ResultMetadata>,
}

impl GenerationResult {
    pub fn success(output_file_path: String, metadata: ResultMetadata) -> Self {
        GenerationResult {
            output_file_path,
            status: GenerationStatus::Success,
            error_message: None,
            metadata: Some(metadata),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        GenerationResult {
            output_file_path: String::new(),
            status: GenerationStatus::Failure,
            error_message: Some(message.into()),
            metadata: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }

    /// Render the JSON status summary handed back to the caller.
    pub fn summary_json(&self) -> String {
        let value = match (&self.status, &self.metadata) {
            (GenerationStatus::Success, Some(meta)) => json!({
                "status": "success",
                "prompt": meta.prompt,
                "model": meta.model,
                "aspect_ratio": meta.aspect_ratio,
                "duration": meta.duration,
                "seed": meta.seed,
                "timestamp": meta.timestamp,
                "output_file_path": self.output_file_path,
            }),
            _ => json!({
                "status": "failure",
                "error": self.error_message.clone().unwrap_or_default(),
            }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_defaults() {
        let req = GenerationRequest::new("a beautiful sunset");
        assert_eq!(req.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(req.person_generation, PersonGeneration::DontAllow);
        assert_eq!(req.duration_seconds, 8);
        assert_eq!(req.video_count, 1);
        assert_eq!(req.seed, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_validation_rejects_out_of_range() {
        assert!(GenerationRequest::new("x").with_duration_seconds(4).validate().is_err());
        assert!(GenerationRequest::new("x").with_duration_seconds(9).validate().is_err());
        assert!(GenerationRequest::new("x").with_video_count(0).validate().is_err());
        assert!(GenerationRequest::new("x").with_video_count(3).validate().is_err());
        assert!(GenerationRequest::new("  ").validate().is_err());
    }

    #[test]
    fn submit_body_wire_shape() {
        let req = GenerationRequest::new("a cat")
            .with_negative_prompt("blurry")
            .with_aspect_ratio(AspectRatio::Portrait)
            .with_duration_seconds(5)
            .with_video_count(2);
        let body = serde_json::to_value(req.to_submit_body()).unwrap();

        assert_eq!(body["instances"][0]["prompt"], "a cat");
        assert!(body["instances"][0].get("image").is_none());
        assert_eq!(body["parameters"]["aspectRatio"], "9:16");
        assert_eq!(body["parameters"]["personGeneration"], "dont_allow");
        assert_eq!(body["parameters"]["durationSeconds"], 5);
        assert_eq!(body["parameters"]["sampleCount"], 2);
        assert_eq!(body["parameters"]["negativePrompt"], "blurry");
    }

    #[test]
    fn submit_body_encodes_source_image() {
        let req = GenerationRequest::new("a cat").with_source_image(SourceImage {
            bytes: b"image_data".to_vec(),
            mime_type: "image/png".to_string(),
        });
        let body = serde_json::to_value(req.to_submit_body()).unwrap();

        assert_eq!(body["instances"][0]["image"]["bytesBase64Encoded"], "aW1hZ2VfZGF0YQ==");
        assert_eq!(body["instances"][0]["image"]["mimeType"], "image/png");
    }

    #[test]
    fn operation_parses_pending_and_error() {
        let pending: Operation =
            serde_json::from_str(r#"{"name": "operations/abc123"}"#).unwrap();
        assert!(!pending.done);
        assert!(pending.error_message().is_none());
        assert!(pending.artifacts().is_empty());

        let failed: Operation = serde_json::from_str(
            r#"{"name": "operations/abc123", "done": true,
                "error": {"code": 3, "message": "quota exceeded"}}"#,
        )
        .unwrap();
        assert!(failed.done);
        assert_eq!(failed.error_message(), Some("quota exceeded"));
    }

    #[test]
    fn operation_collects_artifacts_in_order() {
        let op: Operation = serde_json::from_str(
            r#"{"name": "operations/abc123", "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": "https://files/one.mp4"}},
                    {"video": {"uri": "https://files/two.mp4"}}
                ]}}}"#,
        )
        .unwrap();
        let artifacts = op.artifacts();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].uri, "https://files/one.mp4");
        assert_eq!(artifacts[1].uri, "https://files/two.mp4");
    }

    #[test]
    fn summary_json_success_and_failure() {
        let result = GenerationResult::success(
            "/out/veo2_x.mp4".to_string(),
            ResultMetadata {
                prompt: "a cat".to_string(),
                model: "veo-2.0-generate-001".to_string(),
                aspect_ratio: "16:9".to_string(),
                duration: 8,
                seed: 42,
                timestamp: "2025-01-01 12:00:00".to_string(),
            },
        );
        let summary: serde_json::Value = serde_json::from_str(&result.summary_json()).unwrap();
        assert_eq!(summary["status"], "success");
        assert_eq!(summary["seed"], 42);
        assert_eq!(summary["duration"], 8);

        let failed = GenerationResult::failure("quota exceeded");
        let summary: serde_json::Value = serde_json::from_str(&failed.summary_json()).unwrap();
        assert_eq!(summary["status"], "failure");
        assert_eq!(summary["error"], "quota exceeded");
    }
}
