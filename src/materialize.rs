//! Persisting generated artifacts to local files.
//!
//! A completed operation carries zero or more artifacts; `materialize_all`
//! saves every one of them to a uniquely named file and returns the results
//! in service order. `materialize_first` is the compatibility surface used
//! by the node, which keeps only the first artifact.
use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::veo::client::{VideoService, MODEL_ID};
use crate::veo::types::{Artifact, GenerationRequest, GenerationResult, Operation, ResultMetadata};

pub struct Materializer {
    output_dir: PathBuf,
}

impl Materializer {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Materializer { output_dir: output_dir.as_ref().to_path_buf() }
    }

    /// Save only the first artifact of a completed operation, discarding the
    /// rest. Fails with `EmptyResult` when the operation carries none.
    pub async fn materialize_first<S: VideoService + ?Sized>(
        &self,
        service: &S,
        operation: &Operation,
        request: &GenerationRequest,
    ) -> AppResult<GenerationResult> {
        let artifacts = operation.artifacts();
        let first = artifacts.first().ok_or(AppError::EmptyResult)?;
        if artifacts.len() > 1 {
            tracing::warn!("Discarding {} extra artifact(s)", artifacts.len() - 1);
        }
        self.save_artifact(service, first, request).await
    }

    /// Save every artifact of a completed operation, one result each, in
    /// service order.
    pub async fn materialize_all<S: VideoService + ?Sized>(
        &self,
        service: &S,
        operation: &Operation,
        request: &GenerationRequest,
    ) -> AppResult<Vec<GenerationResult>> {
        let artifacts = operation.artifacts();
        if artifacts.is_empty() {
            return Err(AppError::EmptyResult);
        }
        let mut results = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            results.push(self.save_artifact(service, artifact, request).await?);
        }
        Ok(results)
    }

    async fn save_artifact<S: VideoService + ?Sized>(
        &self,
        service: &S,
        artifact: &Artifact,
        request: &GenerationRequest,
    ) -> AppResult<GenerationResult> {
        let bytes = service.download(&artifact.uri).await?;

        let filename = format!("veo2_{}.mp4", Uuid::new_v4());
        let path = self.output_dir.join(filename);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            // Never leave a partial file behind a returned path.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Io(e));
        }
        tracing::info!("Saved video to {}", path.display());

        let metadata = ResultMetadata {
            prompt: request.prompt.clone(),
            model: MODEL_ID.to_string(),
            aspect_ratio: request.aspect_ratio.to_string(),
            duration: request.duration_seconds,
            seed: request.seed,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        Ok(GenerationResult::success(path.to_string_lossy().into_owned(), metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::veo::types::{
        GenerateVideoResponse, GeneratedSample, OperationResponse, VideoRef,
    };

    struct RecordingService {
        downloads: Mutex<Vec<String>>,
    }

    impl RecordingService {
        fn new() -> Self {
            RecordingService { downloads: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl VideoService for RecordingService {
        async fn submit(&self, _request: &GenerationRequest) -> AppResult<Operation> {
            unreachable!("materializer never submits")
        }

        async fn refresh(&self, _operation: &Operation) -> AppResult<Operation> {
            unreachable!("materializer never refreshes")
        }

        async fn download(&self, uri: &str) -> AppResult<Vec<u8>> {
            self.downloads.lock().unwrap().push(uri.to_string());
            Ok(b"fake video bytes".to_vec())
        }
    }

    fn completed_operation(uris: &[&str]) -> Operation {
        Operation {
            name: "operations/test".to_string(),
            done: true,
            error: None,
            response: Some(OperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: uris
                        .iter()
                        .map(|u| GeneratedSample { video: VideoRef { uri: u.to_string() } })
                        .collect(),
                }),
            }),
        }
    }

    #[tokio::test]
    async fn saves_first_artifact_only() {
        let dir = tempdir().unwrap();
        let service = RecordingService::new();
        let request = GenerationRequest::new("a cat").with_seed(42);
        let operation = completed_operation(&["https://files/one.mp4", "https://files/two.mp4"]);

        let result = Materializer::new(dir.path())
            .materialize_first(&service, &operation, &request)
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(*service.downloads.lock().unwrap(), vec!["https://files/one.mp4"]);
        let path = PathBuf::from(&result.output_file_path);
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("veo2_") && name.ends_with(".mp4"), "bad name {}", name);
        assert_eq!(result.metadata.as_ref().unwrap().seed, 42);
    }

    #[tokio::test]
    async fn filenames_are_unique_per_invocation() {
        let dir = tempdir().unwrap();
        let service = RecordingService::new();
        let request = GenerationRequest::new("a cat");
        let operation = completed_operation(&["https://files/one.mp4"]);
        let materializer = Materializer::new(dir.path());

        let a = materializer.materialize_first(&service, &operation, &request).await.unwrap();
        let b = materializer.materialize_first(&service, &operation, &request).await.unwrap();
        assert_ne!(a.output_file_path, b.output_file_path);
    }

    #[tokio::test]
    async fn all_artifacts_saved_in_order() {
        let dir = tempdir().unwrap();
        let service = RecordingService::new();
        let request = GenerationRequest::new("a cat").with_video_count(2);
        let operation = completed_operation(&["https://files/one.mp4", "https://files/two.mp4"]);

        let results = Materializer::new(dir.path())
            .materialize_all(&service, &operation, &request)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            *service.downloads.lock().unwrap(),
            vec!["https://files/one.mp4", "https://files/two.mp4"]
        );
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[tokio::test]
    async fn completed_without_artifacts_is_empty_result() {
        let dir = tempdir().unwrap();
        let service = RecordingService::new();
        let request = GenerationRequest::new("a cat");
        let operation = completed_operation(&[]);

        let err = Materializer::new(dir.path())
            .materialize_first(&service, &operation, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyResult));
    }

    #[tokio::test]
    async fn write_failure_leaves_no_success_result() {
        let service = RecordingService::new();
        let request = GenerationRequest::new("a cat");
        let operation = completed_operation(&["https://files/one.mp4"]);

        // Nonexistent directory forces the write to fail.
        let err = Materializer::new("/nonexistent-dir-for-test")
            .materialize_first(&service, &operation, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
