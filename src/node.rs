//! Host-facing generation flow: credential resolution, submit, poll,
//! materialize.
//!
//! Every failure is converted at this boundary into a failure output with a
//! JSON summary; no error propagates to the caller. The `video_url` slot of
//! the output is reserved and always empty.
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::{AppError, AppResult};
use crate::materialize::Materializer;
use crate::poller::{poll_until_done, CancelToken, PollOptions};
use crate::progress::ProgressSink;
use crate::veo::client::{VeoClient, VideoService};
use crate::veo::types::{GenerationRequest, GenerationResult};

/// The `(path, url, summary)` triple handed back to whatever drives the flow.
#[derive(Debug, Clone)]
pub struct NodeOutput {
    /// Path of the saved video; empty on failure.
    pub video_path: String,
    /// Reserved secondary URL; always empty.
    pub video_url: String,
    /// JSON-formatted status/metadata summary.
    pub response: String,
}

impl NodeOutput {
    fn from_result(result: GenerationResult) -> Self {
        NodeOutput {
            video_path: result.output_file_path.clone(),
            video_url: String::new(),
            response: result.summary_json(),
        }
    }
}

pub struct Veo2Node {
    config: Config,
    store: CredentialStore,
}

impl Veo2Node {
    pub fn new(config: Config) -> Self {
        let store = CredentialStore::new(&config.credentials_path);
        Veo2Node { config, store }
    }

    /// Run the full flow with the configured remote service.
    ///
    /// A non-empty `api_key` overrides and persists the stored credential;
    /// an empty one falls back to the store. With neither, the flow
    /// short-circuits before any network call.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        api_key: &str,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> NodeOutput {
        progress.update(5);
        let key = match self.resolve_credential(api_key) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!("{}", e);
                return NodeOutput::from_result(GenerationResult::failure(e.to_string()));
            }
        };
        progress.update(10);

        let client = VeoClient::new(self.config.api_base_url.clone(), key);
        self.generate_with_service(&client, request, progress, cancel).await
    }

    /// Same flow over any `VideoService` implementation.
    pub async fn generate_with_service<S: VideoService + ?Sized>(
        &self,
        service: &S,
        request: GenerationRequest,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> NodeOutput {
        match self.run_flow(service, &request, progress, cancel).await {
            Ok(result) => NodeOutput::from_result(result),
            Err(e) => {
                tracing::error!("Video generation flow failed: {}", e);
                NodeOutput::from_result(GenerationResult::failure(e.to_string()))
            }
        }
    }

    async fn run_flow<S: VideoService + ?Sized>(
        &self,
        service: &S,
        request: &GenerationRequest,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> AppResult<GenerationResult> {
        let operation = service.submit(request).await?;
        progress.update(20);

        let options = PollOptions {
            interval: self.config.poll_interval,
            deadline: self.config.timeout,
        };
        let completed = poll_until_done(service, operation, &options, progress, cancel).await?;
        progress.update(90);

        let materializer = Materializer::new(&self.config.output_dir);
        let result = materializer.materialize_first(service, &completed, request).await?;
        progress.update(100);
        Ok(result)
    }

    fn resolve_credential(&self, override_key: &str) -> AppResult<String> {
        let override_key = override_key.trim();
        if !override_key.is_empty() {
            self.store.save(override_key)?;
            return Ok(override_key.to_string());
        }
        self.store.load().ok_or(AppError::CredentialMissing)
    }
}
