//! Veo 2 video generation client library.
//!
//! Modules:
//! - `veo`: Thin client for the Veo 2 REST endpoints plus domain/wire types.
//! - `credentials`: Durable JSON-file store for the single API key.
//! - `poller`: Deadline-bounded poll loop for long-running operations.
//! - `materialize`: Saving generated artifacts to uniquely named files.
//! - `node`: The submit -> poll -> materialize flow as exposed to a host.
//! - `progress`: Coarse progress-reporting sink.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `VeoClient`,
//! `CredentialStore`, `Veo2Node`, and the request/result types.
pub mod config;
pub mod credentials;
pub mod error;
pub mod materialize;
pub mod node;
pub mod poller;
pub mod progress;
pub mod veo;

pub use config::Config;
pub use credentials::CredentialStore;
pub use error::{AppError, AppResult};
pub use materialize::Materializer;
pub use node::{NodeOutput, Veo2Node};
pub use poller::{poll_until_done, CancelToken, PollOptions};
pub use progress::{NoopProgress, ProgressFn, ProgressSink};
pub use veo::client::{VeoClient, VideoService, MODEL_ID};
pub use veo::types::{
    AspectRatio, GenerationRequest, GenerationResult, GenerationStatus, Operation,
    PersonGeneration, ResultMetadata, SourceImage,
};
