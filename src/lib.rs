//! Picture Prompt - turn a text prompt into images you can review and save.
//!
//! This crate provides:
//! - A client for the remote `/generate` service with typed response parsing
//! - A generation session that serializes requests and keeps the latest results
//! - Click-ordered selection of results
//! - Single-image and zip-archive saves that are all-or-nothing
//! - A [`Workbench`] state container plus an interactive shell
//!
//! # Example
//!
//! ```rust,no_run
//! use picture_prompt::{Config, DownloadOutcome, Workbench};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env().output_dir("./downloads");
//! let mut workbench = Workbench::from_config(&config)?;
//!
//! workbench.set_prompt("foggy harbour at dawn");
//! workbench.generate().await;
//!
//! workbench.toggle_selection_mode();
//! workbench.toggle_item(2);
//! workbench.toggle_item(0);
//! if let DownloadOutcome::Saved(artifact) = workbench.download_selected().await {
//!     println!("saved {}", artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod generation;
pub mod results;
pub mod selection;
pub mod shell;

// Re-export configuration
pub use config::Config;

// Re-export the workflow surface
pub use controller::{DownloadOutcome, PromptController, Workbench, WorkbenchSnapshot};
pub use error::{WorkflowError, WorkflowResult};
pub use results::{GenerationStatus, ImageResult, ResultSet};
pub use selection::{SelectionManager, SelectionState, ToggleOutcome};

// Re-export generation types
pub use generation::{GenerateOutcome, GenerationBackend, GenerationResponse, GenerationSession, HttpGenerationClient};

// Re-export download types
pub use download::{ArtifactKind, AssetFetcher, DownloadOrchestrator, FetchError, HttpAssetFetcher, SavedArtifact};
