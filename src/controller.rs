//! Prompt input and the workbench that wires the whole workflow together.
//!
//! ```text
//! PromptController -> GenerationSession -> ResultSet -> SelectionManager -> DownloadOrchestrator
//! ```
//!
//! The [`Workbench`] is the single state container. Every operation takes
//! `&mut self`, including across its network awaits, so a download can never
//! observe a result set swapped out underneath it and generations never
//! overlap. Failures are caught here, logged, and handed back as outcomes.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::download::{DownloadOrchestrator, HttpAssetFetcher, SavedArtifact};
use crate::error::{WorkflowError, WorkflowResult};
use crate::generation::{GenerateOutcome, GenerationBackend, GenerationSession, HttpGenerationClient};
use crate::results::{GenerationStatus, ResultSet};
use crate::selection::{SelectionManager, SelectionState, ToggleOutcome};

/// Owns the prompt text and decides when generation may run
#[derive(Debug, Default, Clone)]
pub struct PromptController {
    value: String,
}

impl PromptController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the prompt text (user input)
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Whether the trimmed prompt has content
    pub fn is_submittable(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// Whether the generate action is enabled given the current status
    pub fn can_generate(&self, status: GenerationStatus) -> bool {
        self.is_submittable() && !status.is_loading()
    }
}

/// Result of a download action
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Nothing to download
    Nothing,
    Saved(SavedArtifact),
    Failed(WorkflowError),
}

/// Serializable view of the workbench
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchSnapshot {
    pub prompt: String,
    pub status: GenerationStatus,
    pub results: ResultSet,
    pub keywords: Vec<String>,
    pub selection: SelectionState,
}

/// The workflow state container
pub struct Workbench {
    prompt: PromptController,
    session: GenerationSession,
    selection: SelectionManager,
    backend: Box<dyn GenerationBackend>,
    downloads: DownloadOrchestrator,
    last_failure: Option<String>,
}

impl Workbench {
    pub fn new(backend: Box<dyn GenerationBackend>, downloads: DownloadOrchestrator) -> Self {
        Self {
            prompt: PromptController::new(),
            session: GenerationSession::new(),
            selection: SelectionManager::new(),
            backend,
            downloads,
            last_failure: None,
        }
    }

    /// Build a workbench talking HTTP to the configured service
    pub fn from_config(config: &Config) -> WorkflowResult<Self> {
        let backend = HttpGenerationClient::new(&config.api)?;
        let fetcher = HttpAssetFetcher::new(&config.api)
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        let downloads = DownloadOrchestrator::new(Box::new(fetcher), config.save.clone());
        Ok(Self::new(Box::new(backend), downloads))
    }

    pub fn prompt(&self) -> &PromptController {
        &self.prompt
    }

    pub fn set_prompt(&mut self, value: impl Into<String>) {
        self.prompt.set(value);
    }

    pub fn can_generate(&self) -> bool {
        self.prompt.can_generate(self.session.status())
    }

    pub fn status(&self) -> GenerationStatus {
        self.session.status()
    }

    pub fn results(&self) -> &ResultSet {
        self.session.results()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Message of the most recent failure, if any
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn snapshot(&self) -> WorkbenchSnapshot {
        WorkbenchSnapshot {
            prompt: self.prompt.value().to_string(),
            status: self.session.status(),
            results: self.session.results().clone(),
            keywords: self.session.keywords().to_vec(),
            selection: self.selection.state(),
        }
    }

    /// Generate results for the current prompt
    pub async fn generate(&mut self) -> GenerateOutcome {
        let prompt = self.prompt.value().to_string();
        let outcome = self.session.generate(self.backend.as_ref(), &prompt).await;
        match &outcome {
            GenerateOutcome::Published { count } => {
                self.selection.reset(*count);
                self.last_failure = None;
            }
            GenerateOutcome::Failed(e) => self.last_failure = Some(e.to_string()),
            GenerateOutcome::Ignored | GenerateOutcome::Busy => {}
        }
        outcome
    }

    /// Run generation again with the same prompt
    pub async fn refresh(&mut self) -> GenerateOutcome {
        info!("refreshing results");
        self.generate().await
    }

    /// Flip selection mode; returns whether it is now active
    pub fn toggle_selection_mode(&mut self) -> bool {
        self.selection.toggle_mode()
    }

    pub fn toggle_item(&mut self, index: usize) -> ToggleOutcome {
        self.selection.toggle_item(index)
    }

    /// Save the current selection
    pub async fn download_selected(&mut self) -> DownloadOutcome {
        let order = self.selection.order().to_vec();
        let result = self
            .downloads
            .download_selected(self.session.results(), &order)
            .await;
        self.finish_download(result)
    }

    /// Save the first result on its own
    pub async fn download_first(&mut self) -> DownloadOutcome {
        let Some(first) = self.session.results().first() else {
            warn!("no results to download");
            return DownloadOutcome::Nothing;
        };
        let url = first.url.clone();
        let result = self.downloads.download_single(&url).await.map(Some);
        self.finish_download(result)
    }

    fn finish_download(&mut self, result: WorkflowResult<Option<SavedArtifact>>) -> DownloadOutcome {
        match result {
            Ok(Some(artifact)) => {
                self.last_failure = None;
                DownloadOutcome::Saved(artifact)
            }
            Ok(None) => DownloadOutcome::Nothing,
            Err(e) => {
                error!(kind = e.kind(), "download failed: {}", e);
                self.last_failure = Some(e.to_string());
                DownloadOutcome::Failed(e)
            }
        }
    }
}
