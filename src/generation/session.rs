//! Generation session: status machine plus the current result set.
//!
//! Transitions:
//!
//! ```text
//! Idle|Succeeded|Failed --begin--> Loading --settle(Ok)--> Succeeded
//!                                          --settle(Err)-> Failed
//! ```
//!
//! A blank prompt never leaves the current state. A second request while
//! Loading is refused, so at most one response is ever pending. A failed
//! request keeps the previous results.

use tracing::{debug, error, info};

use super::client::GenerationBackend;
use super::response::GenerationResponse;
use crate::error::{WorkflowError, WorkflowResult};
use crate::results::{GenerationStatus, ResultSet};

/// Whether a request may start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Status moved to Loading; the request should be issued
    Start,
    /// Prompt was blank; nothing changed
    Ignored,
    /// A request is already in flight; nothing changed
    Busy,
}

/// Result of a `generate` call
#[derive(Debug)]
pub enum GenerateOutcome {
    /// Blank prompt, no-op
    Ignored,
    /// Refused because another request is in flight
    Busy,
    /// A new result set replaced the old one
    Published { count: usize },
    /// The request failed; previous results are untouched
    Failed(WorkflowError),
}

impl GenerateOutcome {
    /// Whether a new result set was published
    pub fn is_published(&self) -> bool {
        matches!(self, GenerateOutcome::Published { .. })
    }
}

/// Drives request/response cycles and holds the latest results
#[derive(Debug, Default)]
pub struct GenerationSession {
    status: GenerationStatus,
    results: ResultSet,
    /// Keywords from the last successful response
    keywords: Vec<String>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    /// The current result set
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Admit a request for `prompt`, entering Loading on success
    pub fn begin(&mut self, prompt: &str) -> Admission {
        if prompt.trim().is_empty() {
            debug!("ignoring generation request with blank prompt");
            return Admission::Ignored;
        }
        if self.status.is_loading() {
            debug!("generation already in flight, refusing overlapping request");
            return Admission::Busy;
        }
        self.status = GenerationStatus::Loading;
        Admission::Start
    }

    /// Apply the settled response of an admitted request
    pub fn settle(
        &mut self,
        prompt: &str,
        result: WorkflowResult<GenerationResponse>,
    ) -> GenerateOutcome {
        match result {
            Ok(response) => {
                info!(keywords = ?response.keywords, "generation keywords");
                let count = response.images.len();
                self.results = ResultSet::new(prompt, response.images);
                self.keywords = response.keywords;
                self.status = GenerationStatus::Succeeded;
                info!(count, "published new result set");
                GenerateOutcome::Published { count }
            }
            Err(e) => {
                error!(kind = e.kind(), "generation failed: {}", e);
                self.status = GenerationStatus::Failed;
                GenerateOutcome::Failed(e)
            }
        }
    }

    /// Run one full request cycle against `backend`
    pub async fn generate<B>(&mut self, backend: &B, prompt: &str) -> GenerateOutcome
    where
        B: GenerationBackend + ?Sized,
    {
        match self.begin(prompt) {
            Admission::Start => {}
            Admission::Ignored => return GenerateOutcome::Ignored,
            Admission::Busy => return GenerateOutcome::Busy,
        }
        let result = backend.generate(prompt).await;
        self.settle(prompt, result)
    }
}
