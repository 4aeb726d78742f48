//! Saving selected results to disk.
//!
//! One selected item is saved as a single image file. Several are fetched
//! one after another, in ordering-log sequence, into an in-memory archive
//! that is saved only once every member arrived. Any failed retrieval aborts
//! the batch with nothing written.

pub mod archive;
pub mod fetch;
pub mod naming;
pub mod save;

pub use archive::ArchiveBuilder;
pub use fetch::{AssetFetcher, FetchError, HttpAssetFetcher, decode_data_url};
pub use save::SaveHandle;

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::SaveSettings;
use crate::error::{WorkflowError, WorkflowResult};
use crate::results::ResultSet;

/// Shape of a saved file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Single,
    Archive,
}

/// One image inside a saved artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedEntry {
    /// File or entry name (`image.png`, `image2.jpg`)
    pub name: String,
    /// ResultSet position, when the image came from the result set
    pub index: Option<usize>,
    pub url: String,
}

/// A file written by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: usize,
    pub entries: Vec<SavedEntry>,
}

/// Turns selections into files
pub struct DownloadOrchestrator {
    fetcher: Box<dyn AssetFetcher>,
    settings: SaveSettings,
}

impl DownloadOrchestrator {
    pub fn new(fetcher: Box<dyn AssetFetcher>, settings: SaveSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Fetch one URL and save it as the default single-image file
    pub async fn download_single(&self, url: &str) -> WorkflowResult<SavedArtifact> {
        self.save_single(None, url).await
    }

    /// Save the items at `order` (ordering-log sequence) from `results`.
    ///
    /// Returns `Ok(None)` for an empty selection.
    pub async fn download_selected(
        &self,
        results: &ResultSet,
        order: &[usize],
    ) -> WorkflowResult<Option<SavedArtifact>> {
        match order {
            [] => {
                debug!("nothing selected, skipping download");
                Ok(None)
            }
            [index] => {
                let url = item_url(results, *index)?;
                self.save_single(Some(*index), url).await.map(Some)
            }
            _ => self.save_archive(results, order).await.map(Some),
        }
    }

    async fn save_single(&self, index: Option<usize>, url: &str) -> WorkflowResult<SavedArtifact> {
        let bytes = self.retrieve(index, url).await?;
        let ext = naming::detect_extension(&bytes, url, &self.settings.default_extension);
        let name = naming::single_file_name(&self.settings.single_name, &ext);

        let handle = SaveHandle::stage(&self.settings.output_dir, &name, &bytes)?;
        let path = handle.trigger()?;
        info!(path = %path.display(), "saved image");

        Ok(SavedArtifact {
            kind: ArtifactKind::Single,
            size: bytes.len(),
            entries: vec![SavedEntry {
                name: file_name_of(&path, name),
                index,
                url: url.to_string(),
            }],
            path,
        })
    }

    async fn save_archive(
        &self,
        results: &ResultSet,
        order: &[usize],
    ) -> WorkflowResult<SavedArtifact> {
        let mut builder = ArchiveBuilder::new();
        let mut entries = Vec::with_capacity(order.len());

        for (position, &index) in order.iter().enumerate() {
            let url = item_url(results, index)?;
            let bytes = self.retrieve(Some(index), url).await?;
            let ext = naming::detect_extension(&bytes, url, &self.settings.default_extension);
            let name = naming::archive_entry_name(position + 1, &ext);
            builder.add(&name, &bytes)?;
            debug!(entry = %name, index, "added archive member");
            entries.push(SavedEntry {
                name,
                index: Some(index),
                url: url.to_string(),
            });
        }

        let archive = builder.finish()?;
        let handle =
            SaveHandle::stage(&self.settings.output_dir, &self.settings.archive_name, &archive)?;
        let path = handle.trigger()?;
        info!(path = %path.display(), members = entries.len(), "saved archive");

        Ok(SavedArtifact {
            kind: ArtifactKind::Archive,
            path,
            size: archive.len(),
            entries,
        })
    }

    async fn retrieve(&self, index: Option<usize>, url: &str) -> WorkflowResult<Vec<u8>> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| WorkflowError::AssetRetrieval {
                index,
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn item_url(results: &ResultSet, index: usize) -> WorkflowResult<&str> {
    results
        .get(index)
        .map(|item| item.url.as_str())
        .ok_or_else(|| WorkflowError::AssetRetrieval {
            index: Some(index),
            url: String::new(),
            reason: format!("no result at position {}", index),
        })
}

fn file_name_of(path: &std::path::Path, fallback: String) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or(fallback)
}
