//! Error taxonomy shared by generation and download.

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur while generating or saving images
#[derive(Debug)]
pub enum WorkflowError {
    /// The generation request could not be sent or no response arrived
    Transport(String),

    /// The service answered with a non-success status
    HttpStatus {
        status: u16,
        /// Server-provided `error` message, if the body carried one
        message: Option<String>,
    },

    /// The response body did not match the expected structure
    ResponseParse(String),

    /// Bytes for a selected item could not be fetched
    AssetRetrieval {
        /// ResultSet position of the failed item, when known
        index: Option<usize>,
        url: String,
        reason: String,
    },

    /// The archive could not be finalized
    ArchiveAssembly(String),

    /// Writing the finished file to disk failed
    Save(std::io::Error),
}

impl WorkflowError {
    /// Short, stable name of the failure kind (used in logs and JSON output)
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Transport(_) => "transport",
            WorkflowError::HttpStatus { .. } => "http_status",
            WorkflowError::ResponseParse(_) => "response_parse",
            WorkflowError::AssetRetrieval { .. } => "asset_retrieval",
            WorkflowError::ArchiveAssembly(_) => "archive_assembly",
            WorkflowError::Save(_) => "save",
        }
    }
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowError::Transport(msg) => write!(f, "Request failed: {}", msg),
            WorkflowError::HttpStatus { status, message: Some(msg) } => {
                write!(f, "Service returned HTTP {}: {}", status, msg)
            }
            WorkflowError::HttpStatus { status, message: None } => {
                write!(f, "Service returned HTTP {}", status)
            }
            WorkflowError::ResponseParse(msg) => write!(f, "Invalid response: {}", msg),
            WorkflowError::AssetRetrieval { index: Some(index), url, reason } => {
                write!(f, "Could not retrieve image {} ({}): {}", index, url, reason)
            }
            WorkflowError::AssetRetrieval { index: None, url, reason } => {
                write!(f, "Could not retrieve {}: {}", url, reason)
            }
            WorkflowError::ArchiveAssembly(msg) => write!(f, "Archive error: {}", msg),
            WorkflowError::Save(e) => write!(f, "Save failed: {}", e),
        }
    }
}

impl std::error::Error for WorkflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkflowError::Save(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WorkflowError {
    fn from(e: std::io::Error) -> Self {
        WorkflowError::Save(e)
    }
}

impl From<zip::result::ZipError> for WorkflowError {
    fn from(e: zip::result::ZipError) -> Self {
        WorkflowError::ArchiveAssembly(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = WorkflowError::HttpStatus {
            status: 500,
            message: Some("quota exceeded".to_string()),
        };
        assert_eq!(err.to_string(), "Service returned HTTP 500: quota exceeded");

        let bare = WorkflowError::HttpStatus { status: 404, message: None };
        assert_eq!(bare.to_string(), "Service returned HTTP 404");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(WorkflowError::Transport("x".into()).kind(), "transport");
        assert_eq!(WorkflowError::ResponseParse("x".into()).kind(), "response_parse");
        let io = std::io::Error::other("disk full");
        assert_eq!(WorkflowError::from(io).kind(), "save");
    }
}
