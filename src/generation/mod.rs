//! Generation request cycle against the remote service.

pub mod client;
pub mod response;
pub mod session;

pub use client::{GenerationBackend, HttpGenerationClient};
pub use response::{GenerationResponse, parse_generation_response};
pub use session::{Admission, GenerateOutcome, GenerationSession};
