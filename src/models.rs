pub mod analysis_client;
pub mod analyze_request;
pub mod analyze_result;
pub mod analyzer;
pub mod credentials;
pub mod field_schema;

pub use analysis_client::{ContentUnderstandingClient, DEFAULT_POLL_INTERVAL, PollOptions};
pub use analyze_request::AnalyzeRequest;
pub use analyze_result::*;
pub use analyzer::*;
pub use credentials::{AccessToken, Authentication, Credentials, StaticTokenCredential, TokenCredential};
pub use field_schema::*;
