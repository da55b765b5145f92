//! Async client for Azure AI Content Understanding.
//!
//! Submits content (a url or inline bytes) to a named analyzer, follows the
//! service's submit-then-poll protocol until a terminal status, and manages
//! custom analyzers described by a recursive field schema.
//!
//! ```no_run
//! # async fn run() -> rusty_cu_runner::Result<()> {
//! use rusty_cu_runner::{BatchOptions, ContentUnderstandingClient, Credentials};
//!
//! let client = ContentUnderstandingClient::new(Credentials::from_env()?)?;
//! let report = client
//!     .analyze_directory("prebuilt-documentAnalyzer", "./invoices", &BatchOptions::default())
//!     .await?;
//! for (path, result) in &report.results {
//!     println!("{}: {}", path.display(), result.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use clients::{BatchOptions, BatchReport, FailurePolicy};
pub use config::ClientOptions;
pub use error::{ContentUnderstandingError, Result};
pub use models::{ContentUnderstandingClient, Credentials, PollOptions};
pub use utils::init_tracing;
