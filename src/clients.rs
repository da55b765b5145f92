pub mod analyzers;
pub mod auth;
pub mod base;
pub mod content_understanding;
pub mod transport;

pub use auth::{AuthPolicy, BearerTokenPolicy, COGNITIVE_SERVICES_SCOPE, SubscriptionKeyPolicy};
pub use base::{
    BatchOptions, BatchReport, FailurePolicy, PREBUILT_AUDIO_ANALYZER, PREBUILT_DOCUMENT_ANALYZER,
    PREBUILT_IMAGE_ANALYZER, PREBUILT_VIDEO_ANALYZER, list_files,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
