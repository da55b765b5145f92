pub mod helpers;
pub mod logger;
pub mod macros;

pub use helpers::get_content_type;
pub use logger::{init_tracing, init_tracing_with};
