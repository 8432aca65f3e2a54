pub mod path;
pub mod request;
pub mod response;

pub use request::{apply_request_defaults, build_provider_request};
pub use response::{parse_response_fallback, transform_response, ResponseTransformError};
