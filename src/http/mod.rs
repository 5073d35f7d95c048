//! HTTP protocol layer module
//!
//! Provides the HTTP building blocks the file server relies on: request
//! context, conditional requests, ranges, MIME types, response builders and
//! the content streaming primitive.

pub mod cache;
pub mod content;
pub mod mime;
pub mod range;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use content::serve_content;
pub use range::{parse_range_header, ByteRange};
pub use request::RequestContext;
pub use response::{
    build_304_response, build_400_response, build_403_response, build_404_response,
    build_405_response, build_416_response, build_500_response, build_503_response,
    build_options_response, build_redirect_response_with_code, empty_body, full_body,
    ResponseBody,
};
