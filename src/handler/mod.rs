//! Request handler module
//!
//! Responsible for request routing dispatch. Every GET/HEAD request is
//! served by the file server.

pub mod router;

// Re-export main entry point
pub use router::{dispatch, handle_request};
