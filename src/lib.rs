//! Static file server over a virtual filesystem
//!
//! [`fileserver::FileServer`] resolves request paths against any
//! [`vfs::FileSystem`] and streams the result through [`http::serve_content`].
//! The remaining modules wire it into a hyper server.

pub mod config;
pub mod fileserver;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod vfs;
