//! Flusher implementations
//!
//! Contains HttpFlusher and the closure-backed FnFlusher.

mod func;
mod http;

pub use self::func::{flush_fn, FnFlusher};
pub use self::http::HttpFlusher;
