//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! bulk operation model, the per-operation result records, the settings
//! layout and the strategy traits the indexer is assembled from.
//!
//! ## Wire model
//! - One [`Item`] encodes to one newline-delimited fragment
//!   (metadata line, plus a source line for everything but `delete`)
//! - A bulk response is correlated to its request purely by position

mod action;
mod codec;
mod error;
mod item;
mod request;
mod response;
mod settings;

pub use action::Action;
pub use codec::{Encoder, Flusher, Fragment, LocalFlusher, ResponseDecoder};
pub use error::*;
pub use item::*;
pub use request::*;
pub use response::*;
pub use settings::*;
