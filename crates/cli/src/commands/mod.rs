//! Command implementations.

mod run;
mod validate;

pub use run::run_loader;
pub use validate::run_validate;
