pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod sync;

pub use error::{Result, SddError};
