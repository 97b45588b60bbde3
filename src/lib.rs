//! filelines: upload plain-text files and query their lines over HTTP.

pub mod config;
pub mod error;
pub mod files;
pub mod gateway;

pub use config::Config;
pub use error::{FilelinesError, Result, ValidationErrors};
