pub mod config;
pub mod error;
pub mod types;

pub use config::RecontextConfig;
pub use error::{RecontextError, Result};
pub use types::*;
