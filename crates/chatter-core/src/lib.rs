pub mod config;
pub mod error;
pub mod types;

pub use config::ChatterConfig;
pub use error::{ChatterError, Result};
pub use types::ConnId;
