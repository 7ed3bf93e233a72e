pub mod error;
pub mod frames;

pub use error::FrameError;
pub use frames::{ClientFrame, ServerFrame};
