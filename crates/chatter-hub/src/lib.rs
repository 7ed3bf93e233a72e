pub mod connection;
pub mod error;
pub mod hub;
pub mod identity;
pub mod registry;
pub mod transport;

pub use connection::{ConnState, Connection};
pub use error::{DeliveryError, TransportError};
pub use hub::{BroadcastReport, Hub};
pub use registry::Registry;
pub use transport::Transport;
