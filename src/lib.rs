pub mod conn;
pub mod crypto;
pub mod discover;
pub mod error;
pub mod frame;
pub mod heartbeat;
pub mod metrics;
pub mod packet;
pub mod routing;
pub mod server;

pub use crypto::{verify_packet, Keypair};
pub use error::{FrameError, RelayError};
pub use packet::Packet;
pub use server::RelayCore;
