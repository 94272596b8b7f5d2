pub mod client;
pub mod sync;

pub use client::{PeerClient, PeerError};
