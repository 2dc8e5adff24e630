// garagio-api: Async Rust client for the Garagio garage-door controller

pub mod client;
pub mod error;
pub mod status;

pub use client::{DeviceClient, Door};
pub use error::Error;
pub use status::{DoorState, StatusSnapshot, UNKNOWN_TEMPERATURE};
