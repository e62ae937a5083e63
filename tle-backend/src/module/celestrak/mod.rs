//! CelesTrak public catalog source

mod api_client;

pub use api_client::{CelestrakClient, DEFAULT_BASE_URL, DEFAULT_DEBRIS_GROUPS};
