//! Bria-style asynchronous image generation.

mod client;
mod response;
mod transport;

pub use client::BriaImageClient;
pub use response::{PollStatus, extract_result_url, image_payload};
pub use transport::{HttpImageTransport, ImageTransport};
