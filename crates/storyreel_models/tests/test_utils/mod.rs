//! Test utilities for the model clients.
//!
//! This module provides a scripted image transport.

pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_transport::{MockReply, MockTransport};
