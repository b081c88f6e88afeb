//! Vision-language model seam for medscan.
//!
//! This crate builds the radiology prompts sent to a vision model and parses
//! the provider's chat-completion response back into free analysis text,
//! which `medscan-core` turns into structured results.

pub mod prompts;
pub mod provider;

pub use prompts::*;
pub use provider::*;
