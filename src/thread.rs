//! Inquiry threads
//!
//! Provides the message model and the in-memory store that owns every
//! inquiry's ordered message history.

mod message;
mod store;

pub use message::*;
pub use store::{InquiryThread, PerRole, ThreadSnapshot, ThreadStore};
