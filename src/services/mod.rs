//! Business logic services.

pub mod accounts;
pub mod challenges;
pub mod chat;
pub mod feedback;
pub mod storage;

pub use chat::{ChatProvider, StreamChat, provider_from_settings};
pub use storage::{ObjectStore, S3Storage};
