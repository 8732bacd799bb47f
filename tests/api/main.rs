//! HTTP API test suite.
//!
//! Runs the full route table against the in-memory repository and fake
//! object store and chat provider. No external services are required.
//!
//! Run with: cargo test --test api


mod test_auth;
mod test_challenges;
mod test_chat;
mod test_feedback;
mod test_role_gating;
mod test_uploads;
mod test_users;
mod test_videos;
