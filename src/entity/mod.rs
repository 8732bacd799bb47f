//! SeaORM entity definitions for PostgreSQL database.

pub mod challenge;
pub mod user;
pub mod video;
pub mod video_note;
pub mod video_submission;
