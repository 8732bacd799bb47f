//! Domain models for the video feedback server.

pub mod challenge;
pub mod chat;
pub mod upload;
pub mod user;
pub mod video;

// Re-export commonly used types
pub use challenge::{
    Challenge, ChallengePatch, ChallengeResponse, ChallengeState, ChallengeSummary, CreatorRef,
    FeedbackView, NewChallenge, Submission, SubmissionDetail,
};
pub use chat::{ChannelMember, ChatConnectResponse, ChatEvent, ChatUser, DirectChannel};
pub use upload::UploadSlot;
pub use user::{Identity, NewUser, Role, User, UserDetail, UserWithCounts};
pub use video::{NewNote, NewVideo, NoteView, PersonRef, ReviewVideo, Video, VideoNote, VideoWithNotes};
