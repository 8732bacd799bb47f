//! Session resolution, password hashing and the authorization policy.

mod extractor;
pub mod password;
pub mod policy;
pub mod token;

pub use extractor::{MaybeSession, Session};
pub use policy::{Action, authorize};
pub use token::SessionKeys;
