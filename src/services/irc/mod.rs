/// Session error types
pub mod error;
/// IRC message parsing and serialization
pub mod message;
/// Channel session lifecycle
pub mod session;

#[cfg(test)]
mod tests;

pub use error::*;
pub use message::Message;
pub use session::*;
