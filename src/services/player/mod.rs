/// URI de-duplication of change notifications
pub mod changes;
/// Metadata source error types
pub mod error;
/// MPRIS `Metadata` parsing
pub mod metadata;
/// MPRIS-backed metadata source
pub mod mpris;
/// D-Bus proxy trait definitions
pub mod proxy;
/// Metadata source trait
pub mod source;
/// Track types
pub mod types;

pub use changes::dedupe_by_uri;
pub use error::*;
pub use mpris::MprisSource;
pub use proxy::*;
pub use source::*;
pub use types::*;
