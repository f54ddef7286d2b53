/// IRC channel session
pub mod irc;
/// Media player metadata source
pub mod player;

pub use irc::{ChannelSession, SessionConfig, SessionState};
pub use player::{MetadataSource, MprisSource, TrackInfo};
