pub mod announcement;

pub use announcement::*;

// Emoji constants used in outbound messages and log lines
pub const EMOJI_ANNOUNCE: &str = "📢";
pub const EMOJI_SEARCH: &str = "🔍";
pub const EMOJI_WAIT: &str = "⏳";
