//! `warmupapp://` deep links.

use url::Url;

pub const SCHEME: &str = "warmupapp";
/// Link the widget offers when no workout is running.
pub const START_URL: &str = "warmupapp://start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLink {
    /// Start the default (or last selected) routine.
    StartWorkout,
}

impl DeepLink {
    /// Recognize a deep link; other schemes and hosts yield `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let url = Url::parse(input).ok()?;
        if url.scheme() != SCHEME {
            return None;
        }
        match url.host_str()? {
            "start" => Some(DeepLink::StartWorkout),
            _ => None,
        }
    }
}
