//! Listing sort definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort order of a subreddit listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Currently popular submissions (default).
    #[default]
    Hot,
    /// Newest submissions first.
    New,
    /// Submissions gaining traction.
    Rising,
    /// Most controversial of all time.
    Controversial,
    /// Highest scored of all time.
    Top,
}

impl SortMode {
    /// Whether the listing endpoint takes a time window (`t=`) parameter.
    pub fn takes_time_window(&self) -> bool {
        matches!(self, SortMode::Controversial | SortMode::Top)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Hot => write!(f, "hot"),
            SortMode::New => write!(f, "new"),
            SortMode::Rising => write!(f, "rising"),
            SortMode::Controversial => write!(f, "controversial"),
            SortMode::Top => write!(f, "top"),
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hot" => Ok(SortMode::Hot),
            "new" => Ok(SortMode::New),
            "rising" => Ok(SortMode::Rising),
            "controversial" => Ok(SortMode::Controversial),
            "top" => Ok(SortMode::Top),
            _ => Err(format!("Unknown sort mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_display() {
        for mode in [
            SortMode::Hot,
            SortMode::New,
            SortMode::Rising,
            SortMode::Controversial,
            SortMode::Top,
        ] {
            assert_eq!(mode.to_string().parse::<SortMode>().unwrap(), mode);
        }
        assert!("best".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_time_window() {
        assert!(SortMode::Top.takes_time_window());
        assert!(!SortMode::Hot.takes_time_window());
    }
}
