use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of sales regions. Stored lowercase in the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

pub const ALL_REGIONS: [Region; 5] =
    [Region::North, Region::South, Region::East, Region::West, Region::Central];

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Central => "central",
        }
    }

    /// Case-insensitive parse; returns `None` for anything outside the
    /// closed set so callers fall back rather than error.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            "east" => Some(Self::East),
            "west" => Some(Self::West),
            "central" => Some(Self::Central),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::North => "North",
            Self::South => "South",
            Self::East => "East",
            Self::West => "West",
            Self::Central => "Central",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Region, ALL_REGIONS};

    #[test]
    fn parse_round_trips_every_region() {
        for region in ALL_REGIONS {
            assert_eq!(Region::parse(region.as_str()), Some(region));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknowns() {
        assert_eq!(Region::parse("North"), Some(Region::North));
        assert_eq!(Region::parse(" WEST "), Some(Region::West));
        assert_eq!(Region::parse("none"), None);
        assert_eq!(Region::parse("atlantis"), None);
    }
}
