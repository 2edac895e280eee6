use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Day bucket a route was recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "3daysAgo")]
    ThreeDaysAgo,
}

impl Day {
    pub const ALL: [Day; 3] = [Day::Today, Day::Yesterday, Day::ThreeDaysAgo];

    /// Key of the bucket holding this day's points in the source data
    pub fn bucket_key(self) -> &'static str {
        match self {
            Day::Today => "today",
            Day::Yesterday => "yesterday",
            Day::ThreeDaysAgo => "day3",
        }
    }

    /// Identifier used by the selector
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Today => "today",
            Day::Yesterday => "yesterday",
            Day::ThreeDaysAgo => "3daysAgo",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Day::Today => "Today",
            Day::Yesterday => "Yesterday",
            Day::ThreeDaysAgo => "3 Days Back",
        }
    }
}

/// How a route point was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    Wireless,
    Manual,
}

impl PointType {
    pub const ALL: [PointType; 2] = [PointType::Wireless, PointType::Manual];

    pub fn as_str(self) -> &'static str {
        match self {
            PointType::Wireless => "wireless",
            PointType::Manual => "manual",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PointType::Wireless => "Wireless",
            PointType::Manual => "Manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown day '{0}' (expected today, yesterday or 3daysAgo)")]
    UnknownDay(String),
    #[error("unknown point type '{0}' (expected wireless or manual)")]
    UnknownType(String),
}

impl FromStr for Day {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(Day::Today),
            "yesterday" => Ok(Day::Yesterday),
            "3daysago" | "day3" => Ok(Day::ThreeDaysAgo),
            _ => Err(SelectionError::UnknownDay(s.to_string())),
        }
    }
}

impl FromStr for PointType {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wireless" => Ok(PointType::Wireless),
            "manual" => Ok(PointType::Manual),
            _ => Err(SelectionError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which day and capture type to replay. Replacing it triggers a full reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSelection {
    pub day: Day,
    #[serde(rename = "type")]
    pub point_type: PointType,
}

impl RouteSelection {
    pub fn new(day: Day, point_type: PointType) -> Self {
        Self { day, point_type }
    }
}

impl Default for RouteSelection {
    fn default() -> Self {
        Self {
            day: Day::Today,
            point_type: PointType::Wireless,
        }
    }
}

impl fmt::Display for RouteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.day.label(), self.point_type.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_keys() {
        assert_eq!(Day::Today.bucket_key(), "today");
        assert_eq!(Day::Yesterday.bucket_key(), "yesterday");
        // The selector label differs from the storage key
        assert_eq!(Day::ThreeDaysAgo.as_str(), "3daysAgo");
        assert_eq!(Day::ThreeDaysAgo.bucket_key(), "day3");
    }

    #[test]
    fn test_parse_day_and_type() {
        assert_eq!("3daysAgo".parse::<Day>().unwrap(), Day::ThreeDaysAgo);
        assert_eq!("Today".parse::<Day>().unwrap(), Day::Today);
        assert_eq!("manual".parse::<PointType>().unwrap(), PointType::Manual);
        assert!("tomorrow".parse::<Day>().is_err());
        assert!("gps".parse::<PointType>().is_err());
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = Day::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "3 Days Back"]);
        assert_eq!(PointType::Wireless.label(), "Wireless");
    }

    #[test]
    fn test_selection_serde() {
        let sel: RouteSelection = serde_json::from_str(r#"{"day":"3daysAgo","type":"manual"}"#).unwrap();
        assert_eq!(sel, RouteSelection::new(Day::ThreeDaysAgo, PointType::Manual));
        assert_eq!(RouteSelection::default().to_string(), "Today / Wireless");
    }
}
