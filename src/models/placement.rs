//! Placement categories and the rules that assign a run to one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome tier of a run, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlacementCategory {
    #[serde(rename = "No Placement")]
    NoPlacement,
    #[serde(rename = "3rd")]
    Third,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "Perfect Game")]
    PerfectGame,
}

impl PlacementCategory {
    /// Canonical ordering used by every table and chart.
    pub const ALL: [PlacementCategory; 5] = [
        PlacementCategory::NoPlacement,
        PlacementCategory::Third,
        PlacementCategory::Second,
        PlacementCategory::First,
        PlacementCategory::PerfectGame,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlacementCategory::NoPlacement => "No Placement",
            PlacementCategory::Third => "3rd",
            PlacementCategory::Second => "2nd",
            PlacementCategory::First => "1st",
            PlacementCategory::PerfectGame => "Perfect Game",
        }
    }

    /// Position in [`PlacementCategory::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PlacementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Rule set used to map wins/finished onto a category.
///
/// A report must use one policy for every output it contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieringPolicy {
    /// Thresholds on wins only; 10 wins on day 10 is a perfect game.
    #[default]
    Standard,
    /// 1st additionally requires the run to go past day 10. A 10-win run
    /// that ended before day 10 falls back to the wins thresholds.
    Gold,
}

impl TieringPolicy {
    pub fn classify(&self, wins: i32, finished: i32) -> PlacementCategory {
        match self {
            TieringPolicy::Standard => classify(wins, finished),
            TieringPolicy::Gold => classify_gold(wins, finished),
        }
    }
}

/// Classify a run by the standard thresholds. First match wins.
pub fn classify(wins: i32, finished: i32) -> PlacementCategory {
    if wins == 10 && finished == 10 {
        PlacementCategory::PerfectGame
    } else if wins == 10 {
        PlacementCategory::First
    } else if wins >= 7 {
        PlacementCategory::Second
    } else if wins >= 4 {
        PlacementCategory::Third
    } else {
        PlacementCategory::NoPlacement
    }
}

fn classify_gold(wins: i32, finished: i32) -> PlacementCategory {
    if wins == 10 && finished == 10 {
        PlacementCategory::PerfectGame
    } else if wins == 10 && finished > 10 {
        PlacementCategory::First
    } else if wins >= 7 {
        PlacementCategory::Second
    } else if wins >= 4 {
        PlacementCategory::Third
    } else {
        PlacementCategory::NoPlacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(10, 10), PlacementCategory::PerfectGame);
        assert_eq!(classify(10, 11), PlacementCategory::First);
        assert_eq!(classify(10, 20), PlacementCategory::First);
        assert_eq!(classify(9, 12), PlacementCategory::Second);
        assert_eq!(classify(7, 9), PlacementCategory::Second);
        assert_eq!(classify(6, 9), PlacementCategory::Third);
        assert_eq!(classify(4, 5), PlacementCategory::Third);
        assert_eq!(classify(3, 8), PlacementCategory::NoPlacement);
        assert_eq!(classify(0, 0), PlacementCategory::NoPlacement);
    }

    #[test]
    fn test_classify_out_of_range_values() {
        assert_eq!(classify(-3, -1), PlacementCategory::NoPlacement);
        assert_eq!(classify(11, 30), PlacementCategory::Second);
        assert_eq!(classify(10, 3), PlacementCategory::First);
        assert_eq!(classify(i32::MIN, i32::MAX), PlacementCategory::NoPlacement);
    }

    #[test]
    fn test_classify_monotonic_in_wins() {
        for finished in 0..=25 {
            let mut previous = PlacementCategory::NoPlacement;
            for wins in 0..=finished.min(10) {
                let category = classify(wins, finished);
                assert!(
                    category >= previous,
                    "wins={} finished={} dropped from {} to {}",
                    wins,
                    finished,
                    previous,
                    category
                );
                previous = category;
            }
        }
    }

    #[test]
    fn test_gold_policy() {
        let gold = TieringPolicy::Gold;
        assert_eq!(gold.classify(10, 10), PlacementCategory::PerfectGame);
        assert_eq!(gold.classify(10, 14), PlacementCategory::First);
        assert_eq!(gold.classify(10, 9), PlacementCategory::Second);
        assert_eq!(gold.classify(5, 8), PlacementCategory::Third);
        assert_eq!(gold.classify(1, 3), PlacementCategory::NoPlacement);
    }

    #[test]
    fn test_standard_policy_matches_classify() {
        for wins in -2..=12 {
            for finished in -2..=22 {
                assert_eq!(
                    TieringPolicy::Standard.classify(wins, finished),
                    classify(wins, finished)
                );
            }
        }
    }

    #[test]
    fn test_category_order_and_labels() {
        let labels: Vec<&str> = PlacementCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["No Placement", "3rd", "2nd", "1st", "Perfect Game"]);
        for (i, c) in PlacementCategory::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert!(PlacementCategory::NoPlacement < PlacementCategory::PerfectGame);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&PlacementCategory::PerfectGame).unwrap();
        assert_eq!(json, "\"Perfect Game\"");
        let policy: TieringPolicy = serde_json::from_str("\"gold\"").unwrap();
        assert_eq!(policy, TieringPolicy::Gold);
    }
}
