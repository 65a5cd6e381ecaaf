//! Derived statistics models.

use serde::{Deserialize, Serialize};

use super::{PlacementCategory, TieringPolicy};

/// Label of the synthetic row that sums every hero row.
pub const TOTAL_ROW: &str = "Total";

/// Run counts per placement category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    #[serde(rename = "No Placement")]
    pub no_placement: u32,
    #[serde(rename = "3rd")]
    pub third: u32,
    #[serde(rename = "2nd")]
    pub second: u32,
    #[serde(rename = "1st")]
    pub first: u32,
    #[serde(rename = "Perfect Game")]
    pub perfect_game: u32,
}

impl CategoryCounts {
    pub fn get(&self, category: PlacementCategory) -> u32 {
        match category {
            PlacementCategory::NoPlacement => self.no_placement,
            PlacementCategory::Third => self.third,
            PlacementCategory::Second => self.second,
            PlacementCategory::First => self.first,
            PlacementCategory::PerfectGame => self.perfect_game,
        }
    }

    pub fn increment(&mut self, category: PlacementCategory) {
        let slot = match category {
            PlacementCategory::NoPlacement => &mut self.no_placement,
            PlacementCategory::Third => &mut self.third,
            PlacementCategory::Second => &mut self.second,
            PlacementCategory::First => &mut self.first,
            PlacementCategory::PerfectGame => &mut self.perfect_game,
        };
        *slot += 1;
    }

    /// Column-wise sum.
    pub fn add(&mut self, other: &CategoryCounts) {
        self.no_placement += other.no_placement;
        self.third += other.third;
        self.second += other.second;
        self.first += other.first;
        self.perfect_game += other.perfect_game;
    }

    pub fn total(&self) -> u32 {
        PlacementCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Counts in canonical category order.
    pub fn as_array(&self) -> [u32; 5] {
        PlacementCategory::ALL.map(|c| self.get(c))
    }
}

/// Share of runs in each placement category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPercentages {
    pub categories: Vec<PlacementCategory>,
    /// Percentages rounded to 2 decimals, parallel to `categories`
    pub percentages: Vec<f64>,
}

impl PlacementPercentages {
    pub fn get(&self, category: PlacementCategory) -> f64 {
        self.categories
            .iter()
            .position(|c| *c == category)
            .and_then(|i| self.percentages.get(i).copied())
            .unwrap_or(0.0)
    }
}

/// Number of runs per canonical hero name, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroRunCounts {
    pub heroes: Vec<String>,
    pub counts: Vec<u32>,
}

impl HeroRunCounts {
    pub fn get(&self, hero: &str) -> Option<u32> {
        self.heroes
            .iter()
            .position(|h| h == hero)
            .and_then(|i| self.counts.get(i).copied())
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Percentage of a season's runs played with each hero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroShare {
    pub heroes: Vec<String>,
    pub percentages: Vec<f64>,
}

/// One row of a hero × category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    pub hero: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

/// Hero × category table with a trailing "Total" row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    /// Rows excluding the trailing total.
    pub fn hero_rows(&self) -> &[StatsRow] {
        match self.rows.split_last() {
            Some((last, rest)) if last.hero == TOTAL_ROW => rest,
            _ => &self.rows,
        }
    }

    pub fn total(&self) -> Option<&StatsRow> {
        self.rows.last().filter(|r| r.hero == TOTAL_ROW)
    }

    pub fn row(&self, hero: &str) -> Option<&StatsRow> {
        self.hero_rows().iter().find(|r| r.hero == hero)
    }
}

/// Everything shown for one user's season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: i32,
    pub tiering: TieringPolicy,
    pub total_runs: u32,
    pub placements: PlacementPercentages,
    pub runs_per_hero: HeroRunCounts,
    pub hero_share: HeroShare,
    /// Absent when the season has no runs
    pub ranked: Option<StatsTable>,
    pub unranked: Option<StatsTable>,
}
