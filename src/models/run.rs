//! Recorded run model and input validation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{classify, OwnerId, PlacementCategory, RunId, TieringPolicy};

/// Highest win count a run can record.
pub const MAX_WINS: i32 = 10;

/// Last day a run can reach.
pub const MAX_FINISHED: i32 = 20;

/// Notes longer than this are cut off.
pub const MAX_NOTES_LENGTH: usize = 75;

/// Normalize a hero name to "first letter uppercase, rest lowercase".
///
/// The first letter is uppercased, not titlecased, so digraphs such as
/// `ǆ` become `Ǆ` rather than `ǅ`. Roster names are ASCII.
pub fn canonical_hero_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One recorded game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,

    /// User who recorded the run
    pub owner_id: OwnerId,

    pub season: i32,

    /// Ranked vs. casual mode
    pub ranked: bool,

    /// Hero name as entered
    pub hero: String,

    /// Victories within the run
    pub wins: i32,

    /// Day reached
    pub finished: i32,

    /// Game patch the run was played on
    #[serde(default)]
    pub patch: String,

    /// Link to an external recording
    #[serde(default)]
    pub media: String,

    #[serde(default)]
    pub notes: String,

    /// URL of an already uploaded screenshot or video
    #[serde(default)]
    pub upload: String,

    pub played: DateTime<Utc>,
}

impl Run {
    /// Create a run with an ID derived from its owner, season, hero and time.
    pub fn new(
        owner_id: OwnerId,
        season: i32,
        ranked: bool,
        hero: String,
        wins: i32,
        finished: i32,
        played: DateTime<Utc>,
    ) -> Self {
        let id = RunId::generate(&[
            &owner_id.to_string(),
            &season.to_string(),
            &hero,
            &played.to_rfc3339(),
        ]);

        Self {
            id,
            owner_id,
            season,
            ranked,
            hero,
            wins,
            finished,
            patch: String::new(),
            media: String::new(),
            notes: String::new(),
            upload: String::new(),
            played,
        }
    }

    pub fn with_patch(mut self, patch: String) -> Self {
        self.patch = patch;
        self
    }

    pub fn with_media(mut self, media: String) -> Self {
        self.media = media;
        self
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_upload(mut self, upload: String) -> Self {
        self.upload = upload;
        self
    }

    pub fn canonical_hero(&self) -> String {
        canonical_hero_name(&self.hero)
    }

    pub fn category(&self) -> PlacementCategory {
        classify(self.wins, self.finished)
    }

    pub fn category_with(&self, policy: TieringPolicy) -> PlacementCategory {
        policy.classify(self.wins, self.finished)
    }

    /// Win/Day column text: "Perfect Game" or "wins/finished".
    pub fn result_label(&self) -> String {
        if self.category() == PlacementCategory::PerfectGame {
            PlacementCategory::PerfectGame.label().to_string()
        } else {
            format!("{}/{}", self.wins, self.finished)
        }
    }
}

/// Reasons a submitted run is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunValidationError {
    #[error("Hero is required")]
    MissingHero,

    #[error("Wins must be between 0 and 10, got {0}")]
    WinsOutOfRange(i32),

    #[error("Day finished must be between 0 and 20, got {0}")]
    FinishedOutOfRange(i32),

    #[error("Invalid media URL: {0}")]
    InvalidMediaUrl(String),
}

/// A run as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRun {
    pub hero: String,
    pub wins: i32,
    pub finished: i32,
    #[serde(default)]
    pub ranked: bool,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub upload: String,
}

fn media_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://)([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})(:\d+)?(/.*)?$")
            .expect("media URL pattern is valid")
    })
}

/// Check that a media link looks like an http(s) URL with a domain.
pub fn is_valid_media_url(url: &str) -> bool {
    media_url_pattern().is_match(url.trim())
}

impl NewRun {
    /// Validate the submission and turn it into a stored run.
    ///
    /// `finished` is raised to `wins` when lower and notes are cut to
    /// [`MAX_NOTES_LENGTH`] characters.
    pub fn into_run(
        self,
        owner_id: OwnerId,
        default_season: i32,
        default_patch: &str,
        played: DateTime<Utc>,
    ) -> Result<Run, RunValidationError> {
        let hero = self.hero.trim();
        if hero.is_empty() {
            return Err(RunValidationError::MissingHero);
        }
        if !(0..=MAX_WINS).contains(&self.wins) {
            return Err(RunValidationError::WinsOutOfRange(self.wins));
        }
        if !(0..=MAX_FINISHED).contains(&self.finished) {
            return Err(RunValidationError::FinishedOutOfRange(self.finished));
        }
        let media = self.media.trim().to_string();
        if !media.is_empty() && !is_valid_media_url(&media) {
            return Err(RunValidationError::InvalidMediaUrl(media));
        }

        let finished = self.finished.max(self.wins);
        let notes: String = self.notes.chars().take(MAX_NOTES_LENGTH).collect();
        let patch = self
            .patch
            .unwrap_or_else(|| default_patch.to_string());

        Ok(Run::new(
            owner_id,
            self.season.unwrap_or(default_season),
            self.ranked,
            hero.to_string(),
            self.wins,
            finished,
            played,
        )
        .with_patch(patch)
        .with_media(media)
        .with_notes(notes)
        .with_upload(self.upload))
    }
}
