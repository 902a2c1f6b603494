//! High score persistence with a top 20 table.
//!
//! Scores are saved as a JSON array of `[score, name]` pairs in the user's
//! "Saved Games" directory. A missing file is recreated from the default
//! table on startup.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScores>();

    // Load high scores on startup
    app.add_systems(Startup, load_high_scores);
}

/// Number of entries kept in the table.
pub const MAX_HIGH_SCORES: usize = 20;

const SAVE_DIR: &str = "AH Game";
const SAVE_FILE: &str = "highscore.json";
const DEFAULT_NAME: &str = "JANU";

#[derive(Debug, thiserror::Error)]
pub enum HighScoreError {
    #[error("could not determine the home directory")]
    NoSaveDirectory,
    #[error("high score file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single high score entry, stored on disk as `[score, name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, String)", into = "(u32, String)")]
pub struct ScoreEntry {
    pub score: u32,
    pub name: String,
}

impl ScoreEntry {
    pub fn new(score: u32, name: impl Into<String>) -> Self {
        Self {
            score,
            name: name.into(),
        }
    }
}

impl From<(u32, String)> for ScoreEntry {
    fn from((score, name): (u32, String)) -> Self {
        Self { score, name }
    }
}

impl From<ScoreEntry> for (u32, String) {
    fn from(entry: ScoreEntry) -> Self {
        (entry.score, entry.name)
    }
}

/// Resource holding the high score table, best first.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl Default for HighScores {
    /// 200, 190, ... 10, all held by the same name.
    fn default() -> Self {
        Self {
            entries: (1..=MAX_HIGH_SCORES as u32)
                .rev()
                .map(|rank| ScoreEntry::new(rank * 10, DEFAULT_NAME))
                .collect(),
        }
    }
}

impl HighScores {
    /// The score a new result has to beat to enter the table.
    pub fn lowest(&self) -> Option<u32> {
        self.entries.last().map(|entry| entry.score)
    }

    /// Check if a score would make it into the table.
    pub fn is_high_score(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.lowest().is_none_or(|lowest| score > lowest)
    }

    /// Add an entry, keep the table sorted best first and drop whatever falls
    /// off the bottom. Entries with equal scores keep their arrival order.
    pub fn insert(&mut self, entry: ScoreEntry) {
        self.entries.push(entry);
        self.sort_and_trim();
    }

    fn sort_and_trim(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// The table as display lines, `SSSS  NAME`.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|entry| format!("{:04}  {}", entry.score, entry.name))
    }

    /// Get the file path for storing high scores.
    pub fn file_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join("Saved Games").join(SAVE_DIR).join(SAVE_FILE))
    }

    /// Read the table at `path`, writing the default table there first if
    /// the file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self, HighScoreError> {
        if !path.is_file() {
            let defaults = Self::default();
            defaults.save_to(path)?;
            return Ok(defaults);
        }

        let contents = fs::read_to_string(path)?;
        let mut scores: Self = serde_json::from_str(&contents)?;
        scores.sort_and_trim();
        Ok(scores)
    }

    /// Write the table to `path` with four space indentation.
    pub fn save_to(&self, path: &Path) -> Result<(), HighScoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut json = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut json, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load high scores from disk, falling back to the defaults on failure.
    pub fn load() -> Self {
        let result = Self::file_path()
            .ok_or(HighScoreError::NoSaveDirectory)
            .and_then(|path| {
                let scores = Self::load_from(&path)?;
                info!("Loaded high scores from {:?}", path);
                Ok(scores)
            });

        result.unwrap_or_else(|e| {
            warn!("Failed to load high scores: {}", e);
            Self::default()
        })
    }

    /// Save high scores to disk, logging any failure.
    pub fn save(&self) {
        let result = Self::file_path()
            .ok_or(HighScoreError::NoSaveDirectory)
            .and_then(|path| {
                self.save_to(&path)?;
                info!("Saved high scores to {:?}", path);
                Ok(())
            });

        if let Err(e) = result {
            warn!("Failed to save high scores: {}", e);
        }
    }
}

/// Load high scores on startup.
fn load_high_scores(mut high_scores: ResMut<HighScores>) {
    *high_scores = HighScores::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table() -> HighScores {
        HighScores::default()
    }

    #[test]
    fn test_default_table() {
        let scores = full_table();
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries[0], ScoreEntry::new(200, "JANU"));
        assert_eq!(scores.lowest(), Some(10));
    }

    #[test]
    fn test_is_high_score_must_beat_lowest() {
        let scores = full_table();
        assert!(!scores.is_high_score(0));
        assert!(!scores.is_high_score(10));
        assert!(scores.is_high_score(11));
    }

    #[test]
    fn test_short_table_accepts_any_positive_score() {
        let scores = HighScores {
            entries: vec![ScoreEntry::new(500, "ACE")],
        };
        assert!(scores.is_high_score(1));
        assert!(!scores.is_high_score(0));
    }

    #[test]
    fn test_insert_evicts_previous_minimum() {
        let mut scores = full_table();
        scores.insert(ScoreEntry::new(155, "WORM"));

        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(
            scores
                .entries
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
        assert_eq!(scores.entries[5], ScoreEntry::new(155, "WORM"));
        assert_eq!(scores.lowest(), Some(20));
    }

    #[test]
    fn test_insert_tie_ranks_below_existing() {
        let mut scores = full_table();
        scores.insert(ScoreEntry::new(100, "NEW"));
        let position = scores
            .entries
            .iter()
            .position(|entry| entry.name == "NEW")
            .unwrap();
        assert_eq!(scores.entries[position - 1], ScoreEntry::new(100, "JANU"));
    }

    #[test]
    fn test_lines_are_zero_padded() {
        let lines: Vec<_> = full_table().lines().collect();
        assert_eq!(lines[0], "0200  JANU");
        assert_eq!(lines[19], "0010  JANU");
    }

    #[test]
    fn test_wire_format_is_array_of_pairs() {
        let scores = HighScores {
            entries: vec![ScoreEntry::new(42, "ABCD"), ScoreEntry::new(7, "XY")],
        };
        let value = serde_json::to_value(&scores).unwrap();
        assert_eq!(value, serde_json::json!([[42, "ABCD"], [7, "XY"]]));
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SAVE_FILE);

        let scores = HighScores::load_from(&path).unwrap();

        assert_eq!(scores, HighScores::default());
        assert!(path.is_file());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n    [\n        200,"));
    }

    #[test]
    fn test_saved_table_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SAVE_FILE);
        let mut scores = full_table();
        scores.insert(ScoreEntry::new(999, "TOP"));

        scores.save_to(&path).unwrap();
        let loaded = HighScores::load_from(&path).unwrap();

        assert_eq!(loaded, scores);
    }

    #[test]
    fn test_unsorted_file_is_sorted_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SAVE_FILE);
        fs::write(&path, r#"[[5, "LOW"], [50, "HIGH"]]"#).unwrap();

        let loaded = HighScores::load_from(&path).unwrap();

        assert_eq!(loaded.entries[0].name, "HIGH");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SAVE_FILE);
        fs::write(&path, "{ not a table").unwrap();

        let result = HighScores::load_from(&path);

        assert!(matches!(result, Err(HighScoreError::Json(_))));
    }
}
