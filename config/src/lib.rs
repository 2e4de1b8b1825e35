// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use serde::Deserialize;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};

/// Ratings are the big file, flush them every this many records
pub const DEFAULT_RATINGS_COMMIT_EVERY: usize = 1000;
pub const DEFAULT_RATINGS_PROGRESS_EVERY: u64 = 1000;
pub const DEFAULT_MOVIES_PROGRESS_EVERY: u64 = 100;

pub const USERS_FILE: &str = "u.user";
pub const MOVIES_FILE: &str = "u.item";
pub const RATINGS_FILE: &str = "u.data";

/// How the trailing " (YEAR)" is removed from movie titles
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TitleSuffix {
    /// Strip " (NNNN)" only when the title really ends with it
    Year,
    /// Drop the last seven characters, whatever they are
    FixedWidth,
}

impl Default for TitleSuffix {
    fn default() -> Self {
        TitleSuffix::Year
    }
}

/// What to do with a rating whose user or movie isn't stored
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    Allow,
    Skip,
    Reject,
}

impl Default for OrphanPolicy {
    fn default() -> Self {
        OrphanPolicy::Allow
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Falls back to `DATABASE_URL` when missing
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UsersConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub commit_every: Option<NonZeroUsize>,
    #[serde(default)]
    pub progress_every: Option<NonZeroU64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MoviesConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub commit_every: Option<NonZeroUsize>,
    #[serde(default = "default_movies_progress")]
    pub progress_every: Option<NonZeroU64>,
    #[serde(default)]
    pub clear: bool,
    #[serde(default)]
    pub title_suffix: TitleSuffix,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RatingsConfig {
    pub path: PathBuf,
    #[serde(default = "default_ratings_commit")]
    pub commit_every: Option<NonZeroUsize>,
    #[serde(default = "default_ratings_progress")]
    pub progress_every: Option<NonZeroU64>,
    #[serde(default)]
    pub clear: bool,
    #[serde(default)]
    pub orphans: OrphanPolicy,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub users: UsersConfig,
    pub movies: MoviesConfig,
    pub ratings: RatingsConfig,
}

fn default_movies_progress() -> Option<NonZeroU64> {
    NonZeroU64::new(DEFAULT_MOVIES_PROGRESS_EVERY)
}

fn default_ratings_commit() -> Option<NonZeroUsize> {
    NonZeroUsize::new(DEFAULT_RATINGS_COMMIT_EVERY)
}

fn default_ratings_progress() -> Option<NonZeroU64> {
    NonZeroU64::new(DEFAULT_RATINGS_PROGRESS_EVERY)
}

impl UsersConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            commit_every: None,
            progress_every: None,
        }
    }
}

impl MoviesConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            commit_every: None,
            progress_every: default_movies_progress(),
            clear: false,
            title_suffix: TitleSuffix::default(),
        }
    }
}

impl RatingsConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            commit_every: default_ratings_commit(),
            progress_every: default_ratings_progress(),
            clear: false,
            orphans: OrphanPolicy::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Self = toml::from_str(&contents)?;
        Ok(parsed)
    }

    /// Default layout of the MovieLens 100k files inside `dir`
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();

        Self {
            database: DatabaseConfig::default(),
            users: UsersConfig::with_path(dir.join(USERS_FILE)),
            movies: MoviesConfig::with_path(dir.join(MOVIES_FILE)),
            ratings: RatingsConfig::with_path(dir.join(RATINGS_FILE)),
        }
    }
}
