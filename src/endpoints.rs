//! Endpoint families for common requests.
//!
//! Each family is a small configuration struct implementing [`Endpoint`] —
//! one per request family, composed over the shared descriptor contract.
//! The three families here also cover the three response shapes the API
//! uses: a single tabular block ([`LeagueGameLog`]), pre-structured JSON
//! ([`Scoreboard`]), and a multi-block projection ([`CumulativeTeamStats`]).
//! Response models declare their wire names with `#[serde(rename)]` and are
//! validated once at decode time.

use crate::endpoint::Endpoint;
use crate::table::{self, BlockSelector, BlockSpec, Record};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// League identifier for the NBA on the wire.
pub const LEAGUE_ID_NBA: &str = "00";

/// Season phase filter accepted by most endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonType {
    /// Regular season games.
    #[default]
    RegularSeason,
    /// Playoff games.
    Playoffs,
    /// Pre-season games.
    PreSeason,
    /// All-Star games.
    AllStar,
    /// Play-in tournament games.
    PlayIn,
}

impl SeasonType {
    /// The exact string the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
            SeasonType::PreSeason => "Pre Season",
            SeasonType::AllStar => "All Star",
            SeasonType::PlayIn => "PlayIn",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the league game log. One row per team per game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameLogEntry {
    /// Season identifier, e.g. `"22024"`.
    #[serde(rename = "SEASON_ID")]
    pub season_id: String,
    /// Team identifier.
    #[serde(rename = "TEAM_ID")]
    pub team_id: i64,
    /// Team tricode, e.g. `"OKC"`.
    #[serde(rename = "TEAM_ABBREVIATION")]
    pub team_abbreviation: String,
    /// Game identifier, e.g. `"0022400001"`.
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
    /// Game date, `YYYY-MM-DD`.
    #[serde(rename = "GAME_DATE")]
    pub game_date: String,
    /// Matchup text, e.g. `"OKC vs. DEN"`.
    #[serde(rename = "MATCHUP")]
    pub matchup: String,
    /// `"W"` or `"L"`; absent for games not yet played.
    #[serde(rename = "WL")]
    pub win_loss: Option<String>,
    /// Points scored.
    #[serde(rename = "PTS")]
    pub points: Option<i64>,
    /// Point differential while on court.
    #[serde(rename = "PLUS_MINUS")]
    pub plus_minus: Option<f64>,
}

/// Team-level game log for a season. Tabular, single block.
#[derive(Debug, Clone)]
pub struct LeagueGameLog {
    /// Season in `YYYY-YY` format.
    pub season: String,
    /// Season phase.
    pub season_type: SeasonType,
    /// Only games on or after this date (`MM/DD/YYYY`).
    pub date_from: Option<String>,
    /// Only games on or before this date (`MM/DD/YYYY`).
    pub date_to: Option<String>,
}

impl LeagueGameLog {
    /// Game log for a season and phase, unrestricted by date.
    pub fn new(season: impl Into<String>, season_type: SeasonType) -> Self {
        Self {
            season: season.into(),
            season_type,
            date_from: None,
            date_to: None,
        }
    }
}

impl Endpoint for LeagueGameLog {
    type Response = Vec<GameLogEntry>;

    fn path(&self) -> &str {
        "leaguegamelog"
    }

    // The API requires every parameter present, empty-valued when unused.
    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("Counter".to_string(), "0".to_string()),
            (
                "DateFrom".to_string(),
                self.date_from.clone().unwrap_or_default(),
            ),
            (
                "DateTo".to_string(),
                self.date_to.clone().unwrap_or_default(),
            ),
            ("Direction".to_string(), "ASC".to_string()),
            ("LeagueID".to_string(), LEAGUE_ID_NBA.to_string()),
            ("PlayerOrTeam".to_string(), "T".to_string()),
            ("Season".to_string(), self.season.clone()),
            ("SeasonType".to_string(), self.season_type.to_string()),
            ("Sorter".to_string(), "DATE".to_string()),
        ]
    }

    fn decode(&self, raw: &Value) -> Result<Self::Response> {
        table::rows_as(raw, BlockSelector::Index(0))
    }
}

/// A game on the scoreboard.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardGame {
    /// Game identifier.
    #[serde(rename = "gameId")]
    pub game_id: String,
    /// Status text, e.g. `"Final"` or `"7:00 pm ET"`.
    #[serde(rename = "gameStatusText")]
    pub game_status_text: String,
    /// Home side.
    #[serde(rename = "homeTeam")]
    pub home_team: ScoreboardTeam,
    /// Visiting side.
    #[serde(rename = "awayTeam")]
    pub away_team: ScoreboardTeam,
}

/// One side of a scoreboard game.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardTeam {
    /// Team identifier.
    #[serde(rename = "teamId")]
    pub team_id: i64,
    /// Team tricode.
    #[serde(rename = "teamTricode")]
    pub team_tricode: String,
    /// Current score; absent before tip-off.
    pub score: Option<i64>,
}

/// Scoreboard payload for one date.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardData {
    /// The date the scoreboard covers, `YYYY-MM-DD`.
    #[serde(rename = "gameDate")]
    pub game_date: String,
    /// Games on that date, possibly none.
    pub games: Vec<ScoreboardGame>,
}

/// Response envelope of the scoreboard endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardResponse {
    /// Absent when the API has nothing for the date.
    pub scoreboard: Option<ScoreboardData>,
}

/// Games scheduled on a date. Pre-structured JSON, no normalization.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    /// Date in `YYYY-MM-DD` format.
    pub game_date: String,
}

impl Scoreboard {
    /// Scoreboard for the given date.
    pub fn new(game_date: impl Into<String>) -> Self {
        Self {
            game_date: game_date.into(),
        }
    }
}

impl Endpoint for Scoreboard {
    type Response = ScoreboardResponse;

    fn path(&self) -> &str {
        "scoreboardv3"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("GameDate".to_string(), self.game_date.clone()),
            ("LeagueID".to_string(), LEAGUE_ID_NBA.to_string()),
        ]
    }
}

/// Decoded cumulative team stats: per-game rows plus an optional totals row.
#[derive(Debug, Clone, Deserialize)]
pub struct CumulativeTeamStatsResponse {
    /// One record per requested game.
    pub game_by_game: Vec<Record>,
    /// Aggregate over the requested games; `None` when the API returns an
    /// empty totals block.
    pub totals: Option<Record>,
}

/// Cumulative team stats over a set of games. Multi-block projection.
#[derive(Debug, Clone)]
pub struct CumulativeTeamStats {
    /// Team identifier.
    pub team_id: i64,
    /// Season in `YYYY-YY` format.
    pub season: String,
    /// Season phase.
    pub season_type: SeasonType,
    /// Game identifiers to aggregate over.
    pub game_ids: Vec<String>,
}

impl Endpoint for CumulativeTeamStats {
    type Response = CumulativeTeamStatsResponse;

    fn path(&self) -> &str {
        "cumestatsteam"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("GameIDs".to_string(), self.game_ids.join("|")),
            ("LeagueID".to_string(), LEAGUE_ID_NBA.to_string()),
            ("Season".to_string(), self.season.clone()),
            ("SeasonType".to_string(), self.season_type.to_string()),
            ("TeamID".to_string(), self.team_id.to_string()),
        ]
    }

    fn decode(&self, raw: &Value) -> Result<Self::Response> {
        let projected = table::project(
            raw,
            &[
                ("game_by_game", BlockSpec::rows("GameByGameStats")),
                ("totals", BlockSpec::first("TotalTeamStats").optional()),
            ],
        )?;
        serde_json::from_value(projected).map_err(|e| Error::Decode {
            context: self.path().to_string(),
            detail: e.to_string(),
            raw: String::new(),
        })
    }
}
