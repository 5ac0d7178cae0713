//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono::NaiveTime;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use att_core::clock::DEFAULT_UTC_OFFSET_HOURS;
use att_core::{
    AttendancePolicy, ClassifierConfig, DirectionClassifier, FULL_DAY_SECONDS, InvalidDayRule,
    LatePolicy, OrgClock, StatusThresholds,
};
use att_db::EmployeeFilter;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Organization offset from UTC in whole hours.
    pub utc_offset_hours: i32,

    /// Seconds inside required for a full day.
    pub full_day_seconds: f64,

    /// When a day with an open session is reported as invalid.
    pub invalid_day_rule: InvalidDayRule,

    /// How reader names map to entry and exit.
    pub classifier: ClassifierConfig,

    /// Expected arrival time, `HH:MM:SS`.
    pub work_start_time: NaiveTime,

    /// Grace period before an arrival counts as late.
    pub late_threshold_minutes: i64,

    /// Run the late check on Saturdays and Sundays too.
    pub weekend_check_enabled: bool,

    /// Rows per page of the monthly grid.
    pub per_page: usize,

    /// Positions left out of every report.
    pub excluded_positions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let late = LatePolicy::default();
        Self {
            database_path: data_dir.join("att.db"),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            full_day_seconds: FULL_DAY_SECONDS,
            invalid_day_rule: InvalidDayRule::default(),
            classifier: ClassifierConfig::default(),
            work_start_time: late.work_start,
            late_threshold_minutes: late.threshold_minutes,
            weekend_check_enabled: late.weekend_check_enabled,
            per_page: 20,
            excluded_positions: vec![
                "STUDENT".to_string(),
                "VISITOR".to_string(),
                "MÜƏLLİM".to_string(),
            ],
        }
    }
}

impl Config {
    /// Loads configuration from default locations, then `config_path` if given.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ATT_DATABASE_PATH, ATT_PER_PAGE, ...
        figment = figment.merge(Env::prefixed("ATT_"));

        figment.extract()
    }

    /// How days are reconstructed and classified.
    pub const fn policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            thresholds: StatusThresholds {
                full_day_seconds: self.full_day_seconds,
            },
            invalid_day_rule: self.invalid_day_rule,
        }
    }

    pub const fn late_policy(&self) -> LatePolicy {
        LatePolicy {
            work_start: self.work_start_time,
            threshold_minutes: self.late_threshold_minutes,
            weekend_check_enabled: self.weekend_check_enabled,
        }
    }

    /// The organization clock for `utc_offset_hours`.
    pub fn clock(&self) -> Result<OrgClock> {
        OrgClock::from_offset_hours(self.utc_offset_hours)
            .ok_or_else(|| anyhow!("utc_offset_hours out of range: {}", self.utc_offset_hours))
    }

    pub fn classifier(&self) -> Box<dyn DirectionClassifier> {
        self.classifier.build()
    }

    /// Employee filter honoring `excluded_positions`.
    pub fn employee_filter<'a>(&'a self, search: Option<&'a str>) -> EmployeeFilter<'a> {
        EmployeeFilter {
            search,
            excluded_positions: &self.excluded_positions,
        }
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
