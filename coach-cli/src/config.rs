use anyhow::{Context, Result};
use coach_core::{DEFAULT_INSIGHT_CAP, InsightPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_coach_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub insights: InsightsSection,
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsSection {
    /// A single expense above this is flagged as a warning
    pub expense_warning_threshold: f64,
    /// A trailing-window total above this emits the high-spending warning
    pub weekly_warning_threshold: f64,
    pub window_days: i64,
    /// How many insights to keep
    pub retained: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA zone used for the monthly total
    pub timezone: String,
    pub currency_symbol: String,
}

impl Default for InsightsSection {
    fn default() -> Self {
        let policy = InsightPolicy::default();
        Self {
            expense_warning_threshold: policy.expense_warning_threshold,
            weekly_warning_threshold: policy.weekly_warning_threshold,
            window_days: policy.window_days,
            retained: DEFAULT_INSIGHT_CAP,
        }
    }
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

impl InsightsSection {
    pub fn policy(&self) -> InsightPolicy {
        InsightPolicy {
            expense_warning_threshold: self.expense_warning_threshold,
            weekly_warning_threshold: self.weekly_warning_threshold,
            window_days: self.window_days.max(1),
        }
    }
}

impl ProfileSection {
    pub fn money(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_coach_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.insights.policy(), InsightPolicy::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[insights]\nweekly_warning_threshold = 300.0\n\n[profile]\ntimezone = \"Europe/Berlin\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.insights.weekly_warning_threshold, 300.0);
        assert_eq!(cfg.insights.expense_warning_threshold, 50.0);
        assert_eq!(cfg.insights.retained, DEFAULT_INSIGHT_CAP);
        assert_eq!(cfg.profile.timezone, "Europe/Berlin");
        assert_eq!(cfg.profile.currency_symbol, "$");
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.profile.currency_symbol = "€".to_string();
        cfg.insights.window_days = 14;
        save_config_to(&p, &cfg).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
        assert_eq!(cfg.profile.money(3.5), "€3.50");
    }
}
