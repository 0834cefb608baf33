use anyhow::{Context, Result};
use coach_core::AppState;
use std::fs;
use std::path::{Path, PathBuf};

/// `$COACH_HOME`, or `~/.coach`.
pub fn coach_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("COACH_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".coach"))
}

pub fn ensure_coach_home() -> Result<PathBuf> {
    let dir = coach_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn session_path() -> Result<PathBuf> {
    Ok(ensure_coach_home()?.join("session.json"))
}

/// Load the saved session, or a fresh one. The retained-insight cap always
/// comes from config, not from the file.
pub fn load_session_from(p: &Path, cap: usize) -> Result<AppState> {
    let mut state = if p.exists() {
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        serde_json::from_str::<AppState>(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        AppState::default()
    };

    state.insights.set_cap(cap);
    Ok(state)
}

pub fn save_session_to(p: &Path, state: &AppState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
