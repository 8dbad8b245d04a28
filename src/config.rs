// src/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_EXCLUSIONS_PATH: &str = "PLAYLIST_EXCLUSIONS_PATH";
const ENV_ACCESS_TOKEN: &str = "YOUTUBE_ACCESS_TOKEN";
const ENV_PLAYLIST_ID: &str = "YOUTUBE_PLAYLIST_ID";

/// Identifiers permanently ineligible for addition, with a human note on why.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ExclusionList {
    #[serde(default)]
    pub description: String,
    pub identifiers: Vec<String>,
}

impl ExclusionList {
    pub fn into_set(self) -> HashSet<String> {
        self.identifiers
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Load the exclusion list from an explicit path. Supports TOML or JSON.
pub fn load_exclusions_from(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading exclusion list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_exclusions(&content, ext.as_str())
}

/// Load the exclusion list using env var + fallbacks:
/// 1) $PLAYLIST_EXCLUSIONS_PATH
/// 2) config/excluded_videos.toml
/// 3) config/excluded_videos.json
/// No file anywhere means an empty set, not an error.
pub fn load_exclusions_default() -> Result<HashSet<String>> {
    if let Ok(p) = std::env::var(ENV_EXCLUSIONS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_exclusions_from(&pb);
        }
        return Err(anyhow!("{ENV_EXCLUSIONS_PATH} points to non-existent path"));
    }
    for candidate in [
        "config/excluded_videos.toml",
        "config/excluded_videos.json",
    ] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return load_exclusions_from(&pb);
        }
    }
    Ok(HashSet::new())
}

fn parse_exclusions(s: &str, hint_ext: &str) -> Result<HashSet<String>> {
    if hint_ext == "toml" {
        if let Ok(v) = toml::from_str::<ExclusionList>(s) {
            return Ok(v.into_set());
        }
    }
    if let Ok(v) = serde_json::from_str::<ExclusionList>(s) {
        return Ok(v.into_set());
    }
    if hint_ext != "toml" {
        if let Ok(v) = toml::from_str::<ExclusionList>(s) {
            return Ok(v.into_set());
        }
    }
    Err(anyhow!("unsupported exclusion list format"))
}

/// Remote-side settings, resolved from the environment before any pipeline
/// stage runs. Missing values are configuration errors and abort immediately.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub playlist_id: String,
    pub access_token: String,
}

impl RemoteConfig {
    pub fn from_env(playlist_flag: Option<String>) -> Result<Self> {
        let playlist_id = match playlist_flag {
            Some(id) => id,
            None => std::env::var(ENV_PLAYLIST_ID)
                .map_err(|_| anyhow!("playlist id missing: pass --playlist or set {ENV_PLAYLIST_ID}"))?,
        };
        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .map_err(|_| anyhow!("{ENV_ACCESS_TOKEN} is not set"))?;
        Ok(Self {
            playlist_id,
            access_token,
        })
    }
}
