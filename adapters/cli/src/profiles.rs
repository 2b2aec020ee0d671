use std::{fs, path::Path};

use anyhow::{Context, Result};
use raindrop_core::{DifficultyCatalogue, DifficultyProfile};
use serde::Deserialize;

/// Catalogue shipped with the binary, used when no profile file is supplied.
const BUILTIN_PROFILES: &str = include_str!("../assets/difficulties.toml");

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    difficulty: Vec<DifficultyProfile>,
}

/// Loads and validates the difficulty catalogue from `path`, or the built-in one.
pub(crate) fn load_catalogue(path: Option<&Path>) -> Result<DifficultyCatalogue> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read difficulty profiles from {}", path.display()))?;
            parse_catalogue(&source)
                .with_context(|| format!("invalid difficulty profiles in {}", path.display()))
        }
        None => parse_catalogue(BUILTIN_PROFILES).context("invalid built-in difficulty profiles"),
    }
}

fn parse_catalogue(source: &str) -> Result<DifficultyCatalogue> {
    let file: ProfilesFile = toml::from_str(source).context("malformed TOML")?;
    Ok(DifficultyCatalogue::new(file.difficulty)?)
}
