//! Level files stored as `<level_dir>/<name>.json`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bubble_arena_world::{LayoutError, LevelLayout};
use thiserror::Error;

/// Errors raised while loading a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// No file exists for the requested level.
    #[error("level `{name}` not found at {}", path.display())]
    NotFound {
        /// Requested level name.
        name: String,
        /// Location that was searched.
        path: PathBuf,
    },
    /// The level file exists but could not be read.
    #[error("failed to read level at {}", path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level file is not valid JSON for a layout.
    #[error("failed to parse level json")]
    Parse(#[from] serde_json::Error),
    /// The layout is not a square matching its declared size.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Path at which the named level is expected.
#[must_use]
pub fn level_path(level_dir: &Path, name: &str) -> PathBuf {
    level_dir.join(format!("{name}.json"))
}

/// Loads and validates the named level from `level_dir`.
pub fn load_level(level_dir: &Path, name: &str) -> Result<LevelLayout, LevelError> {
    let path = level_path(level_dir, name);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(LevelError::NotFound {
                name: name.to_owned(),
                path,
            });
        }
        Err(source) => return Err(LevelError::Read { path, source }),
    };
    let layout = parse_level(&contents)?;
    log::info!(
        "loaded level `{name}` ({size}x{size}) from {}",
        path.display(),
        size = layout.size()
    );
    Ok(layout)
}

/// Parses and validates a level document.
pub fn parse_level(contents: &str) -> Result<LevelLayout, LevelError> {
    let layout: LevelLayout = serde_json::from_str(contents)?;
    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_level_is_not_found() {
        let error = load_level(Path::new("no/such/dir"), "ghost").expect_err("missing");
        match error {
            LevelError::NotFound { name, path } => {
                assert_eq!(name, "ghost");
                assert_eq!(path, PathBuf::from("no/such/dir/ghost.json"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(parse_level("{"), Err(LevelError::Parse(_))));
        assert!(matches!(
            parse_level(r#"{"size": 2, "cells": [[null, null]]}"#),
            Err(LevelError::Layout(LayoutError::RowCount { .. }))
        ));
    }
}
