//! Shared configuration for Swatch
//!
//! Single source of truth for window dimensions, the asset root and the
//! startup options read from the command line and environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default window width in pixels
pub const DEFAULT_WIDTH: u32 = 1600;

/// Default window height in pixels
pub const DEFAULT_HEIGHT: u32 = 900;

/// Default scale factor (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Default directory textures, models and environment maps load from
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// Route shown when none is given
pub const DEFAULT_ROUTE: &str = "/window1";

/// Environment variable overriding the asset root
pub const ENV_ASSETS: &str = "SWATCH_ASSETS";

/// Environment variable selecting the initial route
pub const ENV_ROUTE: &str = "SWATCH_ROUTE";

/// Environment variable naming a JSON file of parameter overrides
pub const ENV_PARAMS: &str = "SWATCH_PARAMS";

/// Errors raised while reading configuration inputs
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Display configuration for window and rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct DisplayConfig {
    /// Window width in logical pixels
    pub width: u32,
    /// Window height in logical pixels
    pub height: u32,
    /// Scale factor for DPI scaling
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Startup options for the preview application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct PreviewConfig {
    /// Directory asset paths are relative to
    pub asset_root: PathBuf,
    /// Route of the first page to show, e.g. `/window1`
    pub initial_route: String,
    /// Optional JSON file of parameter overrides
    pub overrides_path: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            initial_route: DEFAULT_ROUTE.to_string(),
            overrides_path: None,
        }
    }
}

impl PreviewConfig {
    /// Read from the process environment and the first CLI argument
    pub fn from_env() -> Self {
        let route_arg = std::env::args().nth(1);
        Self::from_sources(|key| std::env::var(key).ok(), route_arg)
    }

    /// Build from a variable lookup and an optional route argument.
    ///
    /// The route argument wins over `SWATCH_ROUTE`.
    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>, route_arg: Option<String>) -> Self {
        let defaults = Self::default();

        let asset_root = lookup(ENV_ASSETS)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.asset_root);

        let initial_route = route_arg
            .or_else(|| lookup(ENV_ROUTE))
            .map(|route| normalize_route(&route))
            .unwrap_or(defaults.initial_route);

        let overrides_path = lookup(ENV_PARAMS)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        tracing::debug!(
            "Preview config: assets={}, route={}, overrides={:?}",
            asset_root.display(),
            initial_route,
            overrides_path
        );

        Self {
            asset_root,
            initial_route,
            overrides_path,
        }
    }

    /// Contents of the overrides file, if one is configured
    pub fn read_overrides(&self) -> Result<Option<String>, ConfigError> {
        let Some(path) = &self.overrides_path else {
            return Ok(None);
        };
        read_text(path).map(Some)
    }
}

/// Ensure a route has exactly one leading slash and no trailing one
pub fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    format!("/{trimmed}")
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.scale, DEFAULT_SCALE);
    }

    #[test]
    fn test_preview_defaults_without_env() {
        let config = PreviewConfig::from_sources(|_| None, None);
        assert_eq!(config, PreviewConfig::default());
    }

    #[test]
    fn test_preview_reads_env() {
        let env = vars(&[
            (ENV_ASSETS, "/srv/textures"),
            (ENV_ROUTE, "flowers"),
            (ENV_PARAMS, "tuned.json"),
        ]);
        let config = PreviewConfig::from_sources(|k| env.get(k).cloned(), None);
        assert_eq!(config.asset_root, PathBuf::from("/srv/textures"));
        assert_eq!(config.initial_route, "/flowers");
        assert_eq!(config.overrides_path, Some(PathBuf::from("tuned.json")));
    }

    #[test]
    fn test_route_argument_wins() {
        let env = vars(&[(ENV_ROUTE, "/flowers")]);
        let config =
            PreviewConfig::from_sources(|k| env.get(k).cloned(), Some("waiting1/".to_string()));
        assert_eq!(config.initial_route, "/waiting1");
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("window1"), "/window1");
        assert_eq!(normalize_route("//seperate//"), "/seperate");
        assert_eq!(normalize_route(""), "/");
    }

    #[test]
    fn test_missing_overrides_file_is_an_error() {
        let config = PreviewConfig {
            overrides_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(matches!(config.read_overrides(), Err(ConfigError::Io { .. })));
        assert!(PreviewConfig::default().read_overrides().unwrap().is_none());
    }
}
