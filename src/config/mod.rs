//! Configuration loading and font lookup for the CLI.

pub use prerollforge_common::config::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Searched in order when no `--config` is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./prerollforge.toml",
    "~/.config/prerollforge/config.toml",
    "/etc/prerollforge/config.toml",
];

/// Fonts tried when neither `--font` nor `render.font_path` is usable.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Pick the overlay font: the explicit flag, then `render.font_path`, then
/// the first system candidate that exists.
///
/// An explicit flag that does not exist is an error; a missing configured
/// font only falls through to the system search.
pub fn resolve_font(flag: Option<&Path>, config: &RenderConfig) -> Result<Option<PathBuf>> {
    if let Some(path) = flag {
        let expanded = expand(path);
        if !expanded.is_file() {
            anyhow::bail!("Font file does not exist: {:?}", expanded);
        }
        return Ok(Some(expanded));
    }

    if let Some(ref path) = config.font_path {
        let expanded = expand(path);
        if expanded.is_file() {
            return Ok(Some(expanded));
        }
        tracing::warn!("Configured font {:?} not found, searching system fonts", expanded);
    }

    Ok(SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file()))
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_font_must_exist() {
        let err = resolve_font(Some(Path::new("/nonexistent/font.ttf")), &RenderConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn configured_font_is_used() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let render = RenderConfig {
            font_path: Some(tmp.path().to_path_buf()),
            ..RenderConfig::default()
        };
        assert_eq!(resolve_font(None, &render).unwrap(), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn flag_wins_over_config() {
        let flag = tempfile::NamedTempFile::new().unwrap();
        let configured = tempfile::NamedTempFile::new().unwrap();
        let render = RenderConfig {
            font_path: Some(configured.path().to_path_buf()),
            ..RenderConfig::default()
        };
        assert_eq!(
            resolve_font(Some(flag.path()), &render).unwrap(),
            Some(flag.path().to_path_buf())
        );
    }
}
