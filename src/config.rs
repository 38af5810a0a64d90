//! Runtime configuration read from the environment.
//!
//! | Variable             | Default  |
//! |----------------------|----------|
//! | `CAT_VIEWER_ASSETS`  | `assets` |
//! | `CAT_VIEWER_WIDTH`   | `800`    |
//! | `CAT_VIEWER_HEIGHT`  | `600`    |

use std::path::{Path, PathBuf};

use crate::model::TextureVariant;

pub const ASSETS_ENV: &str = "CAT_VIEWER_ASSETS";
pub const WIDTH_ENV: &str = "CAT_VIEWER_WIDTH";
pub const HEIGHT_ENV: &str = "CAT_VIEWER_HEIGHT";

/// Shading programs, in combo box order. The first four are lit and get the
/// lighting/material window.
pub const SHADER_NAMES: [&str; 6] = ["texture", "blinnphong", "phong", "gouraud", "normal", "depth"];

/// Programs with an index below this use the light and material uniforms.
pub const LIT_PROGRAM_COUNT: usize = 4;

pub const DEFAULT_MODEL: &str = "cat.obj";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub assets_dir: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    pub shader_names: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            window_width: 800,
            window_height: 600,
            shader_names: SHADER_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unparsable sizes fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ASSETS_ENV).filter(|d| !d.trim().is_empty()) {
            config.assets_dir = PathBuf::from(dir);
        }
        if let Some(width) = parse_dimension(&lookup, WIDTH_ENV) {
            config.window_width = width;
        }
        if let Some(height) = parse_dimension(&lookup, HEIGHT_ENV) {
            config.window_height = height;
        }

        config
    }

    pub fn shader_dir(&self) -> PathBuf {
        self.assets_dir.join("shaders")
    }

    /// Path to the `.vert` or `.frag` source of a program.
    pub fn shader_path(&self, name: &str, extension: &str) -> PathBuf {
        self.shader_dir().join(format!("{name}.{extension}"))
    }

    pub fn default_model_path(&self) -> PathBuf {
        self.assets_dir.join(DEFAULT_MODEL)
    }

    pub fn texture_path(&self, variant: TextureVariant) -> PathBuf {
        self.assets_dir.join(variant.relative_path())
    }

    /// Starting directory for the texture browser.
    pub fn maps_dir(&self) -> PathBuf {
        self.assets_dir.join("maps")
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

fn parse_dimension(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!("Ignoring {key}={raw:?}: expected a positive integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ViewerConfig::from_lookup(|_| None);
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.shader_names.len(), SHADER_NAMES.len());
        assert_eq!(config.default_model_path(), PathBuf::from("assets/cat.obj"));
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = ViewerConfig::from_lookup(lookup_from(&[
            (ASSETS_ENV, "/opt/cat"),
            (WIDTH_ENV, "1280"),
            (HEIGHT_ENV, " 720 "),
        ]));
        assert_eq!(config.assets_dir, PathBuf::from("/opt/cat"));
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.shader_path("phong", "frag"), PathBuf::from("/opt/cat/shaders/phong.frag"));
    }

    #[test]
    fn test_bad_dimensions_fall_back() {
        let config = ViewerConfig::from_lookup(lookup_from(&[(WIDTH_ENV, "wide"), (HEIGHT_ENV, "0")]));
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 600);
    }

    #[test]
    fn test_texture_variant_paths() {
        let config = ViewerConfig::default();
        let variant = TextureVariant::default();
        assert_eq!(config.texture_path(variant), PathBuf::from("assets/maps/1.jpg"));
        assert_eq!(config.texture_path(variant.next().next().next()), PathBuf::from("assets/maps/4.jpg"));
    }
}
