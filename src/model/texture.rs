use std::path::{Path, PathBuf};

use super::AssetError;

/// One of the four built-in diffuse maps shipped under `maps/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureVariant(u8);

impl TextureVariant {
    pub const COUNT: u8 = 4;

    /// Cycles 0 -> 1 -> 2 -> 3 -> 0.
    pub fn next(self) -> Self {
        TextureVariant((self.0 + 1) % Self::COUNT)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Path relative to the assets directory, e.g. `maps/1.jpg`.
    pub fn relative_path(self) -> PathBuf {
        Path::new("maps").join(format!("{}.jpg", self.0 + 1))
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(io) => AssetError::io(path, io),
            source => AssetError::Image { path: path.to_path_buf(), source },
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("Decoded texture {} ({}x{})", path.display(), width, height);
        Ok(Self { width, height, rgba: rgba.into_raw() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_cycle_has_length_four() {
        let start = TextureVariant::default();
        let mut variant = start;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(variant.index());
            variant = variant.next();
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(variant, start);
    }

    #[test]
    fn test_load_png_texture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let mut img = image::RgbaImage::new(2, 3);
        img.put_pixel(1, 2, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let texture = TextureImage::load(&path).unwrap();
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(texture.rgba.len(), 2 * 3 * 4);
        assert_eq!(&texture.rgba[(2 * 2 + 1) * 4..][..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_texture_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextureImage::load(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
