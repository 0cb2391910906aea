//! Thumbnail generation.

use image::{DynamicImage, GenericImageView, ImageError, Rgb, RgbImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::ThumbnailConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Thumbnail;

/// Dimensions that fit `(width, height)` inside a `bound` x `bound` square.
///
/// The scale factor comes from the longer (binding) edge; the other edge is
/// rounded to the nearest pixel and never drops below 1. Images that already
/// fit are returned unchanged.
pub fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    if width == 0 || height == 0 || bound == 0 {
        return (width.min(bound), height.min(bound));
    }
    if width <= bound && height <= bound {
        return (width, height);
    }

    if width >= height {
        let h = (height as f64 * bound as f64 / width as f64).round() as u32;
        (bound, h.clamp(1, bound))
    } else {
        let w = (width as f64 * bound as f64 / height as f64).round() as u32;
        (w.clamp(1, bound), bound)
    }
}

/// Generates thumbnails from images.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
    save_dir: Option<PathBuf>,
    /// File names already written to `save_dir` by this generator
    saved_names: Mutex<HashSet<String>>,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    ///
    /// `save_dir` is the already-resolved directory thumbnails are copied to.
    pub fn new(config: ThumbnailConfig, save_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            save_dir,
            saved_names: Mutex::new(HashSet::new()),
        }
    }

    /// Longest-edge bound in pixels.
    pub fn bound(&self) -> u32 {
        self.config.size
    }

    /// Resize `image` to fit the configured bound and flatten it to RGB.
    ///
    /// Transparent pixels are composited onto white.
    pub fn generate(&self, image: &DynamicImage) -> Thumbnail {
        let (width, height) = image.dimensions();
        let (tw, th) = fit_within(width, height, self.config.size);

        let resized = if (tw, th) == (width, height) {
            image.clone()
        } else {
            image.thumbnail_exact(tw, th)
        };

        Thumbnail::new(flatten_onto_white(&resized))
    }

    /// Write `thumbnail` into the save directory under `file_name`, if one is configured.
    ///
    /// Returns the written path. The encoder is picked from the extension.
    /// A name already used by this generator (two `a.jpg` from different
    /// sub-folders) gets a `_2`, `_3`, ... suffix instead of overwriting.
    pub fn save(&self, thumbnail: &Thumbnail, file_name: &str) -> Option<PipelineResult<PathBuf>> {
        let dir = self.save_dir.as_ref()?;
        let name = self.claim_name(file_name);
        if name != file_name {
            tracing::warn!(
                "Thumbnail name {:?} already used in this run, saving as {:?}",
                file_name,
                name
            );
        }
        Some(Self::save_into(dir, thumbnail, &name))
    }

    fn claim_name(&self, file_name: &str) -> String {
        let mut used = self
            .saved_names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if used.insert(file_name.to_string()) {
            return file_name.to_string();
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

        let mut n = 2u32;
        loop {
            let candidate = match &ext {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            if used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn save_into(dir: &Path, thumbnail: &Thumbnail, file_name: &str) -> PipelineResult<PathBuf> {
        let path = dir.join(file_name);
        let save_err = |source| PipelineError::ThumbnailSave {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(dir)
            .map_err(ImageError::IoError)
            .map_err(save_err)?;
        thumbnail.as_image().save(&path).map_err(save_err)?;
        Ok(path)
    }
}

fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn generator(size: u32) -> ThumbnailGenerator {
        ThumbnailGenerator::new(
            ThumbnailConfig {
                size,
                save_dir: None,
            },
            None,
        )
    }

    #[test]
    fn test_fit_within_landscape() {
        assert_eq!(fit_within(4000, 3000, 200), (200, 150));
    }

    #[test]
    fn test_fit_within_portrait() {
        assert_eq!(fit_within(3000, 4000, 200), (150, 200));
    }

    #[test]
    fn test_fit_within_square() {
        assert_eq!(fit_within(1024, 1024, 200), (200, 200));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(120, 80, 200), (120, 80));
    }

    #[test]
    fn test_fit_within_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within(10_000, 3, 200), (200, 1));
        assert_eq!(fit_within(3, 10_000, 200), (1, 200));
    }

    #[test]
    fn test_fit_within_aspect_ratio_preserved() {
        for (w, h) in [(4032, 3024), (1920, 1080), (777, 1313), (201, 199), (5000, 7)] {
            let (tw, th) = fit_within(w, h, 200);
            assert!(tw.max(th) <= 200, "{w}x{h} -> {tw}x{th}");
            // Expected short edge from the exact ratio, within one pixel
            if w >= h {
                let exact = h as f64 * tw as f64 / w as f64;
                assert!((th as f64 - exact).abs() <= 1.0, "{w}x{h} -> {tw}x{th}");
            } else {
                let exact = w as f64 * th as f64 / h as f64;
                assert!((tw as f64 - exact).abs() <= 1.0, "{w}x{h} -> {tw}x{th}");
            }
        }
    }

    #[test]
    fn test_generate_dimensions() {
        let img = DynamicImage::new_rgb8(1000, 500);
        let thumb = generator(128).generate(&img);
        assert_eq!((thumb.width(), thumb.height()), (128, 64));
        assert_eq!(thumb.as_rgb_bytes().len(), 128 * 64 * 3);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let img = DynamicImage::new_rgb8(333, 777);
        let gen = generator(200);
        let a = gen.generate(&img);
        let b = gen.generate(&img);
        assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let thumb = generator(200).generate(&img);
        assert_eq!(thumb.as_image().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_save_without_dir_is_noop() {
        let thumb = generator(64).generate(&DynamicImage::new_rgb8(10, 10));
        assert!(generator(64).save(&thumb, "a.png").is_none());
    }

    #[test]
    fn test_save_duplicate_names_are_disambiguated() {
        let dir = tempfile::tempdir().unwrap();
        let gen = ThumbnailGenerator::new(ThumbnailConfig::default(), Some(dir.path().into()));
        let thumb = gen.generate(&DynamicImage::new_rgb8(10, 10));

        let first = gen.save(&thumb, "a.png").unwrap().unwrap();
        let second = gen.save(&thumb, "a.png").unwrap().unwrap();
        let third = gen.save(&thumb, "a.png").unwrap().unwrap();

        assert_eq!(first, dir.path().join("a.png"));
        assert_eq!(second, dir.path().join("a_2.png"));
        assert_eq!(third, dir.path().join("a_3.png"));
        assert!(second.is_file() && third.is_file());
    }

    #[test]
    fn test_save_failure_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let gen = ThumbnailGenerator::new(ThumbnailConfig::default(), Some(blocker.join("thumbs")));
        let thumb = gen.generate(&DynamicImage::new_rgb8(10, 10));

        let err = gen.save(&thumb, "a.png").unwrap().unwrap_err();
        assert!(matches!(err, PipelineError::ThumbnailSave { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_save_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("thumbs");
        let gen = ThumbnailGenerator::new(ThumbnailConfig::default(), Some(out.clone()));
        let thumb = gen.generate(&DynamicImage::new_rgb8(400, 100));

        let path = gen.save(&thumb, "wide.png").unwrap().unwrap();
        assert_eq!(path, out.join("wide.png"));
        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.dimensions(), (200, 50));
    }
}
