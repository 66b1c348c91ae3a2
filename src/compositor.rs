//! Numeral Compositor - Single Entry Point
//!
//! generate() range-checks, then overlays thousands, hundreds, tens, units
//! onto a fresh opaque canvas. Missing components are omitted.

use std::borrow::Cow;
use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::{imageops, DynamicImage, ImageFormat, RgbImage, Rgba, RgbaImage};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::CompositorConfig;
use crate::hashing::{compute_image_hash, compute_job_hash, library_fingerprint};
use crate::library::{ComponentKey, ComponentLibrary};
use crate::numeral::{BreakdownEntry, Numeral, NumeralError, Place};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum CompositorError {
    #[error(transparent)]
    Numeral(#[from] NumeralError),

    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    Drawn,
    Resized,
    Missing,
}

/// What happened to one nonzero digit during composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUsage {
    pub place: Place,
    pub digit: u8,
    pub file_name: String,
    pub status: UsageStatus,
}

/// A composited numeral together with its manifest
#[derive(Debug, Clone, Serialize)]
pub struct RenderedNumeral {
    pub id: String,
    pub number: Numeral,
    pub digits: [u8; 4],
    pub breakdown: Vec<BreakdownEntry>,
    pub components: Vec<ComponentUsage>,
    pub canvas_size: [u32; 2],
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub image_hash: String,
    pub job_hash: String,
    #[serde(skip)]
    pub image: RgbImage,
}

impl RenderedNumeral {
    pub fn is_complete(&self) -> bool {
        self.components.iter().all(|c| c.status != UsageStatus::Missing)
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>, CompositorError> {
        encode_png(&self.image)
    }

    pub fn png_base64(&self) -> Result<String, CompositorError> {
        let data = self.png_bytes()?;
        Ok(base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data))
    }
}

/// The compositor - turns a number into one flat image
pub struct Compositor {
    library: Arc<ComponentLibrary>,
    config: CompositorConfig,
    fingerprint: String,
}

impl Compositor {
    pub fn new(library: Arc<ComponentLibrary>, config: CompositorConfig) -> Self {
        let fingerprint = library_fingerprint(&library);
        Self { library, config, fingerprint }
    }

    pub fn with_library(library: Arc<ComponentLibrary>) -> Self {
        Self::new(library, CompositorConfig::default())
    }

    pub fn library(&self) -> &ComponentLibrary {
        &self.library
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Composite the numeral for `number`.
    ///
    /// Fails only with `InvalidRange`; no image is produced in that case.
    pub fn generate(&self, number: i64) -> Result<RgbImage, NumeralError> {
        let numeral = Numeral::new(number)?;
        Ok(self.compose(numeral).0)
    }

    /// Composite and describe the result
    pub fn render(&self, number: i64) -> Result<RenderedNumeral, CompositorError> {
        let numeral = Numeral::new(number)?;
        let (image, components) = self.compose(numeral);

        let job_hash = compute_job_hash(
            numeral.value(),
            &self.fingerprint,
            &self.config,
            ENGINE_VERSION,
        )?;

        Ok(RenderedNumeral {
            id: Uuid::new_v4().to_string(),
            number: numeral,
            digits: numeral.digits(),
            breakdown: numeral.breakdown(),
            components,
            canvas_size: [image.width(), image.height()],
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            image_hash: compute_image_hash(&image),
            job_hash,
            image,
        })
    }

    fn compose(&self, numeral: Numeral) -> (RgbImage, Vec<ComponentUsage>) {
        let (width, height) = self.config.dimensions();
        let [r, g, b] = self.config.background;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
        let mut usage = Vec::with_capacity(4);

        for (place, digit) in numeral.nonzero_places() {
            let file_name = ComponentKey { place, digit }.file_name();

            let Some(component) = self.library.lookup(place, digit) else {
                tracing::debug!(%place, digit, "component missing, omitted");
                usage.push(ComponentUsage { place, digit, file_name, status: UsageStatus::Missing });
                continue;
            };

            let layer = if component.dimensions() == (width, height) {
                Cow::Borrowed(&component.image)
            } else {
                tracing::debug!(
                    %place, digit,
                    from = ?component.dimensions(),
                    filter = ?self.config.resample,
                    "resampling component to canvas"
                );
                Cow::Owned(imageops::resize(
                    &component.image,
                    width,
                    height,
                    self.config.resample.filter_type(),
                ))
            };

            imageops::overlay(&mut canvas, &*layer, 0, 0);

            let status = match layer {
                Cow::Borrowed(_) => UsageStatus::Drawn,
                Cow::Owned(_) => UsageStatus::Resized,
            };
            usage.push(ComponentUsage { place, digit, file_name, status });
        }

        // Background is opaque, so dropping alpha loses nothing
        (DynamicImage::ImageRgba8(canvas).to_rgb8(), usage)
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, CompositorError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn single_pixel_component(size: u32, x: u32, y: u32, color: Rgba<u8>) -> RgbaImage {
        let mut img = RgbaImage::new(size, size);
        img.put_pixel(x, y, color);
        img
    }

    fn compositor_with(entries: Vec<(Place, u8, RgbaImage)>) -> Compositor {
        let mut library = ComponentLibrary::new();
        for (place, digit, img) in entries {
            library.register(ComponentKey::new(place, digit).unwrap(), img);
        }
        Compositor::with_library(Arc::new(library))
    }

    #[test]
    fn test_blank_canvas_for_empty_library() {
        let compositor = compositor_with(vec![]);
        let img = compositor.generate(1234).unwrap();
        assert_eq!(img.dimensions(), (200, 200));
        assert!(img.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_only_opaque_pixels_replace_canvas() {
        let compositor = compositor_with(vec![(Place::Units, 5, single_pixel_component(200, 10, 20, RED))]);
        let img = compositor.generate(5).unwrap();
        assert_eq!(*img.get_pixel(10, 20), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_zero_digit_never_drawn() {
        let compositor = compositor_with(vec![(Place::Tens, 1, single_pixel_component(200, 3, 3, RED))]);
        let img = compositor.generate(5).unwrap();
        assert_eq!(*img.get_pixel(3, 3), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_later_place_drawn_on_top() {
        let blue = Rgba([0, 0, 255, 255]);
        let compositor = compositor_with(vec![
            (Place::Hundreds, 2, single_pixel_component(200, 7, 7, RED)),
            (Place::Units, 7, single_pixel_component(200, 7, 7, blue)),
        ]);
        let img = compositor.generate(207).unwrap();
        assert_eq!(*img.get_pixel(7, 7), Rgb([0, 0, 255]));
    }

    #[test]
    fn test_mismatched_component_is_resized() {
        // 2x2 component, top-left pixel set: nearest-neighbor fills the top-left quadrant
        let compositor = compositor_with(vec![(Place::Thousands, 1, single_pixel_component(2, 0, 0, RED))]);
        let rendered = compositor.render(1000).unwrap();

        assert_eq!(rendered.image.dimensions(), (200, 200));
        assert_eq!(*rendered.image.get_pixel(50, 50), Rgb([255, 0, 0]));
        assert_eq!(*rendered.image.get_pixel(150, 150), Rgb([255, 255, 255]));
        assert_eq!(rendered.components[0].status, UsageStatus::Resized);
    }

    #[test]
    fn test_render_reports_usage_in_overlay_order() {
        let compositor = compositor_with(vec![(Place::Units, 7, single_pixel_component(200, 0, 0, RED))]);
        let rendered = compositor.render(207).unwrap();

        let statuses: Vec<_> = rendered.components.iter()
            .map(|c| (c.place, c.digit, c.status))
            .collect();
        assert_eq!(statuses, vec![
            (Place::Hundreds, 2, UsageStatus::Missing),
            (Place::Units, 7, UsageStatus::Drawn),
        ]);
        assert!(!rendered.is_complete());
        assert_eq!(rendered.components[0].file_name, "hundred_200.png");
    }

    #[test]
    fn test_render_rejects_out_of_range() {
        let compositor = compositor_with(vec![]);
        assert!(matches!(
            compositor.render(10000),
            Err(CompositorError::Numeral(NumeralError::InvalidRange(10000)))
        ));
    }

    #[test]
    fn test_custom_canvas_and_background() {
        let config = CompositorConfig::from_user(32, [0, 0, 0], crate::ResampleFilter::Bilinear).unwrap();
        let compositor = Compositor::new(Arc::new(ComponentLibrary::new()), config);
        let img = compositor.generate(9).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(*img.get_pixel(16, 16), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_bilinear_resize_keeps_stroke() {
        // 10x10 component with a solid 4x4 block in the middle
        let mut small = RgbaImage::new(10, 10);
        for x in 3..7 {
            for y in 3..7 {
                small.put_pixel(x, y, RED);
            }
        }
        let mut library = ComponentLibrary::new();
        library.register(ComponentKey::new(Place::Tens, 3).unwrap(), small);
        let config = CompositorConfig::from_user(100, [255, 255, 255], crate::ResampleFilter::Bilinear).unwrap();
        let compositor = Compositor::new(Arc::new(library), config);

        let rendered = compositor.render(30).unwrap();

        assert_eq!(rendered.image.dimensions(), (100, 100));
        assert_eq!(rendered.components[0].status, UsageStatus::Resized);
        assert_ne!(*rendered.image.get_pixel(50, 50), Rgb([255, 255, 255]));
        assert_eq!(*rendered.image.get_pixel(5, 5), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_png_encoding_decodes_back() {
        let compositor = compositor_with(vec![(Place::Units, 1, single_pixel_component(200, 1, 1, RED))]);
        let rendered = compositor.render(1).unwrap();
        let decoded = image::load_from_memory(&rendered.png_bytes().unwrap()).unwrap().to_rgb8();
        assert_eq!(decoded, rendered.image);
        assert!(!rendered.png_base64().unwrap().is_empty());
    }
}
