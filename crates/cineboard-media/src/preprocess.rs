//! Reference image preparation.
//!
//! Downloads a character reference, optionally crops it down to the head
//! region when a full-body asset feeds a close shot, normalizes size and
//! tone, and returns the result as a JPEG data URI ready to inline into a
//! generation request. Preparation is best-effort: any failure is logged
//! and the caller proceeds without a reference rather than failing the
//! whole shot.

use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use cineboard_models::ShotType;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Longest edge of a prepared reference.
const MAX_EDGE: u32 = 1536;

/// References smaller than this are rejected as unusable.
const MIN_EDGE: u32 = 64;

const JPEG_QUALITY: u8 = 85;

/// Contrast boost (percent) applied to draft references so faint sketch
/// lines survive the monochrome render.
const DRAFT_CONTRAST: f32 = 20.0;

/// Unsharp-mask parameters for draft references.
const DRAFT_SHARPEN_SIGMA: f32 = 1.2;
const DRAFT_SHARPEN_THRESHOLD: i32 = 4;

/// Vertical margin added around a head crop, as a fraction of image height.
const HEAD_MARGIN: f32 = 0.08;

/// Head crop height as a fraction of image height.
const HEAD_WINDOW: f32 = 0.45;

/// Caller-supplied hint for where the head is in a reference image.
#[derive(Debug, Clone, Copy)]
pub struct HeadHint {
    /// Vertical center of the head, 0.0 = top edge, 1.0 = bottom edge.
    pub center_y: f32,
}

/// Computes the head crop rectangle `(x, y, width, height)`.
fn head_crop_window(width: u32, height: u32, hint: HeadHint) -> (u32, u32, u32, u32) {
    let center = hint.center_y.clamp(0.0, 1.0);
    let window = ((HEAD_WINDOW + 2.0 * HEAD_MARGIN) * height as f32) as u32;
    let window = window.clamp(1, height);
    let top = (center * height as f32 - window as f32 / 2.0).max(0.0) as u32;
    let top = top.min(height - window);
    (0, top, width, window)
}

fn encode_data_uri(img: &DynamicImage, draft: bool) -> MediaResult<String> {
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);
    if draft {
        encoder.encode_image(&img.to_luma8())?;
    } else {
        encoder.encode_image(&img.to_rgb8())?;
    }
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&buf)))
}

/// Downloads and normalizes character references for generation requests.
pub struct ReferencePreprocessor {
    client: reqwest::Client,
}

impl Default for ReferencePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferencePreprocessor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Prepares a reference for the given target framing. Returns `None`
    /// on any failure so a broken reference never blocks the shot.
    pub async fn prepare(
        &self,
        url: &str,
        target_shot: ShotType,
        head_hint: Option<HeadHint>,
        draft: bool,
    ) -> Option<String> {
        match self.prepare_inner(url, target_shot, head_hint, draft).await {
            Ok(data_uri) => Some(data_uri),
            Err(err) => {
                warn!(url, error = %err, "reference preparation failed, continuing without it");
                None
            }
        }
    }

    async fn prepare_inner(
        &self,
        url: &str,
        target_shot: ShotType,
        head_hint: Option<HeadHint>,
        draft: bool,
    ) -> MediaResult<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MediaError::FetchStatus(response.status().as_u16()));
        }
        let bytes = response.bytes().await?;
        let mut img = image::load_from_memory(&bytes)?;

        let (width, height) = img.dimensions();
        if width < MIN_EDGE || height < MIN_EDGE {
            return Err(MediaError::TooSmall { width, height });
        }

        // A full-body reference feeding a close shot drags the framing
        // back out; crop down to the head region first. Without a hint
        // for where the head sits, the image passes through uncropped.
        if target_shot.is_close() && height > width {
            if let Some(hint) = head_hint {
                let (x, y, w, h) = head_crop_window(width, height, hint);
                img = img.crop_imm(x, y, w, h);
                debug!(url, y, h, "cropped reference to head region");
            }
        }

        let (width, height) = img.dimensions();
        if width.max(height) > MAX_EDGE {
            img = img.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle);
        }

        if draft {
            img = img
                .grayscale()
                .adjust_contrast(DRAFT_CONTRAST)
                .unsharpen(DRAFT_SHARPEN_SIGMA, DRAFT_SHARPEN_THRESHOLD);
        }

        encode_data_uri(&img, draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageOutputFormat, Rgb};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([120u8, 80, 40])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png).unwrap();
        buf
    }

    fn decode_data_uri(uri: &str) -> DynamicImage {
        let b64 = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        image::load_from_memory(&STANDARD.decode(b64).unwrap()).unwrap()
    }

    #[test]
    fn test_head_crop_window_near_top() {
        let (x, y, w, h) = head_crop_window(1000, 2000, HeadHint { center_y: 0.18 });
        assert_eq!(x, 0);
        assert_eq!(w, 1000);
        // 0.45 window + 0.08 margin each side
        assert_eq!(h, 1220);
        assert_eq!(y, 0);
    }

    #[test]
    fn test_head_crop_window_clamps_to_image() {
        let (_, y, _, h) = head_crop_window(800, 1000, HeadHint { center_y: 0.95 });
        assert!(y + h <= 1000);
        let (_, y, _, h) = head_crop_window(800, 1000, HeadHint { center_y: 0.0 });
        assert_eq!(y, 0);
        assert!(h <= 1000);
    }

    #[test]
    fn test_encode_produces_jpeg_data_uri() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([10u8, 20, 30])));
        let uri = encode_data_uri(&img, false).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        let decoded = decode_data_uri(&uri);
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[tokio::test]
    async fn test_prepare_resizes_oversized_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ref.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(test_png(2048, 1024)))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        let uri = pre
            .prepare(&format!("{}/ref.png", server.uri()), ShotType::Wide, None, false)
            .await
            .expect("prepare should succeed");
        let img = decode_data_uri(&uri);
        let (w, h) = img.dimensions();
        assert!(w <= MAX_EDGE && h <= MAX_EDGE);
        assert_eq!(w, 1536);
    }

    #[tokio::test]
    async fn test_close_shot_crops_portrait_reference_with_hint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/full_body.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(test_png(400, 1200)))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        let uri = pre
            .prepare(
                &format!("{}/full_body.png", server.uri()),
                ShotType::CloseUp,
                Some(HeadHint { center_y: 0.18 }),
                false,
            )
            .await
            .unwrap();
        let (w, h) = decode_data_uri(&uri).dimensions();
        assert_eq!(w, 400);
        // 0.61 of 1200
        assert_eq!(h, 732);
    }

    #[tokio::test]
    async fn test_close_shot_without_hint_passes_through_uncropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/full_body.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(test_png(400, 1200)))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        let uri = pre
            .prepare(&format!("{}/full_body.png", server.uri()), ShotType::CloseUp, None, false)
            .await
            .unwrap();
        assert_eq!(decode_data_uri(&uri).dimensions(), (400, 1200));
    }

    #[tokio::test]
    async fn test_draft_reference_is_monochrome_with_boosted_contrast() {
        let mut buf = ImageBuffer::from_pixel(64, 64, Rgb([100u8, 100, 100]));
        for (x, _, px) in buf.enumerate_pixels_mut() {
            if x >= 32 {
                *px = Rgb([150u8, 150, 150]);
            }
        }
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(buf)
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ref.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        let uri = pre
            .prepare(&format!("{}/ref.png", server.uri()), ShotType::Wide, None, true)
            .await
            .unwrap();
        let gray = decode_data_uri(&uri).to_luma8();
        // Sampled away from the edge so jpeg ringing does not interfere;
        // the source halves differ by 50, the boost widens the spread.
        let dark = gray.get_pixel(8, 32)[0] as i32;
        let bright = gray.get_pixel(56, 32)[0] as i32;
        assert!(bright - dark > 60, "spread was {}", bright - dark);
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        let result = pre
            .prepare(&format!("{}/missing.png", server.uri()), ShotType::Mid, None, false)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_garbage_bytes_yield_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not an image".to_vec()))
            .mount(&server)
            .await;

        let pre = ReferencePreprocessor::new();
        assert!(pre
            .prepare(&format!("{}/bad.png", server.uri()), ShotType::Mid, None, false)
            .await
            .is_none());
    }
}
