/// Cropping one cover out of a combined scan
use crate::cover::Region;
use crate::error::SplitError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GenericImageView, ImageFormat, RgbaImage, imageops};
use serde::Serialize;
use std::io::Cursor;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A cropped image as an embeddable `data:` URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_png(png: &[u8]) -> EncodedImage {
        EncodedImage(format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw PNG bytes behind the URI
    pub fn png_bytes(&self) -> Option<Vec<u8>> {
        let payload = self.0.strip_prefix(PNG_DATA_URI_PREFIX)?;
        STANDARD.decode(payload).ok()
    }
}

#[async_trait(?Send)]
pub trait ImageSplitter {
    async fn split(&self, source_url: &str, region: Region) -> Result<EncodedImage, SplitError>;
}

/// Copy `region` of the encoded image into a surface of exactly the region's size.
///
/// Pixels of the region that fall outside the source stay transparent,
/// the same result a 2D canvas gives for an out-of-bounds draw.
pub fn crop_to_data_uri(bytes: &[u8], region: Region) -> Result<EncodedImage, SplitError> {
    let source = image::load_from_memory(bytes).map_err(|e| SplitError::Decode(e.to_string()))?;
    let (width, height) = source.dimensions();

    let mut surface = RgbaImage::new(region.width, region.height);
    if region.x < width && region.y < height {
        let visible = source.crop_imm(region.x, region.y, region.width, region.height).to_rgba8();
        imageops::replace(&mut surface, &visible, 0, 0);
    }

    let mut png = Vec::new();
    surface
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SplitError::Decode(e.to_string()))?;

    Ok(EncodedImage::from_png(&png))
}

/// Loads the source through the browser's `fetch`, so the host session's
/// cookies apply, then crops in Rust.
pub struct FetchSplitter;

#[async_trait(?Send)]
impl ImageSplitter for FetchSplitter {
    async fn split(&self, source_url: &str, region: Region) -> Result<EncodedImage, SplitError> {
        let bytes = fetch_bytes(source_url).await?;
        log::debug!("Cropping {:?} out of {} ({} bytes)", region, source_url, bytes.len());
        crop_to_data_uri(&bytes, region)
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, SplitError> {
    let window = web_sys::window().ok_or_else(|| SplitError::Decode("no window".to_string()))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(SplitError::decode)?;
    let response: web_sys::Response = response.dyn_into().map_err(SplitError::decode)?;

    if !response.ok() {
        return Err(SplitError::Decode(format!("{} returned HTTP {}", url, response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(SplitError::decode)?)
        .await
        .map_err(SplitError::decode)?;

    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scan(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256) * 64) as u8, 255])
        });
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();
        png
    }

    fn decode(encoded: &EncodedImage) -> RgbaImage {
        let png = encoded.png_bytes().expect("png data uri");
        image::load_from_memory(&png).unwrap().to_rgba8()
    }

    #[test]
    fn test_split_scan_into_front_and_back() {
        let source_png = scan(800, 450);
        let source = image::load_from_memory(&source_png).unwrap().to_rgba8();

        let front_region = Region { x: 420, y: 0, width: 380, height: 450 };
        let back_region = Region { x: 0, y: 0, width: 380, height: 450 };
        let front = crop_to_data_uri(&source_png, front_region).unwrap();
        let back = crop_to_data_uri(&source_png, back_region).unwrap();

        assert!(front.as_str().starts_with("data:image/png;base64,"));

        let front = decode(&front);
        let back = decode(&back);
        assert_eq!(front.dimensions(), (380, 450));
        assert_eq!(back.dimensions(), (380, 450));

        for y in (0..450).step_by(7) {
            for x in 0..380 {
                assert_eq!(front.get_pixel(x, y), source.get_pixel(x + 420, y));
                assert_eq!(back.get_pixel(x, y), source.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_region_past_the_edge_is_transparent() {
        let source_png = scan(500, 100);

        let region = Region { x: 420, y: 0, width: 380, height: 100 };
        let cropped = decode(&crop_to_data_uri(&source_png, region).unwrap());

        assert_eq!(cropped.dimensions(), (380, 100));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([164, 0, 64, 255]));
        assert_eq!(cropped.get_pixel(79, 99).0[3], 255);
        assert_eq!(cropped.get_pixel(80, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_garbage_bytes_are_a_decode_error() {
        let region = Region { x: 0, y: 0, width: 10, height: 10 };
        let result = crop_to_data_uri(b"not an image", region);
        assert!(matches!(result, Err(SplitError::Decode(_))));
    }

    #[test]
    fn test_png_bytes_rejects_other_payloads() {
        let encoded = EncodedImage("data:image/jpeg;base64,AAAA".to_string());
        assert_eq!(encoded.png_bytes(), None);
    }
}
