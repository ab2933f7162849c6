use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};
use sgf_core::render::RenderError;
use sgf_core::selector::ImageFormat;

const JPEG_QUALITY: u8 = 90;

pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
            encoder
                .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
                .map_err(|e| RenderError(format!("PNG encoding failed: {e}")))?;
        }
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            encoder
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(|e| RenderError(format!("JPEG encoding failed: {e}")))?;
        }
    }
    Ok(bytes)
}
