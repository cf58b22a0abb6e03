//! Poster image fitting and data-URL embedding for uploads.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{GenericImageView, ImageFormat};

use crate::error::CoreError;

/// Uploaded posters wider than tall are bounded to this width.
pub const MAX_POSTER_WIDTH: u32 = 1200;

/// Uploaded posters taller than wide are bounded to this height.
pub const MAX_POSTER_HEIGHT: u32 = 1500;

/// Scale `(width, height)` down to fit the poster bounds, keeping the aspect
/// ratio. Landscape images are bounded by width, portrait (and square) ones
/// by height. Images already inside the bounds are returned unchanged.
pub fn fit_within(width: u32, height: u32) -> (u32, u32) {
    if width > height {
        if width > MAX_POSTER_WIDTH {
            let scaled = (f64::from(height) * f64::from(MAX_POSTER_WIDTH) / f64::from(width))
                .round()
                .max(1.0) as u32;
            return (MAX_POSTER_WIDTH, scaled);
        }
    } else if height > MAX_POSTER_HEIGHT {
        let scaled = (f64::from(width) * f64::from(MAX_POSTER_HEIGHT) / f64::from(height))
            .round()
            .max(1.0) as u32;
        return (scaled, MAX_POSTER_HEIGHT);
    }
    (width, height)
}

/// Guess a MIME type from an explicit content type or the file extension.
pub fn mime_for(file_name: &str, content_type: Option<&str>) -> String {
    if let Some(ct) = content_type.filter(|ct| !ct.is_empty() && *ct != "application/octet-stream") {
        return ct.to_string();
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Embed raw bytes as a base64 `data:` URL.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Decode a poster image, shrink it to the poster bounds when needed and
/// embed it as a data URL.
///
/// PNG and JPEG keep their format; anything else is re-encoded as PNG.
pub fn poster_data_url(bytes: &[u8], mime: &str) -> Result<String, CoreError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Unreadable poster image: {e}")))?;

    let (width, height) = img.dimensions();
    let (target_w, target_h) = fit_within(width, height);
    if (target_w, target_h) == (width, height) {
        return Ok(to_data_url(bytes, mime));
    }

    let resized = img.resize_exact(target_w, target_h, image::imageops::FilterType::Triangle);
    let (format, out_mime) = match mime {
        "image/jpeg" => (ImageFormat::Jpeg, "image/jpeg"),
        _ => (ImageFormat::Png, "image/png"),
    };
    let resized = if format == ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(resized.to_rgb8())
    } else {
        resized
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(|e| CoreError::Internal(format!("Failed to encode resized poster: {e}")))?;

    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = target_w,
        to_height = target_h,
        "Resized uploaded poster",
    );

    Ok(to_data_url(out.get_ref(), out_mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(fit_within(2400, 1000), (1200, 500));
    }

    #[test]
    fn portrait_is_bounded_by_height() {
        assert_eq!(fit_within(1000, 3000), (500, 1500));
    }

    #[test]
    fn square_uses_height_bound() {
        assert_eq!(fit_within(3000, 3000), (1500, 1500));
    }

    #[test]
    fn small_images_are_untouched() {
        assert_eq!(fit_within(600, 900), (600, 900));
        assert_eq!(fit_within(1200, 400), (1200, 400));
    }

    #[test]
    fn mime_prefers_explicit_content_type() {
        assert_eq!(mime_for("x.png", Some("image/webp")), "image/webp");
        assert_eq!(mime_for("x.JPG", None), "image/jpeg");
        assert_eq!(mime_for("x.png", Some("application/octet-stream")), "image/png");
        assert_eq!(mime_for("noext", None), "application/octet-stream");
    }

    #[test]
    fn data_url_has_mime_prefix() {
        assert_eq!(to_data_url(b"hi", "text/plain"), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn small_poster_is_embedded_verbatim() {
        let bytes = png_bytes(4, 6);
        let url = poster_data_url(&bytes, "image/png").unwrap();
        assert_eq!(url, to_data_url(&bytes, "image/png"));
    }

    #[test]
    fn oversized_poster_is_shrunk() {
        let bytes = png_bytes(10, 1600);
        let url = poster_data_url(&bytes, "image/png").unwrap();

        let encoded = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        let img = image::load_from_memory(&decoded).unwrap();
        assert_eq!(img.dimensions(), (9, 1500));
    }

    #[test]
    fn garbage_bytes_are_a_validation_error() {
        let err = poster_data_url(b"not an image", "image/png").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
