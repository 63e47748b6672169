use crate::error::GvError;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

const MIN_QR_PIXELS: u32 = 300;

/// Renders `payload` as a QR code image (medium error correction, with quiet zone).
pub(crate) fn render_qr(payload: &str) -> Result<GrayImage, GvError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(|e| GvError::Render(format!("QR encoding failed: {e}")))?;
    Ok(code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_QR_PIXELS, MIN_QR_PIXELS)
        .quiet_zone(true)
        .build())
}

pub(crate) fn encode_png(image: &GrayImage) -> Result<Vec<u8>, GvError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| GvError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_is_square_and_png_encoded() {
        let img = render_qr("Nombre: Ana Ruiz\nEvento: Foro").expect("qr");
        assert_eq!(img.width(), img.height());
        assert!(img.width() >= MIN_QR_PIXELS);

        let png = encode_png(&img).expect("png");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
