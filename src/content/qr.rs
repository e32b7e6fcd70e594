//! QR code receipts for transaction links.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use crate::content::ContentError;

/// Pixel size of one QR module.
pub const MODULE_PIXELS: u32 = 8;
/// Modules of light border on each side (the QR standard quiet zone).
pub const QUIET_ZONE_MODULES: u32 = 4;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Render `text` as a PNG QR code.
pub fn qr_png(text: &str) -> Result<Vec<u8>, ContentError> {
    let code = QrCode::new(text.as_bytes()).map_err(|e| ContentError::QrEncoding(e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ContentError::QrEncoding(e.to_string()))?;
    Ok(png)
}

/// Render `text` as a `data:image/png;base64,...` URI.
pub fn qr_data_uri(text: &str) -> Result<String, ContentError> {
    let png = qr_png(text)?;
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)))
}
