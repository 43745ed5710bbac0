//! Screenshot functionality.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::RenderError;

use super::Window;

impl Window {
    /// Captures the last presented frame as RGBA pixels, row by row from top to bottom.
    pub async fn snap(&self) -> Result<Vec<u8>, RenderError> {
        self.canvas.read_pixels().await
    }

    /// Captures the last presented frame as an image.
    pub async fn snap_image(&self) -> Result<RgbaImage, RenderError> {
        let (width, height) = self.canvas.size();
        let pixels = self.snap().await?;
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Readback("pixel buffer size mismatch".to_string()))
    }

    /// Captures the last presented frame as PNG-encoded bytes.
    pub async fn snap_png(&self) -> Result<Vec<u8>, RenderError> {
        let (width, height) = self.canvas.size();
        encode_png(width, height, self.snap().await?)
    }
}

/// Encodes top-down RGBA pixels as a PNG file.
pub fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let img = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RenderError::Readback("pixel buffer size mismatch".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| RenderError::Readback(e.to_string()))?;
    Ok(png.into_inner())
}
