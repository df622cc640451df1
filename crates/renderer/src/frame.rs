//! Rendered frames.

use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::png::create_png_auto;

/// One rendered image: straight (non-premultiplied) RGBA8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Copy a tiny-skia pixmap out, undoing its premultiplied alpha.
    pub fn from_pixmap(pixmap: &tiny_skia::Pixmap) -> Self {
        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self::new(pixmap.width(), pixmap.height(), pixels)
    }

    /// RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        create_png_auto(&self.pixels, self.width as usize, self.height as usize)
            .map_err(RenderError::PngEncode)
    }

    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        let png = self.encode_png()?;
        std::fs::write(path, &png)?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote PNG");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixmap_demultiplies() {
        let mut pixmap = tiny_skia::Pixmap::new(2, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 255));
        let frame = Frame::from_pixmap(&pixmap);
        assert_eq!(frame.pixel(1, 0), [200, 100, 50, 255]);
        assert_eq!(frame.pixels.len(), 8);
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = Frame::new(1, 1, vec![1, 2, 3, 255]);
        frame.write_png(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 8);
    }
}
