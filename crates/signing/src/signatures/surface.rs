use base64::{engine::general_purpose::STANDARD, Engine as _};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::errors::Error;

use super::StrokePoint;

/// Ink color (#1a1a2e)
pub const INK_RGBA: [u8; 4] = [0x1a, 0x1a, 0x2e, 0xff];

/// Stroke width in surface pixels
pub const INK_WIDTH: f32 = 2.0;

/// Largest width or height a surface may be mounted with
pub const DEFAULT_MAX_SURFACE_PX: u32 = 4096;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Pixel-addressable drawing surface holding the rendered signature.
///
/// Segments are painted as they arrive; no vector model is retained, so the
/// only way to remove ink is [`RasterSurface::clear`].
#[derive(Clone, Debug)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Mount a surface sized to the displayed layout size.
    ///
    /// Layout sizes are rounded to whole pixels. Zero, non-finite or oversize
    /// dimensions leave the host without a usable surface.
    pub fn mount(width: f32, height: f32, max_px: u32) -> Result<Self, Error> {
        let width = layout_to_pixels(width, max_px)?;
        let height = layout_to_pixels(height, max_px)?;

        let pixmap = Pixmap::new(width, height).ok_or_else(|| Error::UnsupportedEnvironment {
            reason: format!("cannot allocate {}x{} surface", width, height),
        })?;

        Ok(Self { pixmap })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Paint one segment with round caps and joins.
    pub fn paint_segment(&mut self, from: StrokePoint, to: StrokePoint) {
        let paint = ink();

        // Zero-length segments would be dropped by the stroker; draw the cap
        // as a dot instead, like a canvas does for a tap.
        if from == to {
            if let Some(dot) = PathBuilder::from_circle(from.x, from.y, INK_WIDTH / 2.0) {
                self.pixmap
                    .fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(from.x, from.y);
        builder.line_to(to.x, to.y);
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: INK_WIDTH,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|pixel| pixel.alpha() == 0)
    }

    /// Alpha of the pixel at surface-local `(x, y)`, if inside the surface.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|pixel| pixel.alpha())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, Error> {
        self.pixmap.encode_png().map_err(|e| Error::Encoding {
            message: e.to_string(),
        })
    }

    /// Self-describing PNG data URI of the current surface.
    pub fn to_data_uri(&self) -> Result<String, Error> {
        let png = self.encode_png()?;
        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)))
    }
}

/// Decode a data URI produced by [`RasterSurface::to_data_uri`] back into PNG bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, Error> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| Error::validation("signature is not a PNG data URI"))?;

    STANDARD.decode(encoded).map_err(|e| Error::Encoding {
        message: e.to_string(),
    })
}

fn ink() -> Paint<'static> {
    let [r, g, b, a] = INK_RGBA;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn layout_to_pixels(size: f32, max_px: u32) -> Result<u32, Error> {
    if !size.is_finite() {
        return Err(Error::UnsupportedEnvironment {
            reason: format!("surface dimension {} is not finite", size),
        });
    }

    let pixels = size.round();
    if pixels < 1.0 || pixels > max_px as f32 {
        return Err(Error::UnsupportedEnvironment {
            reason: format!("surface dimension {} outside 1..={}", size, max_px),
        });
    }

    Ok(pixels as u32)
}
