//! Slice coordinate labels such as `z=-12`, set in the bundled DejaVu Sans.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::{Result, RoisliceError};

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

fn font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(DEJAVU_SANS).map_err(|e| RoisliceError::Render(format!("bundled font: {}", e)))
}

/// Draw `text` at `size` pixels per em, starting at column `x` with its baseline on row `baseline`.
pub fn draw_label(image: &mut RgbaImage, text: &str, x: i32, baseline: i32, size: u32, ink: Rgba<u8>) -> Result<()> {
    let font = font()?;
    let scale = PxScale::from(size as f32);
    let top = baseline - font.as_scaled(scale).ascent().round() as i32;
    draw_text_mut(image, ink, x, top, scale, &font, text);
    Ok(())
}
