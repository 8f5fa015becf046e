//! Colors and the policy that assigns them to regions of interest.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{Result, RoisliceError};


/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// The neutral grey used for the combined ROI outline and as the default region color.
    pub const GREY: Color = Color::rgb(115, 115, 115);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// The color as an [`image::Rgba`] pixel with the given opacity in `[0, 1]`.
    pub fn to_rgba(&self, alpha: f64) -> Rgba<u8> {
        let a = (alpha.max(0.0).min(1.0) * 255.0).round() as u8;
        Rgba([self.r, self.g, self.b, a])
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::GREY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses `#rrggbb`, `#rgb` or one of a few color names, case-insensitive.
impl FromStr for Color {
    type Err = RoisliceError;

    fn from_str(s: &str) -> Result<Color> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| RoisliceError::InvalidInput(format!("invalid hex color '#{}'", hex)));
        }
        let color = match s.as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "grey" | "gray" | "greys" | "grays" => Color::GREY,
            "red" => Color::rgb(214, 39, 40),
            "green" => Color::rgb(44, 160, 44),
            "blue" => Color::rgb(31, 119, 180),
            "orange" => Color::rgb(255, 127, 14),
            "purple" => Color::rgb(148, 103, 189),
            "yellow" => Color::rgb(255, 215, 0),
            "cyan" => Color::rgb(23, 190, 207),
            "magenta" => Color::rgb(227, 119, 194),
            _ => return Err(RoisliceError::InvalidInput(format!("unknown color name '{}'", s))),
        };
        Ok(color)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let (r, g, b) = (channel(&hex[0..1])?, channel(&hex[1..2])?, channel(&hex[2..3])?);
            Some(Color::rgb(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}


/// How colors are assigned to regions.
///
/// A caller-supplied sequence is only used position by position if it holds exactly one color per region.
/// Any other length falls back to painting every region in the first supplied color.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    Uniform(Color),
    PerRegion(Vec<Color>),
}

impl Palette {

    /// Choose the palette for `num_regions` regions from the caller's colors.
    ///
    /// # Examples
    ///
    /// ```
    /// use roislice::{Color, Palette};
    /// let red = Color::rgb(255, 0, 0);
    /// let blue = Color::rgb(0, 0, 255);
    /// assert_eq!(Palette::resolve(&[red, blue], 3).unwrap(), Palette::Uniform(red));
    /// assert_eq!(Palette::resolve(&[red, blue], 2).unwrap(), Palette::PerRegion(vec![red, blue]));
    /// ```
    pub fn resolve(colors: &[Color], num_regions: usize) -> Result<Palette> {
        match colors {
            [] => Err(RoisliceError::InvalidInput(String::from("at least one color is required"))),
            _ if colors.len() == num_regions => Ok(Palette::PerRegion(colors.to_vec())),
            [first, ..] => {
                if colors.len() > 1 {
                    log::warn!("Got {} colors for {} regions, using {} for all regions.", colors.len(), num_regions, first);
                }
                Ok(Palette::Uniform(*first))
            }
        }
    }

    /// The color of the region at `index`.
    ///
    /// # Panics
    ///
    /// If the palette is [`Palette::PerRegion`] and `index` is out of range.
    pub fn color_for(&self, index: usize) -> Color {
        match self {
            Palette::Uniform(color) => *color,
            Palette::PerRegion(colors) => colors[index],
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn colors_are_parsed_from_hex_and_names() {
        assert_eq!(Color::rgb(255, 0, 16), "#ff0010".parse::<Color>().unwrap());
        assert_eq!(Color::rgb(255, 255, 0), "#ff0".parse::<Color>().unwrap());
        assert_eq!(Color::GREY, "Greys".parse::<Color>().unwrap());
        assert_eq!(Color::BLACK, " black ".parse::<Color>().unwrap());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn colors_display_as_hex() {
        assert_eq!("#1f77b4", Color::rgb(31, 119, 180).to_string());
    }

    #[test]
    fn matching_color_count_is_used_per_region() {
        let colors = vec![Color::BLACK, Color::WHITE, Color::GREY];
        let palette = Palette::resolve(&colors, 3).unwrap();

        for (idx, color) in colors.iter().enumerate() {
            assert_eq!(*color, palette.color_for(idx));
        }
    }

    #[test]
    fn mismatched_color_count_broadcasts_the_first_color() {
        let palette = Palette::resolve(&[Color::WHITE, Color::BLACK], 5).unwrap();

        assert_eq!(Palette::Uniform(Color::WHITE), palette);
        for idx in 0..5 {
            assert_eq!(Color::WHITE, palette.color_for(idx));
        }
    }

    #[test]
    fn an_empty_color_list_is_rejected() {
        assert!(Palette::resolve(&[], 2).is_err());
    }

    #[test]
    fn alpha_is_clamped_into_the_pixel() {
        assert_eq!(Rgba([0, 0, 0, 255]), Color::BLACK.to_rgba(1.7));
        assert_eq!(Rgba([0, 0, 0, 128]), Color::BLACK.to_rgba(0.5));
        assert_eq!(Rgba([0, 0, 0, 0]), Color::BLACK.to_rgba(-1.0));
    }
}
