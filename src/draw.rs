//! Overlay drawing on RGB frames.
//!
//! Drawing goes through `embedded-graphics`, which provides primitives and a mono font
//! without pulling in a rasterizer. Pixels outside the frame are discarded, so callers may
//! draw without clipping first.

use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::raw::RawU24,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use image::{Rgb, RgbImage};

use crate::rect::Rect;

/// An RGB color used for overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color([u8; 3]);

impl Color {
    pub const GREEN: Self = Self([80, 255, 80]);
    pub const RED: Self = Self([255, 60, 60]);
    pub const YELLOW: Self = Self([255, 220, 40]);
    pub const WHITE: Self = Self([255, 255, 255]);

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl PixelColor for Color {
    type Raw = RawU24;
}

/// Draws a rectangle outline onto the image.
pub fn rect_outline(image: &mut RgbImage, rect: Rect, color: Color, stroke_width: u32) {
    let shape = Rectangle {
        top_left: Point::new(rect.x(), rect.y()),
        size: Size::new(rect.width(), rect.height()),
    };
    match shape
        .into_styled(PrimitiveStyle::with_stroke(color, stroke_width))
        .draw(&mut Target(image))
    {
        Ok(()) => {}
        Err(infallible) => match infallible {},
    }
}

/// Draws a line of text with its top-left corner at `(x, y)`.
pub fn text(image: &mut RgbImage, x: i32, y: i32, text: &str, color: Color) {
    let style = MonoTextStyle::new(&FONT_10X20, color);
    match Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
        .draw(&mut Target(image))
    {
        Ok(_) => {}
        Err(infallible) => match infallible {},
    }
}

struct Target<'a>(&'a mut RgbImage);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle {
            top_left: Point::zero(),
            size: Size::new(self.0.width(), self.0.height()),
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && (point.x as u32) < self.0.width()
                && point.y >= 0
                && (point.y as u32) < self.0.height()
            {
                self.0.put_pixel(point.x as u32, point.y as u32, Rgb(color.0));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_outline_touches_borders_only() {
        let mut image = RgbImage::new(8, 8);
        rect_outline(&mut image, Rect::from_top_left(1, 1, 6, 6), Color::GREEN, 1);

        assert_eq!(image.get_pixel(1, 1), &Rgb([80, 255, 80]));
        assert_eq!(image.get_pixel(6, 6), &Rgb([80, 255, 80]));
        assert_eq!(image.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_drawing_clips_to_frame() {
        let mut image = RgbImage::new(4, 4);
        rect_outline(&mut image, Rect::from_top_left(-10, -10, 100, 100), Color::RED, 2);
        text(&mut image, -5, -5, "overflow", Color::WHITE);
        // Reaching this point without a panic is the test; out-of-bounds pixels are dropped.
    }

    #[test]
    fn test_text_marks_pixels() {
        let mut image = RgbImage::new(64, 32);
        text(&mut image, 2, 2, "A", Color::WHITE);
        let lit = image.pixels().filter(|p| p.0 != [0, 0, 0]).count();
        assert!(lit > 0);
    }
}
