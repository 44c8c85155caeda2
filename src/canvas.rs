//! # Development Canvas
//!
//! An in-memory RGB framebuffer that implements `embedded_graphics`'s
//! [`DrawTarget`], so draw lists can be rasterized without the watch hardware.
//! The ASCII dump is what the `--stdout` development mode prints.

use crate::draw::DrawList;
use crate::palette::{BACKGROUND, CORAL, DARK_GRAY, FROSTED_BLUE, YELLOW};
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use std::convert::Infallible;
use thiserror::Error;

/// Failures creating or presenting to a display surface.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("display surface {width}x{height} has no pixels")]
    Empty { width: u32, height: u32 },

    #[error("could not allocate a {width}x{height} display surface")]
    Allocation { width: u32, height: u32 },

    #[error("display surface rejected the frame: {0}")]
    Present(String),
}

/// Anything that can show a finished frame.
pub trait DisplaySurface {
    fn present(&mut self, frame: &DrawList) -> Result<(), SurfaceError>;
}

/// Row-major RGB framebuffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    /// Allocate a canvas filled with the background color.
    pub fn new(size: Size) -> Result<Self, SurfaceError> {
        let (width, height) = (size.width, size.height);
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty { width, height });
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(SurfaceError::Allocation { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| SurfaceError::Allocation { width, height })?;
        pixels.resize(len, BACKGROUND);

        Ok(Self { size, pixels })
    }

    pub fn fill(&mut self, color: Rgb888) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = color);
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).map(|index| self.pixels[index])
    }

    /// Number of pixels currently set to `color`.
    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|&&pixel| pixel == color).count()
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    /// Render as text, one glyph per palette color.
    ///
    /// Terminal cells are roughly twice as tall as wide, so each text row
    /// covers two pixel rows; the first non-background pixel of the pair wins.
    pub fn to_ascii(&self) -> String {
        let width = self.size.width as usize;
        let mut out = String::with_capacity((width + 1) * (self.size.height as usize / 2 + 1));

        for pair in self.pixels.chunks(width).collect::<Vec<_>>().chunks(2) {
            for x in 0..width {
                let color = pair
                    .iter()
                    .map(|row| row[x])
                    .find(|&pixel| pixel != BACKGROUND)
                    .unwrap_or(BACKGROUND);
                out.push(glyph(color));
            }
            out.push('\n');
        }
        out
    }
}

const GLYPHS: [(Rgb888, char); 5] = [
    (BACKGROUND, ' '),
    (DARK_GRAY, '#'),
    (CORAL, '*'),
    (YELLOW, 'o'),
    (FROSTED_BLUE, '~'),
];

fn glyph(color: Rgb888) -> char {
    GLYPHS
        .iter()
        .find(|(known, _)| *known == color)
        .map(|&(_, glyph)| glyph)
        .unwrap_or('.')
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Primitives may extend past the edges; clip silently
            if let Some(index) = self.index(point) {
                self.pixels[index] = color;
            }
        }
        Ok(())
    }
}

impl DisplaySurface for Canvas {
    fn present(&mut self, frame: &DrawList) -> Result<(), SurfaceError> {
        self.fill(BACKGROUND);
        match frame.paint(self) {
            Ok(()) => Ok(()),
            Err(never) => match never {},
        }
    }
}
