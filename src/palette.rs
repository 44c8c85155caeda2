//! Face colors.

use embedded_graphics::pixelcolor::Rgb888;

pub const CORAL: Rgb888 = Rgb888::new(0xFF, 0x3B, 0x1F);
pub const YELLOW: Rgb888 = Rgb888::new(0xFF, 0xA5, 0x00);
pub const FROSTED_BLUE: Rgb888 = Rgb888::new(0x7C, 0xAA, 0xC8);
pub const DARK_GRAY: Rgb888 = Rgb888::new(0x2C, 0x2E, 0x33);

/// Background of the development canvas.
pub const BACKGROUND: Rgb888 = Rgb888::new(0xFF, 0xFF, 0xFF);
