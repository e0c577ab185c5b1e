use crate::error::Result;
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Cursor, str::FromStr};

pub const TILE_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Png => "png",
            Format::Jpg => "jpg",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Format::Png),
            "jpg" | "jpeg" => Ok(Format::Jpg),
            other => Err(format!("unknown tile format {other}")),
        }
    }
}

pub fn blank(size: u32) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]))
}

pub fn encode(image: &RgbaImage, format: Format) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());

    match format {
        Format::Png => image.write_to(&mut out, ImageFormat::Png)?,
        // JPEG has no alpha channel
        Format::Jpg => DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .write_to(&mut out, ImageFormat::Jpeg)?,
    }

    Ok(out.into_inner())
}

pub fn decode(data: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(data)?.to_rgba8())
}

/// Pastes up to four children onto a transparent canvas of twice the tile
/// size. Children are ordered `(2c, 2r), (2c+1, 2r), (2c, 2r+1), (2c+1, 2r+1)`;
/// rows count from the south, so row `2r` lands in the lower half.
pub fn composite(children: &[Option<RgbaImage>; 4], tile_size: u32) -> RgbaImage {
    let mut canvas = blank(tile_size * 2);

    for (i, child) in children.iter().enumerate() {
        let Some(child) = child else {
            continue;
        };

        let dx = (i % 2) as u32;
        let dy = (i / 2) as u32;

        imageops::replace(
            &mut canvas,
            child,
            (dx * tile_size) as i64,
            ((1 - dy) * tile_size) as i64,
        );
    }

    canvas
}

/// 2x2 box filter.
pub fn downsample_half(image: &RgbaImage) -> RgbaImage {
    let (width, height) = (image.width() / 2, image.height() / 2);

    RgbaImage::from_fn(width, height, |x, y| {
        let mut sum = [0u32; 4];

        for (sx, sy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let p = image.get_pixel(x * 2 + sx, y * 2 + sy);

            for (acc, v) in sum.iter_mut().zip(p.0) {
                *acc += v as u32;
            }
        }

        Rgba(sum.map(|s| ((s + 2) / 4) as u8))
    })
}
