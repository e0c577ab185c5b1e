use crate::{
    codec::TILE_SIZE,
    metadata::{Metadata, MetadataOverrides},
    raster::{Extent, ImageRaster},
    store::TileStore,
};
use image::{Rgba, RgbaImage};
use std::path::Path;

pub const MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs";

/// Extent near Bratislava at 10 m per pixel.
pub fn extent(width: u32, height: u32) -> Extent {
    let (left, top) = (1_900_000.0, 6_130_000.0);
    let resolution = 10.0;

    Extent {
        left,
        bottom: top - height as f64 * resolution,
        right: left + width as f64 * resolution,
        top,
        width,
        height,
        resolution,
        srs: MERCATOR.to_string(),
    }
}

/// Opaque gradient everywhere except the tiles in `holes`, which are left
/// fully transparent. Holes are given in pixel-space tile indices
/// (origin top-left).
pub fn raster(width: u32, height: u32, holes: &[(u32, u32)]) -> ImageRaster {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if holes.contains(&(x / TILE_SIZE, y / TILE_SIZE)) {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 7) as u8 * 30, 255])
        }
    });

    ImageRaster::new(image, extent(width, height), true).unwrap()
}

pub fn new_store(path: &Path, raster: &ImageRaster, max_zoom: u8) -> TileStore {
    let metadata = Metadata::from_extent(
        crate::raster::RasterSource::extent(raster),
        &MetadataOverrides::default(),
        max_zoom,
    )
    .unwrap();

    TileStore::create(path, &metadata).unwrap()
}
