use crate::{
    error::{Error, Result},
    geo,
};
use image::{imageops, RgbaImage};
use std::{fs::File, io::BufReader, path::Path};
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    tags::Tag,
    ColorType,
};

const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Georeferenced footprint of a raster in its own projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
    pub resolution: f64,
    pub srs: String,
}

impl Extent {
    /// `west,south,east,north` in degrees.
    pub fn geographic_bounds(&self) -> Result<[f64; 4]> {
        let (west, south) = geo::to_wgs84(&self.srs, self.left, self.bottom)?;
        let (east, north) = geo::to_wgs84(&self.srs, self.right, self.top)?;

        Ok([west, south, east, north])
    }

    /// Inverse of [`Extent::geographic_bounds`]; pixel dimensions are rounded.
    pub fn from_geographic_bounds(bounds: [f64; 4], srs: &str, resolution: f64) -> Result<Self> {
        let [west, south, east, north] = bounds;

        let (left, bottom) = geo::from_wgs84(srs, west, south)?;
        let (right, top) = geo::from_wgs84(srs, east, north)?;

        Ok(Extent {
            left,
            bottom,
            right,
            top,
            width: ((right - left) / resolution).round() as u32,
            height: ((top - bottom) / resolution).round() as u32,
            resolution,
            srs: srs.to_string(),
        })
    }
}

pub enum Region {
    Empty,
    Pixels(RgbaImage),
}

pub trait RasterSource {
    fn extent(&self) -> &Extent;

    /// Reads an in-bounds pixel rectangle, origin at the top-left corner.
    fn read_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region>;
}

/// Fully decoded raster held in memory.
pub struct ImageRaster {
    image: RgbaImage,
    extent: Extent,
    has_alpha: bool,
}

impl ImageRaster {
    pub fn new(image: RgbaImage, extent: Extent, has_alpha: bool) -> Result<Self> {
        if image.dimensions() != (extent.width, extent.height) {
            return Err(Error::UnsupportedFormat(format!(
                "raster is {}x{} but extent says {}x{}",
                image.width(),
                image.height(),
                extent.width,
                extent.height
            )));
        }

        Ok(Self {
            image,
            extent,
            has_alpha,
        })
    }
}

impl RasterSource for ImageRaster {
    fn extent(&self) -> &Extent {
        &self.extent
    }

    fn read_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region> {
        if x + width > self.extent.width || y + height > self.extent.height {
            return Err(Error::UnsupportedFormat(format!(
                "region {x},{y} {width}x{height} exceeds raster bounds"
            )));
        }

        log::info!("Reading raster x:{x} y:{y} {width}x{height}");

        let region = imageops::crop_imm(&self.image, x, y, width, height).to_image();

        let empty = region.pixels().all(|p| {
            if self.has_alpha {
                p[3] == 0
            } else {
                p[0] == 0 && p[1] == 0 && p[2] == 0
            }
        });

        Ok(if empty {
            Region::Empty
        } else {
            Region::Pixels(region)
        })
    }
}

fn file_error(path: &Path, reason: impl ToString) -> Error {
    Error::File {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// EPSG code from a raw GeoKeyDirectory, projected CRS preferred.
pub fn epsg_from_geo_keys(directory: &[u16]) -> Option<u16> {
    let keys: Vec<&[u16]> = directory.get(4..)?.chunks_exact(4).collect();

    let find = |id| {
        keys.iter()
            .find(|key| key[0] == id && key[1] == 0 && key[2] == 1)
            .map(|key| key[3])
    };

    find(PROJECTED_CS_TYPE_KEY).or_else(|| find(GEOGRAPHIC_TYPE_KEY))
}

/// Pixel dimensions of a TIFF without decoding it.
pub fn dimensions(path: &Path) -> Result<(u32, u32)> {
    let file = File::open(path).map_err(|e| file_error(path, e))?;

    Decoder::new(BufReader::new(file))
        .and_then(|mut decoder| decoder.dimensions())
        .map_err(|e| file_error(path, e))
}

/// Opens an 8-bit RGB or RGBA GeoTIFF. `srs` overrides the projection
/// found in the GeoKey directory.
pub fn open_geotiff(path: &Path, srs: Option<&str>) -> Result<ImageRaster> {
    let file = File::open(path).map_err(|e| file_error(path, e))?;

    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| file_error(path, e))?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions().map_err(|e| file_error(path, e))?;

    let has_alpha = match decoder.colortype().map_err(|e| file_error(path, e))? {
        ColorType::RGB(8) => false,
        ColorType::RGBA(8) => true,
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "{other:?}, only 8-bit RGB or RGBA rasters are supported"
            )))
        }
    };

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::UnsupportedFormat("missing ModelPixelScale".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::UnsupportedFormat("missing ModelTiepoint".into()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::UnsupportedFormat("malformed georeferencing".into()));
    }

    if scale[0] != scale[1] {
        return Err(Error::UnsupportedFormat(
            "vertical resolution not same as horizontal".into(),
        ));
    }

    let srs = match srs {
        Some(srs) => srs.to_string(),
        None => {
            let directory = decoder
                .get_tag_u16_vec(Tag::GeoKeyDirectoryTag)
                .map_err(|_| Error::UnsupportedFormat("missing GeoKeyDirectory".into()))?;

            let epsg = epsg_from_geo_keys(&directory)
                .ok_or_else(|| Error::UnsupportedFormat("no EPSG code in GeoKeys".into()))?;

            geo::proj4_for_epsg(epsg)?
        }
    };

    let resolution = scale[0];
    let left = tiepoint[3] - tiepoint[0] * resolution;
    let top = tiepoint[4] + tiepoint[1] * resolution;

    let extent = Extent {
        left,
        bottom: top - height as f64 * resolution,
        right: left + width as f64 * resolution,
        top,
        width,
        height,
        resolution,
        srs,
    };

    let DecodingResult::U8(data) = decoder.read_image().map_err(|e| file_error(path, e))? else {
        return Err(Error::UnsupportedFormat("samples are not 8-bit".into()));
    };

    let rgba = if has_alpha {
        data
    } else {
        data.chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect()
    };

    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::UnsupportedFormat("truncated raster data".into()))?;

    ImageRaster::new(image, extent, has_alpha)
}
