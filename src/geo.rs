use crate::error::{Error, Result};
use proj4rs::{proj::Proj, transform::transform};

const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn parse(srs: &str) -> Result<Proj> {
    Proj::from_proj_string(srs).map_err(|e| Error::Projection(format!("{srs}: {e:?}")))
}

/// Proj4 definition of an EPSG code.
pub fn proj4_for_epsg(code: u16) -> Result<String> {
    crs_definitions::from_code(code)
        .map(|def| def.proj4.trim().to_string())
        .ok_or_else(|| Error::UnsupportedFormat(format!("unknown EPSG:{code}")))
}

fn project(from: &Proj, to: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    // proj4rs works in radians for geographic systems
    let mut point = if from.is_latlong() {
        (x.to_radians(), y.to_radians(), 0.0)
    } else {
        (x, y, 0.0)
    };

    transform(from, to, &mut point).map_err(|e| Error::Projection(format!("{e:?}")))?;

    Ok(if to.is_latlong() {
        (point.0.to_degrees(), point.1.to_degrees())
    } else {
        (point.0, point.1)
    })
}

/// Source projection to `(lon, lat)` degrees.
pub fn to_wgs84(srs: &str, x: f64, y: f64) -> Result<(f64, f64)> {
    project(&parse(srs)?, &parse(WGS84)?, x, y)
}

pub fn from_wgs84(srs: &str, lon: f64, lat: f64) -> Result<(f64, f64)> {
    project(&parse(WGS84)?, &parse(srs)?, lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MERCATOR;

    #[test]
    fn mercator_round_trip() {
        let (lon, lat) = to_wgs84(MERCATOR, 1_000_000.0, 2_000_000.0).unwrap();

        assert!(lon > 8.9 && lon < 9.0, "{lon}");

        let (x, y) = from_wgs84(MERCATOR, lon, lat).unwrap();

        assert!((x - 1_000_000.0).abs() < 1e-3);
        assert!((y - 2_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn geographic_is_identity_in_degrees() {
        let (lon, lat) = to_wgs84(WGS84, 17.1, 48.15).unwrap();

        assert!((lon - 17.1).abs() < 1e-9);
        assert!((lat - 48.15).abs() < 1e-9);
    }

    #[test]
    fn resolves_epsg_codes() {
        assert!(proj4_for_epsg(3857).unwrap().contains("+proj=merc"));
        assert!(proj4_for_epsg(1).is_err());
    }
}
