use crate::{
    codec::Format,
    error::{Error, Result},
    raster::Extent,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[default]
    Overlay,
    Baselayer,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayerType::Overlay => "overlay",
            LayerType::Baselayer => "baselayer",
        })
    }
}

/// The user-settable part of the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<LayerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub layer_type: LayerType,
    pub version: String,
    pub description: String,
    pub format: Format,
    /// west, south, east, north
    pub bounds: [f64; 4],
    pub srs: String,
    pub resolution: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Metadata {
    pub fn from_extent(extent: &Extent, overrides: &MetadataOverrides, max_zoom: u8) -> Result<Self> {
        Ok(Metadata {
            name: overrides.name.clone().unwrap_or_else(|| "untitled".into()),
            layer_type: overrides.layer_type.unwrap_or_default(),
            version: overrides.version.clone().unwrap_or_else(|| "1".into()),
            description: overrides.description.clone().unwrap_or_default(),
            format: overrides.format.unwrap_or_default(),
            bounds: extent.geographic_bounds()?,
            srs: extent.srs.clone(),
            resolution: extent.resolution,
            min_zoom: 0,
            max_zoom,
        })
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let [west, south, east, north] = self.bounds;

        vec![
            ("name", self.name.clone()),
            ("type", self.layer_type.to_string()),
            ("version", self.version.clone()),
            ("description", self.description.clone()),
            ("format", self.format.to_string()),
            ("bounds", format!("{west},{south},{east},{north}")),
            ("srs", self.srs.clone()),
            ("resolution", self.resolution.to_string()),
            ("minzoom", self.min_zoom.to_string()),
            ("maxzoom", self.max_zoom.to_string()),
        ]
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::Schema(format!("malformed metadata value for {key}: {value:?}"))
}

pub fn parse_bounds(value: &str) -> Result<[f64; 4]> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid("bounds", value))?;

    parts.try_into().map_err(|_| invalid("bounds", value))
}

pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}
