use crate::{
    error::{Error, Result},
    metadata::MetadataOverrides,
    pyramid::TileRange,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

/// Deepest supported pyramid; level sizes are computed in 64-bit pixels.
pub const MAX_LEVELS: u8 = 30;

/// A build job, as produced by the `config` command and consumed by
/// `create -c`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbtiles: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_levels: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_bounds: Option<TileRange>,
    /// Proj4 string overriding the raster's own projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: MetadataOverrides,
}

fn is_default(metadata: &MetadataOverrides) -> bool {
    *metadata == MetadataOverrides::default()
}

impl BuildConfig {
    /// Reads a config from a file, from stdin for `-`, or parses the
    /// argument itself as JSON.
    pub fn load(arg: &str) -> Result<Self> {
        let text = if arg == "-" {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        } else if Path::new(arg).is_file() {
            fs::read_to_string(arg)?
        } else {
            arg.to_string()
        };

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: BuildConfig = serde_json::from_str(text)?;

        if let Some(levels) = config.num_levels {
            check_levels(levels)?;
        }

        Ok(config)
    }
}

pub fn check_levels(max_zoom: u8) -> Result<u8> {
    if max_zoom > MAX_LEVELS {
        return Err(Error::UnsupportedFormat(format!(
            "{max_zoom} levels requested, at most {MAX_LEVELS} are supported"
        )));
    }

    Ok(max_zoom)
}
