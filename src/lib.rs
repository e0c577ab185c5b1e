//! Builds MBTiles tile pyramids from a single georeferenced raster.
//!
//! The finest level is cut from the raster, every coarser level is
//! composited from the level below it. Tiles are committed one by one, so an
//! interrupted build can be resumed. Fully transparent tiles all share image
//! id 0.

pub mod codec;
pub mod config;
pub mod error;
pub mod geo;
pub mod levels;
pub mod merge;
pub mod metadata;
pub mod pyramid;
pub mod raster;
pub mod schema;
pub mod store;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
