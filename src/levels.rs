use crate::{
    error::{Error, Result},
    pyramid::{self, BuildStats},
    raster::RasterSource,
    schema::{create_map_index, drop_map_index, EMPTY_IMAGE_ID},
    store::TileStore,
};

/// Makes `max_zoom` the finest level of `store`, keeping the native
/// resolution: adding levels inserts coarser levels below the existing
/// ones, dropping levels removes the coarsest ones.
pub fn set_levels(
    store: &mut TileStore,
    max_zoom: u8,
    source: Option<&dyn RasterSource>,
) -> Result<BuildStats> {
    let current = store
        .max_zoom()?
        .ok_or_else(|| Error::NotFound("tiles to re-level".into()))?;

    let diff = max_zoom as i32 - current as i32;

    if diff == 0 {
        log::info!("Store already has {} levels", max_zoom as u32 + 1);

        return Ok(BuildStats::default());
    }

    let tx = store.conn_mut().transaction()?;

    if diff < 0 {
        log::info!("Dropping {} levels", -diff);

        tx.execute(
            "DELETE FROM images WHERE tile_id != ?1
              AND tile_id IN (SELECT tile_id FROM map WHERE zoom_level < ?2)",
            (EMPTY_IMAGE_ID, -diff),
        )?;

        tx.execute("DELETE FROM map WHERE zoom_level < ?1", [-diff])?;
    } else {
        log::info!("Adding {diff} levels");
    }

    drop_map_index(&tx)?;

    tx.execute("UPDATE map SET zoom_level = zoom_level + ?1", [diff])?;

    create_map_index(&tx)?;

    tx.execute(
        "INSERT OR REPLACE INTO metadata (name, value) VALUES ('maxzoom', ?1)",
        [max_zoom],
    )?;

    tx.commit()?;

    if diff > 0 {
        // the old pyramid is complete, so only the new coarse levels get built
        pyramid::build(store, source, max_zoom, None)
    } else {
        Ok(BuildStats::default())
    }
}
