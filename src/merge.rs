use crate::{
    error::{Error, Result},
    schema::EMPTY_IMAGE_ID,
    store::TileStore,
};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands directories into the `*.mbtiles` files they contain, sorted by
/// name. Plain paths are kept as given.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());

            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::File {
                path: path.clone(),
                reason: e.to_string(),
            })?;

            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "mbtiles")
            {
                sources.push(entry.into_path());
            }
        }
    }

    Ok(sources)
}

/// Copies the tiles of every source into `target`, creating it with the
/// metadata and empty tile of the first source if it does not exist.
/// Returns the number of tiles copied.
pub fn merge(target: &Path, sources: &[PathBuf]) -> Result<u64> {
    let store = if target.exists() {
        TileStore::open(target)?
    } else {
        let first = sources
            .first()
            .ok_or_else(|| Error::NotFound("stores to merge".into()))?;

        create_like(target, first)?
    };

    let mut merged = 0;

    for source in sources {
        // validates the source before attaching it
        drop(TileStore::open(source)?);

        log::info!("Merging {} into {}", source.display(), target.display());

        let conn = store.conn();

        conn.execute("ATTACH DATABASE ?1 AS source", [source.to_string_lossy().into_owned()])?;

        let result = copy_tiles(conn);

        conn.execute("DETACH DATABASE source", ())?;

        merged += result?;
    }

    Ok(merged)
}

fn create_like(target: &Path, template: &Path) -> Result<TileStore> {
    drop(TileStore::open(template)?);

    let store = TileStore::create_bare(target)?;

    let conn = store.conn();

    conn.execute("ATTACH DATABASE ?1 AS template", [template.to_string_lossy().into_owned()])?;

    let result = conn
        .execute(
            "INSERT OR REPLACE INTO main.metadata (name, value)
              SELECT name, value FROM template.metadata",
            (),
        )
        .and_then(|_| {
            conn.execute(
                "INSERT OR IGNORE INTO main.images (tile_id, tile_data)
                  SELECT tile_id, tile_data FROM template.images WHERE tile_id = ?1",
                [EMPTY_IMAGE_ID],
            )
        });

    conn.execute("DETACH DATABASE template", ())?;

    result?;

    Ok(store)
}

fn copy_tiles(conn: &Connection) -> Result<u64> {
    let clash: Option<(u8, u32, u32)> = conn
        .query_row(
            "SELECT s.zoom_level, s.tile_column, s.tile_row
              FROM source.map s JOIN main.map d
                ON d.zoom_level = s.zoom_level
                  AND d.tile_column = s.tile_column
                  AND d.tile_row = s.tile_row
              LIMIT 1",
            (),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    if let Some((zoom, column, row)) = clash {
        return Err(Error::Conflict { zoom, column, row });
    }

    let image_clash: Option<i64> = conn
        .query_row(
            "SELECT s.tile_id FROM source.images s
              JOIN main.images d ON d.tile_id = s.tile_id
              WHERE s.tile_id != ?1
              LIMIT 1",
            [EMPTY_IMAGE_ID],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = image_clash {
        return Err(Error::ImageConflict(id));
    }

    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO main.images (tile_id, tile_data)
          SELECT tile_id, tile_data FROM source.images WHERE tile_id != ?1",
        [EMPTY_IMAGE_ID],
    )?;

    let count = tx.execute(
        "INSERT INTO main.map (zoom_level, tile_column, tile_row, tile_id)
          SELECT zoom_level, tile_column, tile_row, tile_id FROM source.map",
        (),
    )?;

    tx.commit()?;

    Ok(count as u64)
}
