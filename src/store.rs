use crate::{
    codec::{self, Format, TILE_SIZE},
    error::{is_constraint_violation, Error, Result},
    metadata::{self, Metadata},
    pyramid::{TileCoord, TileRange},
    raster::Extent,
    schema::{create_schema, has_schema, EMPTY_IMAGE_ID},
};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// An MBTiles database with the `images`/`map` split, where image 0 is
/// the shared fully transparent tile.
pub struct TileStore {
    conn: Connection,
}

fn schema_error(e: rusqlite::Error) -> Error {
    Error::Schema(e.to_string())
}

impl TileStore {
    /// Creates the schema, the empty tile and the metadata. Safe to call on
    /// an existing store: the empty tile is never inserted twice.
    pub fn create(path: &Path, metadata: &Metadata) -> Result<Self> {
        let conn = Connection::open(path).map_err(schema_error)?;

        Self::init(conn, metadata)
    }

    /// Schema only, no metadata and no empty tile; for stores that take
    /// both from another store.
    pub(crate) fn create_bare(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(schema_error)?;

        conn.pragma_update(None, "synchronous", "OFF")
            .map_err(schema_error)?;

        create_schema(&conn).map_err(schema_error)?;

        Ok(TileStore { conn })
    }

    pub fn create_in_memory(metadata: &Metadata) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, metadata)
    }

    fn init(conn: Connection, metadata: &Metadata) -> Result<Self> {
        // each tile is still its own transaction; OFF only risks OS crashes
        conn.pragma_update(None, "synchronous", "OFF")
            .map_err(schema_error)?;

        create_schema(&conn).map_err(schema_error)?;

        let empty = codec::encode(&codec::blank(TILE_SIZE), metadata.format)?;

        conn.execute(
            "INSERT OR IGNORE INTO images (tile_id, tile_data) VALUES (?1, ?2)",
            (EMPTY_IMAGE_ID, empty),
        )?;

        let store = TileStore { conn };

        for (name, value) in metadata.rows() {
            store.write_metadata(name, &value)?;
        }

        Ok(store)
    }

    /// Opens an existing store for reading and writing.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::File {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !has_schema(&conn).map_err(schema_error)? {
            return Err(Error::Schema(format!(
                "{} lacks metadata, images or map table",
                path.display()
            )));
        }

        conn.pragma_update(None, "synchronous", "OFF")?;

        Ok(TileStore { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn read_metadata(&self, key: &str) -> Result<String> {
        self.conn
            .query_row("SELECT value FROM metadata WHERE name = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("metadata key {key}")))
    }

    pub fn write_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
            (key, value),
        )?;

        Ok(())
    }

    pub fn format(&self) -> Result<Format> {
        let value = self.read_metadata("format")?;

        metadata::parse_value("format", &value)
    }

    /// Base level extent as recorded at creation time.
    pub fn extent(&self) -> Result<Extent> {
        let srs = self.read_metadata("srs")?;
        let resolution = metadata::parse_value("resolution", &self.read_metadata("resolution")?)?;
        let bounds = metadata::parse_bounds(&self.read_metadata("bounds")?)?;

        Extent::from_geographic_bounds(bounds, &srs, resolution)
    }

    pub fn tile_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM map", (), |row| row.get(0))?;

        Ok(count as u64)
    }

    /// Number of stored tiles of `zoom` within `range`.
    pub fn count_in_range(&self, zoom: u8, range: &TileRange) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM map
              WHERE zoom_level = ?1
                AND tile_column >= ?2 AND tile_column < ?3
                AND tile_row >= ?4 AND tile_row < ?5",
            (zoom, range.left, range.right, range.bottom, range.top),
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    pub fn tile_exists(&self, coord: TileCoord) -> Result<bool> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM map WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                (coord.zoom, coord.column, coord.row),
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    pub fn max_zoom(&self) -> Result<Option<u8>> {
        Ok(self
            .conn
            .query_row("SELECT MAX(zoom_level) FROM map", (), |row| row.get(0))?)
    }

    /// Stores one tile and commits. Without `data` the tile points at the
    /// empty image and `image_id` is ignored.
    pub fn insert_tile(&mut self, image_id: i64, coord: TileCoord, data: Option<&[u8]>) -> Result<()> {
        let tx = self.conn.transaction()?;

        let tile_id = match data {
            Some(data) => {
                debug_assert_ne!(image_id, EMPTY_IMAGE_ID);

                tx.execute(
                    "INSERT INTO images (tile_id, tile_data) VALUES (?1, ?2)",
                    (image_id, data),
                )
                .map_err(|e| {
                    if is_constraint_violation(&e) {
                        Error::ImageConflict(image_id)
                    } else {
                        e.into()
                    }
                })?;

                image_id
            }
            None => EMPTY_IMAGE_ID,
        };

        tx.execute(
            "INSERT INTO map (zoom_level, tile_column, tile_row, tile_id) VALUES (?1, ?2, ?3, ?4)",
            (coord.zoom, coord.column, coord.row, tile_id),
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::Conflict {
                    zoom: coord.zoom,
                    column: coord.column,
                    row: coord.row,
                }
            } else {
                e.into()
            }
        })?;

        tx.commit()?;

        Ok(())
    }

    /// The four non-empty children of a `zoom` tile, taken from `zoom + 1`,
    /// in the order `(2c, 2r), (2c+1, 2r), (2c, 2r+1), (2c+1, 2r+1)`.
    pub fn read_quadrant(&self, coord: TileCoord) -> Result<[Option<Vec<u8>>; 4]> {
        let (x, y) = (coord.column * 2, coord.row * 2);

        let mut stmt = self.conn.prepare_cached(
            "SELECT map.tile_column, map.tile_row, images.tile_data
              FROM map JOIN images ON images.tile_id = map.tile_id
              WHERE map.zoom_level = ?1 AND map.tile_id != ?2
                AND map.tile_column IN (?3, ?4) AND map.tile_row IN (?5, ?6)",
        )?;

        let rows = stmt.query_map(
            (coord.zoom + 1, EMPTY_IMAGE_ID, x, x + 1, y, y + 1),
            |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?, row.get::<_, Vec<u8>>(2)?)),
        )?;

        let mut quadrant = [None, None, None, None];

        for row in rows {
            let (column, row, data) = row?;

            log::info!("Reading tile {}/{column}/{row}", coord.zoom + 1);

            quadrant[((column - x) + (row - y) * 2) as usize] = Some(data);
        }

        Ok(quadrant)
    }

    /// Image id referenced by a tile.
    pub fn image_id(&self, coord: TileCoord) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT tile_id FROM map WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                (coord.zoom, coord.column, coord.row),
                |row| row.get(0),
            )
            .optional()?)
    }

    /// All `map` rows ordered by coordinate.
    pub fn tile_ids(&self) -> Result<Vec<(TileCoord, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT zoom_level, tile_column, tile_row, tile_id FROM map
              ORDER BY zoom_level, tile_row, tile_column",
        )?;

        let rows = stmt.query_map((), |row| {
            Ok((
                TileCoord::new(row.get(0)?, row.get(1)?, row.get(2)?),
                row.get(3)?,
            ))
        })?;

        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Contents of the `tiles` view ordered by coordinate.
    pub fn read_tiles(&self) -> Result<Vec<(TileCoord, Vec<u8>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT zoom_level, tile_column, tile_row, tile_data FROM tiles
              ORDER BY zoom_level, tile_row, tile_column",
        )?;

        let rows = stmt.query_map((), |row| {
            Ok((
                TileCoord::new(row.get(0)?, row.get(1)?, row.get(2)?),
                row.get(3)?,
            ))
        })?;

        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    pub fn image_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", (), |row| row.get(0))?;

        Ok(count as u64)
    }

    /// Writes a compacted copy of the store to `path`.
    pub fn save_as(&self, path: &Path) -> Result<()> {
        self.conn
            .execute("VACUUM INTO ?1", [path.to_string_lossy().into_owned()])?;

        Ok(())
    }
}
