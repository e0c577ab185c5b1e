use rusqlite::{Connection, Error};

pub const EMPTY_IMAGE_ID: i64 = 0;

pub fn create_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS metadata (
          name TEXT NOT NULL,
          value TEXT NOT NULL,
          UNIQUE(name)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS images (
          tile_id INTEGER NOT NULL PRIMARY KEY,
          tile_data BLOB NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS map (
          zoom_level INTEGER NOT NULL,
          tile_column INTEGER NOT NULL,
          tile_row INTEGER NOT NULL,
          tile_id INTEGER NOT NULL REFERENCES images (tile_id)
        )",
        (),
    )?;

    create_map_index(conn)?;

    conn.execute(
        "CREATE VIEW IF NOT EXISTS tiles AS
          SELECT map.zoom_level AS zoom_level,
            map.tile_column AS tile_column,
            map.tile_row AS tile_row,
            images.tile_data AS tile_data
          FROM map JOIN images ON images.tile_id = map.tile_id",
        (),
    )?;

    Ok(())
}

pub fn create_map_index(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS map_index ON map (zoom_level, tile_column, tile_row)",
        (),
    )?;

    Ok(())
}

pub fn drop_map_index(conn: &Connection) -> Result<(), Error> {
    conn.execute("DROP INDEX IF EXISTS map_index", ())?;

    Ok(())
}

/// Whether all three tables exist.
pub fn has_schema(conn: &Connection) -> Result<bool, Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master
          WHERE type = 'table' AND name IN ('metadata', 'images', 'map')",
        (),
        |row| row.get(0),
    )?;

    Ok(count == 3)
}
