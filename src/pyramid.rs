use crate::{
    codec::{self, Format, TILE_SIZE},
    error::{Error, Result},
    metadata::parse_value,
    raster::{RasterSource, Region},
    schema::EMPTY_IMAGE_ID,
    store::TileStore,
};
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

/// Tile address; rows count from the south (TMS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub zoom: u8,
    pub column: u32,
    pub row: u32,
}

impl TileCoord {
    pub fn new(zoom: u8, column: u32, row: u32) -> Self {
        Self { zoom, column, row }
    }
}

/// Half-open rectangle of tiles, serialized as `[left, bottom, right, top]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct TileRange {
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
    pub top: u32,
}

impl From<[u32; 4]> for TileRange {
    fn from([left, bottom, right, top]: [u32; 4]) -> Self {
        TileRange {
            left,
            bottom,
            right,
            top,
        }
    }
}

impl From<TileRange> for [u32; 4] {
    fn from(range: TileRange) -> Self {
        [range.left, range.bottom, range.right, range.top]
    }
}

impl TileRange {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.top.saturating_sub(self.bottom)
    }

    pub fn len(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, column: u32, row: u32) -> bool {
        (self.left..self.right).contains(&column) && (self.bottom..self.top).contains(&row)
    }
}

/// Tile grid geometry of every level for a base raster of `width` x
/// `height` pixels. Level `max_zoom` is native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Pyramid {
    width: u32,
    height: u32,
    max_zoom: u8,
    sub_bounds: Option<TileRange>,
}

impl Pyramid {
    pub fn new(width: u32, height: u32, max_zoom: u8, sub_bounds: Option<TileRange>) -> Self {
        Self {
            width,
            height,
            max_zoom,
            sub_bounds,
        }
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn factor(&self, zoom: u8) -> u64 {
        1 << (self.max_zoom - zoom)
    }

    /// Grid dimensions of a level, ignoring sub-bounds.
    pub fn level_tiles(&self, zoom: u8) -> (u32, u32) {
        let span = TILE_SIZE as u64 * self.factor(zoom);

        (
            (self.width as u64).div_ceil(span) as u32,
            (self.height as u64).div_ceil(span) as u32,
        )
    }

    /// Tiles of a level inside the sub-bounds. The lower edge is floored and
    /// the upper edge ceiled so that partial parents are still covered.
    pub fn level_range(&self, zoom: u8) -> TileRange {
        let (width, height) = self.level_tiles(zoom);

        let Some(sub) = self.sub_bounds else {
            return TileRange {
                left: 0,
                bottom: 0,
                right: width,
                top: height,
            };
        };

        let f = self.factor(zoom);
        let scale_down = |v: u32, limit: u32| (v as u64 / f).min(limit as u64) as u32;
        let scale_up = |v: u32, limit: u32| (v as u64).div_ceil(f).min(limit as u64) as u32;

        TileRange {
            left: scale_down(sub.left, width),
            bottom: scale_down(sub.bottom, height),
            right: scale_up(sub.right, width),
            top: scale_up(sub.top, height),
        }
    }

    /// Finest first.
    pub fn levels(&self) -> impl Iterator<Item = u8> {
        (0..=self.max_zoom).rev()
    }

    pub fn level_coords(&self, zoom: u8) -> impl Iterator<Item = TileCoord> {
        let range = self.level_range(zoom);

        (range.bottom..range.top).flat_map(move |row| {
            (range.left..range.right).map(move |column| TileCoord::new(zoom, column, row))
        })
    }

    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.levels().flat_map(|zoom| self.level_coords(zoom))
    }

    /// Number of tiles enumerated by [`Pyramid::coords`].
    pub fn len(&self) -> u64 {
        self.levels().map(|zoom| self.level_range(zoom).len()).sum()
    }

    /// Image id of a tile: its 1-based position in the finest-first,
    /// row-major enumeration of the full grid. Independent of sub-bounds, so
    /// partial builds of the same raster never collide.
    pub fn tile_id(&self, coord: TileCoord) -> i64 {
        let finer: u64 = (coord.zoom + 1..=self.max_zoom)
            .map(|zoom| {
                let (w, h) = self.level_tiles(zoom);
                w as u64 * h as u64
            })
            .sum();

        let (width, _) = self.level_tiles(coord.zoom);

        (1 + finer + coord.column as u64 + coord.row as u64 * width as u64) as i64
    }

    /// Element `index` of [`Pyramid::coords`] without walking the sequence.
    pub fn nth(&self, mut index: u64) -> Option<TileCoord> {
        for zoom in self.levels() {
            let range = self.level_range(zoom);

            if index < range.len() {
                let width = range.width() as u64;

                return Some(TileCoord::new(
                    zoom,
                    range.left + (index % width) as u32,
                    range.bottom + (index / width) as u32,
                ));
            }

            index -= range.len();
        }

        None
    }

    /// Inverse of [`Pyramid::nth`].
    pub fn position(&self, coord: TileCoord) -> Option<u64> {
        if coord.zoom > self.max_zoom {
            return None;
        }

        let range = self.level_range(coord.zoom);

        if !range.contains(coord.column, coord.row) {
            return None;
        }

        let before: u64 = (coord.zoom + 1..=self.max_zoom)
            .map(|zoom| self.level_range(zoom).len())
            .sum();

        Some(
            before
                + (coord.row - range.bottom) as u64 * range.width() as u64
                + (coord.column - range.left) as u64,
        )
    }
}

/// Partitions the base level into chunks covering one level-0 tile each.
pub fn split(width: u32, height: u32, max_zoom: u8) -> Vec<TileRange> {
    let pyramid = Pyramid::new(width, height, max_zoom, None);
    let (columns, rows) = pyramid.level_tiles(0);
    let n = 1u32 << max_zoom;

    (0..rows)
        .flat_map(|cy| {
            (0..columns).map(move |cx| TileRange {
                left: cx * n,
                bottom: cy * n,
                right: (cx + 1) * n,
                top: (cy + 1) * n,
            })
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub created: u64,
    pub empty: u64,
    pub skipped: u64,
}

pub struct PyramidBuilder<'a> {
    store: &'a mut TileStore,
    source: Option<&'a dyn RasterSource>,
    pyramid: Pyramid,
    format: Format,
}

impl<'a> PyramidBuilder<'a> {
    pub fn new(
        store: &'a mut TileStore,
        source: Option<&'a dyn RasterSource>,
        max_zoom: u8,
        sub_bounds: Option<TileRange>,
    ) -> Result<Self> {
        let extent = store.extent()?;
        let format = store.format()?;

        let stored = parse_value::<u8>("maxzoom", &store.read_metadata("maxzoom")?)?;

        if stored != max_zoom {
            return Err(Error::LevelMismatch {
                stored,
                requested: max_zoom,
            });
        }

        if let Some(source) = source {
            let raster = source.extent();

            if (raster.width, raster.height) != (extent.width, extent.height) {
                return Err(Error::UnsupportedFormat(format!(
                    "raster is {}x{} but the store was built from {}x{}",
                    raster.width, raster.height, extent.width, extent.height
                )));
            }
        }

        Ok(Self {
            store,
            source,
            pyramid: Pyramid::new(extent.width, extent.height, max_zoom, sub_bounds),
            format,
        })
    }

    /// Generates every missing tile, finest level first, committing each one.
    pub fn run(mut self) -> Result<BuildStats> {
        let mut stats = BuildStats::default();

        let total = self.pyramid.len();

        log::info!(
            "{} tiles stored, {total} tiles in pyramid",
            self.store.tile_count()?
        );

        let mut started = false;
        let mut level_start = 0;

        for zoom in self.pyramid.levels() {
            let range = self.pyramid.level_range(zoom);
            let expected = range.len();
            let start = level_start;

            level_start += expected;

            let stored = self.store.count_in_range(zoom, &range)?;

            if stored == expected {
                stats.skipped += expected;

                continue;
            }

            let prefix = stored > 0 && self.holds_prefix(zoom, &range, start + stored, stored)?;

            if prefix {
                stats.skipped += stored;
            }

            // only levels with scattered tiles need per-tile checks
            let check_each = stored > 0 && !prefix;
            let first = if prefix { start + stored } else { start };

            for index in first..start + expected {
                let Some(coord) = self.pyramid.nth(index) else {
                    break;
                };

                if check_each && self.store.tile_exists(coord)? {
                    stats.skipped += 1;

                    continue;
                }

                if !started {
                    log::info!("Starting at tile #{}", index + 1);

                    started = true;
                }

                log::info!("At tile #{} of {total}", index + 1);

                self.create_tile(coord, &mut stats)?;
            }
        }

        if !started {
            log::info!("Pyramid already complete");
        }

        Ok(stats)
    }

    /// Whether the `stored` tiles of a level are exactly the ones preceding
    /// enumeration index `next`.
    fn holds_prefix(&self, zoom: u8, range: &TileRange, next: u64, stored: u64) -> Result<bool> {
        let Some(coord) = self.pyramid.nth(next) else {
            return Ok(false);
        };

        let full_rows = TileRange {
            top: coord.row,
            ..*range
        };

        let partial_row = TileRange {
            bottom: coord.row,
            right: coord.column,
            top: coord.row + 1,
            ..*range
        };

        Ok(self.store.count_in_range(zoom, &full_rows)?
            + self.store.count_in_range(zoom, &partial_row)?
            == stored)
    }

    fn create_tile(&mut self, coord: TileCoord, stats: &mut BuildStats) -> Result<()> {
        log::info!("Creating tile {}/{}/{}", coord.zoom, coord.column, coord.row);

        let image = if coord.zoom == self.pyramid.max_zoom {
            self.base_tile(coord)?
        } else {
            self.derived_tile(coord)?
        };

        match image {
            Some(image) => {
                let data = codec::encode(&image, self.format)?;

                self.store
                    .insert_tile(self.pyramid.tile_id(coord), coord, Some(&data))?;

                stats.created += 1;
            }
            None => {
                self.store.insert_tile(EMPTY_IMAGE_ID, coord, None)?;

                stats.empty += 1;
            }
        }

        Ok(())
    }

    /// Reads the tile's pixels from the raster, padding edge tiles with
    /// transparency.
    fn base_tile(&self, coord: TileCoord) -> Result<Option<RgbaImage>> {
        let source = self.source.ok_or(Error::MissingSource)?;

        let size = TILE_SIZE as i64;
        let (width, height) = (self.pyramid.width as i64, self.pyramid.height as i64);

        let ox = coord.column as i64 * size;
        // raster rows grow southward, tile rows northward
        let oy = height - (coord.row as i64 + 1) * size;

        let y = oy.max(0);
        let h = oy + size - y;
        let w = size.min(width - ox);

        let region = source.read_region(ox as u32, y as u32, w as u32, h as u32)?;

        let Region::Pixels(pixels) = region else {
            return Ok(None);
        };

        if w == size && h == size {
            return Ok(Some(pixels));
        }

        let mut tile = codec::blank(TILE_SIZE);

        imageops::replace(&mut tile, &pixels, 0, size - h);

        Ok(Some(tile))
    }

    /// Composites and halves the four children from the next finer level.
    fn derived_tile(&self, coord: TileCoord) -> Result<Option<RgbaImage>> {
        let quadrant = self.store.read_quadrant(coord)?;

        if quadrant.iter().all(Option::is_none) {
            return Ok(None);
        }

        let mut children = [None, None, None, None];

        for (child, data) in children.iter_mut().zip(&quadrant) {
            if let Some(data) = data {
                *child = Some(codec::decode(data)?);
            }
        }

        Ok(Some(codec::downsample_half(&codec::composite(
            &children, TILE_SIZE,
        ))))
    }
}

/// Builds or resumes the pyramid in `store`.
pub fn build(
    store: &mut TileStore,
    source: Option<&dyn RasterSource>,
    max_zoom: u8,
    sub_bounds: Option<TileRange>,
) -> Result<BuildStats> {
    PyramidBuilder::new(store, source, max_zoom, sub_bounds)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        raster::{Extent, ImageRaster},
        testutil::{new_store, raster},
    };
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Fails every read after the first `reads`.
    struct Interrupted<'a> {
        inner: &'a ImageRaster,
        reads: Cell<u32>,
    }

    impl RasterSource for Interrupted<'_> {
        fn extent(&self) -> &Extent {
            self.inner.extent()
        }

        fn read_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region> {
            if self.reads.get() == 0 {
                return Err(Error::File {
                    path: "interrupted.tif".into(),
                    reason: "read failed".into(),
                });
            }

            self.reads.set(self.reads.get() - 1);

            self.inner.read_region(x, y, width, height)
        }
    }

    #[test]
    fn level_grids_ceil_divide() {
        let pyramid = Pyramid::new(1000, 700, 2, None);

        assert_eq!(pyramid.level_tiles(2), (4, 3));
        assert_eq!(pyramid.level_tiles(1), (2, 2));
        assert_eq!(pyramid.level_tiles(0), (1, 1));
        assert_eq!(pyramid.len(), 17);
    }

    #[test]
    fn numbering_is_deterministic_and_increasing() {
        let pyramid = Pyramid::new(1000, 700, 2, None);

        let first: Vec<_> = pyramid.coords().collect();
        let second: Vec<_> = Pyramid::new(1000, 700, 2, None).coords().collect();

        assert_eq!(first, second);

        let ids: Vec<_> = first.iter().map(|c| pyramid.tile_id(*c)).collect();

        assert_eq!(ids, (1..=17).collect::<Vec<i64>>());
        assert_eq!(pyramid.tile_id(TileCoord::new(2, 3, 2)), 12);
        assert_eq!(pyramid.tile_id(TileCoord::new(1, 0, 0)), 13);
        assert_eq!(pyramid.tile_id(TileCoord::new(0, 0, 0)), 17);
    }

    #[test]
    fn nth_and_position_match_enumeration() {
        let pyramid = Pyramid::new(3000, 1700, 3, Some([3, 1, 11, 5].into()));

        for (i, coord) in pyramid.coords().enumerate() {
            assert_eq!(pyramid.nth(i as u64), Some(coord));
            assert_eq!(pyramid.position(coord), Some(i as u64));
        }

        assert_eq!(pyramid.nth(pyramid.len()), None);
        assert_eq!(pyramid.position(TileCoord::new(3, 0, 0)), None);
    }

    #[test]
    fn sub_bounds_rescale_per_level() {
        let pyramid = Pyramid::new(1000, 700, 2, Some([2, 0, 4, 3].into()));

        assert_eq!(pyramid.level_range(2), [2, 0, 4, 3].into());
        assert_eq!(pyramid.level_range(1), [1, 0, 2, 2].into());
        assert_eq!(pyramid.level_range(0), [0, 0, 1, 1].into());

        let clamped = Pyramid::new(1000, 700, 2, Some([0, 0, u32::MAX, u32::MAX].into()));

        assert_eq!(clamped.len(), 17);
    }

    #[test]
    fn ids_do_not_depend_on_sub_bounds() {
        let full = Pyramid::new(1000, 700, 2, None);
        let part = Pyramid::new(1000, 700, 2, Some([2, 0, 4, 3].into()));

        for coord in part.coords() {
            assert_eq!(part.tile_id(coord), full.tile_id(coord));
        }
    }

    #[test]
    fn split_covers_grid_with_level_zero_chunks() {
        let chunks = split(1000, 700, 1);

        assert_eq!(
            chunks,
            vec![
                [0, 0, 2, 2].into(),
                [2, 0, 4, 2].into(),
                [0, 2, 2, 4].into(),
                [2, 2, 4, 4].into()
            ]
        );

        let covered: u64 = chunks
            .iter()
            .map(|chunk| Pyramid::new(1000, 700, 1, Some(*chunk)).len())
            .sum();

        assert_eq!(covered, Pyramid::new(1000, 700, 1, None).len());
    }

    #[test]
    fn all_empty_base_gives_empty_top() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        let stats = build(&mut store, Some(&source), 1, None).unwrap();

        assert_eq!(stats.created, 0);
        assert_eq!(stats.empty, 5);
        assert_eq!(store.image_count().unwrap(), 1);
        assert_eq!(store.image_id(TileCoord::new(0, 0, 0)).unwrap(), Some(EMPTY_IMAGE_ID));
    }

    #[test]
    fn two_by_two_base_downsamples_into_one_tile() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        let stats = build(&mut store, Some(&source), 1, None).unwrap();

        assert_eq!(stats.created, 5);
        assert_eq!(store.tile_count().unwrap(), 5);
        assert_eq!(store.image_id(TileCoord::new(0, 0, 0)).unwrap(), Some(5));

        // quadtree consistency
        let children = store.read_quadrant(TileCoord::new(0, 0, 0)).unwrap();
        let decoded = children.map(|c| c.map(|data| codec::decode(&data).unwrap()));
        let expected = codec::encode(
            &codec::downsample_half(&codec::composite(&decoded, TILE_SIZE)),
            Format::Png,
        )
        .unwrap();

        let tiles = store.read_tiles().unwrap();
        let (_, top) = tiles.iter().find(|(c, _)| c.zoom == 0).unwrap();

        assert_eq!(top, &expected);

        // TMS: row 1 is the northern row, i.e. raster pixel row 0
        let (_, north_west) = tiles
            .iter()
            .find(|(c, _)| *c == TileCoord::new(1, 0, 1))
            .unwrap();

        let Region::Pixels(raw) = source.read_region(0, 0, 256, 256).unwrap() else {
            panic!("expected pixels");
        };

        assert_eq!(codec::decode(north_west).unwrap(), raw);
    }

    #[test]
    fn empty_quadrants_propagate() {
        let dir = TempDir::new().unwrap();
        // north-west 2x2 block of a 4x4 grid is transparent
        let source = raster(1024, 1024, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 2);

        build(&mut store, Some(&source), 2, None).unwrap();

        for (column, row) in [(0, 3), (1, 3), (0, 2), (1, 2)] {
            assert_eq!(store.image_id(TileCoord::new(2, column, row)).unwrap(), Some(0));
        }

        assert_eq!(store.image_id(TileCoord::new(1, 0, 1)).unwrap(), Some(0));

        for (column, row) in [(1, 1), (0, 0), (1, 0)] {
            assert_ne!(store.image_id(TileCoord::new(1, column, row)).unwrap(), Some(0));
        }

        assert_ne!(store.image_id(TileCoord::new(0, 0, 0)).unwrap(), Some(0));

        // 12 base + 3 derived + 1 top + the empty image
        assert_eq!(store.image_count().unwrap(), 17);
    }

    #[test]
    fn edge_tiles_are_padded() {
        let dir = TempDir::new().unwrap();
        let source = raster(300, 300, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 0);

        // single level: the base is level 0 with a 2x2 grid
        build(&mut store, Some(&source), 0, None).unwrap();

        let tiles = store.read_tiles().unwrap();
        let tile = |column, row| {
            let (_, data) = tiles
                .iter()
                .find(|(c, _)| *c == TileCoord::new(0, column, row))
                .unwrap();

            codec::decode(data).unwrap()
        };

        // north-west: 44 raster rows at the bottom of the tile
        let north_west = tile(0, 1);
        assert_eq!(north_west.get_pixel(0, 211)[3], 0);
        assert_eq!(north_west.get_pixel(0, 212)[3], 255);

        // south-east: 44 raster columns on the left of the tile
        let south_east = tile(1, 0);
        assert_eq!(south_east.get_pixel(43, 100)[3], 255);
        assert_eq!(south_east.get_pixel(44, 100)[3], 0);
    }

    #[test]
    fn resume_matches_uninterrupted_build() {
        let dir = TempDir::new().unwrap();
        let source = raster(1000, 700, &[(1, 1)]);

        let mut full = new_store(&dir.path().join("full.mbtiles"), &source, 2);
        build(&mut full, Some(&source), 2, None).unwrap();

        let mut resumed = new_store(&dir.path().join("resumed.mbtiles"), &source, 2);

        let flaky = Interrupted {
            inner: &source,
            reads: Cell::new(5),
        };

        assert!(build(&mut resumed, Some(&flaky), 2, None).is_err());
        assert_eq!(resumed.tile_count().unwrap(), 5);

        let stats = build(&mut resumed, Some(&source), 2, None).unwrap();

        assert_eq!(stats.skipped, 5);
        assert_eq!(resumed.tile_ids().unwrap(), full.tile_ids().unwrap());
        assert_eq!(resumed.read_tiles().unwrap(), full.read_tiles().unwrap());
    }

    #[test]
    fn full_build_completes_store_holding_one_chunk() {
        let dir = TempDir::new().unwrap();
        let source = raster(1024, 1024, &[(0, 3)]);

        let mut full = new_store(&dir.path().join("full.mbtiles"), &source, 1);
        build(&mut full, Some(&source), 1, None).unwrap();

        let mut store = new_store(&dir.path().join("chunk.mbtiles"), &source, 1);

        let chunk = split(1024, 1024, 1)[3];
        build(&mut store, Some(&source), 1, Some(chunk)).unwrap();

        assert_eq!(store.tile_count().unwrap(), 5);

        // neither level holds a prefix of its enumeration
        let stats = build(&mut store, Some(&source), 1, None).unwrap();

        assert_eq!(stats.skipped, 5);
        assert_eq!(stats.created + stats.empty, 15);
        assert_eq!(store.tile_ids().unwrap(), full.tile_ids().unwrap());
        assert_eq!(store.read_tiles().unwrap(), full.read_tiles().unwrap());
    }

    #[test]
    fn resuming_with_other_depth_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        assert!(matches!(
            build(&mut store, Some(&source), 2, None),
            Err(Error::LevelMismatch {
                stored: 1,
                requested: 2
            })
        ));
        assert_eq!(store.tile_count().unwrap(), 0);
    }

    #[test]
    fn complete_build_resumes_as_noop_without_source() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        build(&mut store, Some(&source), 1, None).unwrap();

        let stats = build(&mut store, None, 1, None).unwrap();

        assert_eq!(
            stats,
            BuildStats {
                created: 0,
                empty: 0,
                skipped: 5
            }
        );
    }

    #[test]
    fn base_level_requires_source() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        assert!(matches!(
            build(&mut store, None, 1, None),
            Err(Error::MissingSource)
        ));
        assert_eq!(store.tile_count().unwrap(), 0);
    }

    #[test]
    fn mismatched_raster_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = raster(512, 512, &[]);
        let other = raster(256, 512, &[]);
        let mut store = new_store(&dir.path().join("a.mbtiles"), &source, 1);

        assert!(matches!(
            build(&mut store, Some(&other), 1, None),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
