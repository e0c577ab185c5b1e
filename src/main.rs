mod args;

use args::{Args, Command, ConfigArgs, CreateArgs, LevelsArgs, MergeArgs};
use clap::Parser;
use raster_mbpack::{
    config::{check_levels, BuildConfig},
    levels::set_levels,
    merge::{collect_sources, merge},
    metadata::Metadata,
    pyramid::{build, split, BuildStats},
    raster::{self, open_geotiff, RasterSource},
    store::TileStore,
    Error as TileError,
};
use std::{error::Error, fs, process::ExitCode, slice};

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{e}");

        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "info" } else { "warn" }),
    )
    .format_target(false)
    .init();

    match args.command {
        Command::Create(args) => create(args),
        Command::Config(args) => print_configs(args),
        Command::Merge(args) => merge_files(args),
        Command::Levels(args) => levels(args),
    }
}

fn report(stats: BuildStats) {
    log::info!(
        "{} tiles created, {} empty, {} already present",
        stats.created,
        stats.empty,
        stats.skipped
    );
}

fn create(args: CreateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(config) => BuildConfig::load(config)?,
        None => BuildConfig::default(),
    };

    config.mbtiles = args.target_file.or(config.mbtiles);
    config.num_levels = args.num_levels.or(config.num_levels);
    config.source = args.source.or(config.source);

    let target_file = config.mbtiles.ok_or("No target file given")?;

    let max_zoom = check_levels(config.num_levels.ok_or("Number of levels not given")?)?;

    let source = config
        .source
        .as_deref()
        .map(|path| open_geotiff(path, config.srs.as_deref()))
        .transpose()?;

    let source_ref = source.as_ref().map(|s| s as &dyn RasterSource);

    if target_file.exists() {
        if args.memory {
            return Err(format!(
                "Target file {} exists (resume can't be used with an in-memory database)",
                target_file.display()
            )
            .into());
        }

        if !args.resume {
            return Err(format!(
                "Target file {} exists, use -r to resume",
                target_file.display()
            )
            .into());
        }

        let mut store = TileStore::open(&target_file)?;

        report(build(&mut store, source_ref, max_zoom, config.sub_bounds)?);

        return Ok(());
    }

    let source = source.as_ref().ok_or(TileError::MissingSource)?;

    let metadata = Metadata::from_extent(source.extent(), &config.metadata, max_zoom)?;

    if args.memory {
        let mut store = TileStore::create_in_memory(&metadata)?;

        report(build(&mut store, source_ref, max_zoom, config.sub_bounds)?);

        store
            .save_as(&target_file)
            .map_err(|e| format!("Error writing {}: {e}", target_file.display()))?;
    } else {
        let mut store = TileStore::create(&target_file, &metadata)
            .map_err(|e| format!("Error creating output: {e}"))?;

        report(build(&mut store, source_ref, max_zoom, config.sub_bounds)?);
    }

    Ok(())
}

fn print_configs(args: ConfigArgs) -> Result<(), Box<dyn Error>> {
    let base = match &args.config {
        Some(config) => BuildConfig::load(config)?,
        None => BuildConfig::default(),
    };

    let max_zoom = check_levels(args.num_levels)?;

    let (width, height) = raster::dimensions(&args.source)?;

    let name = base
        .metadata
        .name
        .clone()
        .or_else(|| {
            args.source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "noname".into())
        .replace(' ', "_");

    for (i, chunk) in split(width, height, max_zoom).into_iter().enumerate() {
        let config = BuildConfig {
            mbtiles: Some(format!("{name}.{i}.mbtiles").into()),
            num_levels: Some(max_zoom),
            source: Some(args.source.clone()),
            sub_bounds: Some(chunk),
            ..base.clone()
        };

        println!("{}", serde_json::to_string(&config)?);
    }

    Ok(())
}

fn merge_files(args: MergeArgs) -> Result<(), Box<dyn Error>> {
    let sources = collect_sources(&args.sources)?;

    let merged = if args.delete {
        let mut merged = 0;

        for source in &sources {
            merged += merge(&args.target_file, slice::from_ref(source))?;

            fs::remove_file(source)
                .map_err(|e| format!("Error deleting {}: {e}", source.display()))?;
        }

        merged
    } else {
        merge(&args.target_file, &sources)?
    };

    log::info!("Merged {merged} tiles from {} files", sources.len());

    Ok(())
}

fn levels(args: LevelsArgs) -> Result<(), Box<dyn Error>> {
    let max_zoom = check_levels(args.num_levels)?;

    let mut store = TileStore::open(&args.target_file)?;

    let source = match &args.source {
        Some(path) => Some(open_geotiff(path, Some(&store.read_metadata("srs")?))?),
        None => None,
    };

    report(set_levels(
        &mut store,
        max_zoom,
        source.as_ref().map(|s| s as &dyn RasterSource),
    )?);

    Ok(())
}
