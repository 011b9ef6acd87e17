use clap::{arg, crate_version, Command};
use qtc::{builder, decoder, encoder, grid, lossy, pgm, render, Error, Options};

const RCH: &str = "unreachable was reached";
const DEFAULT_COMPRESS_OUTPUT: &str = "default_compress_output.qtc";
const DEFAULT_DECOMPRESS_OUTPUT: &str = "default_compress_input.pgm";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let long_help = "Examples:
---------
Compress:   `qtc -c -i image.pgm -o image.qtc -a 2.0`
Decompress: `qtc -u -i image.qtc -o image.pgm`";

    let matches = Command::new("qtc")
        .about("Compress and decompress square power-of-two grayscale rasters with a quadtree codec")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-c --compress "select compression mode").conflicts_with("decompress"))
        .arg(arg!(-u --decompress "select decompression mode").conflicts_with("compress"))
        .arg(arg!(-i --input <PATH> "input file path").required(true))
        .arg(arg!(-o --output <PATH> "output file path"))
        .arg(arg!(-a --alpha <ALPHA> "lossy filter strength; filter runs only when alpha > 1.0"))
        .arg(arg!(-g --grid <PATH> "emit a partition-visualization raster to this path"))
        .arg(arg!(-v --verbose "enable verbose logging"))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let compress = matches.get_flag("compress");
    let decompress = matches.get_flag("decompress");
    if compress == decompress {
        eprintln!("Error: specify exactly one of -c or -u");
        std::process::exit(1);
    }

    let path_in = matches.get_one::<String>("input").expect(RCH);
    let alpha: f64 = match matches.get_one::<String>("alpha") {
        Some(s) => s.parse().map_err(|_| format!("invalid alpha value: {s}"))?,
        None => qtc::STD_OPTIONS.alpha,
    };
    if alpha <= 0.0 {
        eprintln!("Error: alpha must be > 0");
        std::process::exit(1);
    }
    let options = Options { alpha };
    let grid_path = matches.get_one::<String>("grid");

    let result = if compress {
        let path_out = matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_COMPRESS_OUTPUT);
        run_compress(path_in, path_out, &options, grid_path)
    } else {
        let path_out = matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_DECOMPRESS_OUTPUT);
        run_decompress(path_in, path_out, grid_path)
    };

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run_compress(path_in: &str, path_out: &str, options: &Options, grid_path: Option<&String>) -> Result<(), Error> {
    let in_file = std::fs::File::open(path_in)?;
    let raster = pgm::read(&mut std::io::BufReader::new(in_file))?;

    let mut tree = builder::build(&raster.pixels, raster.side)?;
    if options.alpha > 1.0 {
        lossy::filter(&mut tree, options.alpha)?;
    }

    let mut out_file = std::io::BufWriter::new(std::fs::File::create(path_out)?);
    let stats = encoder::encode(&tree, &mut out_file)?;
    log::info!(
        "compressed {} -> {} ({:.2}% of original size)",
        path_in,
        path_out,
        stats.compression_rate
    );

    if let Some(grid_path) = grid_path {
        let grid_raster = grid::render_grid(&tree)?;
        let mut grid_file = std::io::BufWriter::new(std::fs::File::create(grid_path)?);
        pgm::write(&grid_raster, &mut grid_file)?;
    }

    Ok(())
}

fn run_decompress(path_in: &str, path_out: &str, grid_path: Option<&String>) -> Result<(), Error> {
    let in_file = std::fs::File::open(path_in)?;
    let tree = decoder::decode(&mut std::io::BufReader::new(in_file))?;
    let pixels = render::render(&tree);
    let raster = pgm::Raster::new(tree.side as u32, pixels)?;

    let mut out_file = std::io::BufWriter::new(std::fs::File::create(path_out)?);
    pgm::write(&raster, &mut out_file)?;
    log::info!("decompressed {} -> {}", path_in, path_out);

    if let Some(grid_path) = grid_path {
        let grid_raster = grid::render_grid(&tree)?;
        let mut grid_file = std::io::BufWriter::new(std::fs::File::create(grid_path)?);
        pgm::write(&grid_raster, &mut grid_file)?;
    }

    Ok(())
}
