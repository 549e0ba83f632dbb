use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use phototopgn::game::{ConsolePrompter, GameController, Prompter, Session, ShakmatyRules, StockfishEvaluator};
use phototopgn::pgn::{GameHeaders, PgnExporter, PositionLog};
use phototopgn::vision::preprocess::{DEFAULT_BLUR_SIGMA, DEFAULT_CLIP_LIMIT, DEFAULT_TILE_GRID};
use phototopgn::vision::{CropRect, ImageSource, Preprocessor};
use phototopgn::Result;

/// Photo to PGN Converter
///
/// Reads a directory of photographs of a chess board, one taken after every
/// move, and reconstructs the game. Photographs are taken in file name order
/// and must share the same camera framing.
///
/// ## Usage Examples:
/// ```bash
/// # Photos in ./pics, board rectangle known up front
/// ./phototopgn --crop 412,3620,388,3598 pics
///
/// # Ask for the rectangle, skip evaluation, write to a chosen file
/// ./phototopgn --no-eval -o game.pgn pics
/// ```
#[derive(Parser)]
#[command(name = "phototopgn")]
#[command(about = "Reconstruct a chess game from photographs of the board")]
#[command(version = "0.1.0")]
struct Args {
    /// Directory holding the photographs, sorted by file name
    #[arg(value_name = "PICTURES", default_value = "pics")]
    pictures: PathBuf,

    /// Board rectangle as X_MIN,X_MAX,Y_MIN,Y_MAX (asked for if omitted)
    #[arg(long, value_name = "RECT")]
    crop: Option<CropRect>,

    /// Accept the crop rectangle without asking
    #[arg(short, long)]
    yes: bool,

    /// Whether any pawn was promoted to something other than a queen (asked for if omitted)
    #[arg(long, value_name = "BOOL", value_parser = clap::builder::BoolishValueParser::new())]
    underpromotions: Option<bool>,

    /// Output PGN file (if not specified, uses the picture directory name with .pgn extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Force overwrite existing output file
    #[arg(short, long)]
    force: bool,

    /// Also write the move -> position and move -> evaluation maps as JSON
    #[arg(long, value_name = "FILE")]
    positions: Option<PathBuf>,

    /// UCI engine used for evaluations
    #[arg(long, env = "STOCKFISH_PATH", default_value = "stockfish")]
    stockfish: String,

    /// Search depth per evaluation
    #[arg(long, default_value = "15")]
    depth: u32,

    /// Skip position evaluation
    #[arg(long)]
    no_eval: bool,

    /// Contrast limit for the tiled histogram equalisation
    #[arg(long, default_value_t = DEFAULT_CLIP_LIMIT)]
    clip_limit: f32,

    /// Equalisation tiles per side of the cropped board
    #[arg(long, default_value_t = DEFAULT_TILE_GRID)]
    tile_grid: u32,

    /// Gaussian blur sigma applied before differencing (0 disables)
    #[arg(long, default_value_t = DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Include evaluations as comments in PGN output
    #[arg(short, long)]
    comments: bool,

    /// PGN Event tag
    #[arg(long, default_value = "?")]
    event: String,

    #[arg(long, default_value = "?")]
    site: String,

    #[arg(long, default_value = "????.??.??")]
    date: String,

    /// Name of the player with the white pieces
    #[arg(long, default_value = "?")]
    white: String,

    /// Name of the player with the black pieces
    #[arg(long, default_value = "?")]
    black: String,

    /// PGN Result tag and game terminator (1-0, 0-1, 1/2-1/2 or *)
    #[arg(long, default_value = "*")]
    result: String,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Determine output file path
    let output_path = match args.output.clone() {
        Some(path) => path,
        None => {
            let mut path = args.pictures.clone();
            path.set_extension("pgn");
            path
        }
    };

    // Check if output file exists and we're not forcing overwrite
    if output_path.exists() && !args.force {
        eprintln!("Error: Output file '{}' already exists. Use --force to overwrite.",
                 output_path.display());
        process::exit(1);
    }

    if let Err(e) = run(&args, &output_path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args, output_path: &Path) -> Result<()> {
    let source = ImageSource::scan(&args.pictures)?;
    println!("Found {} photographs in '{}'", source.len(), args.pictures.display());

    let mut prompter = ConsolePrompter::stdio();
    let crop = choose_crop(args, &source, &mut prompter)?;

    let underpromotions = match args.underpromotions {
        Some(flag) => flag,
        None => prompter.confirm("Was any piece underpromoted in the game? Y/N: ")?,
    };

    let mut controller = GameController::new(Box::new(ShakmatyRules::new()), Box::new(prompter))
        .with_underpromotions(underpromotions);
    if !args.no_eval {
        let evaluator = StockfishEvaluator::spawn(&args.stockfish, args.depth)?;
        controller = controller.with_evaluator(Box::new(evaluator));
    }

    let preprocessor = Preprocessor::new(crop)
        .with_clip_limit(args.clip_limit)
        .with_tile_grid(args.tile_grid)
        .with_blur_sigma(args.blur_sigma);
    let session = Session::new(source, preprocessor, controller);
    let game = session.run(|controller, record| {
        match record.evaluation {
            Some(evaluation) => println!("{}. {} ({}) eval {}", record.number, record.san, record.uci, evaluation),
            None => println!("{}. {} ({})", record.number, record.san, record.uci),
        }
        println!("{}", controller.board());
    })?;

    let headers = GameHeaders {
        event: args.event.clone(),
        site: args.site.clone(),
        date: args.date.clone(),
        round: "?".to_string(),
        white: args.white.clone(),
        black: args.black.clone(),
    };
    let exporter = PgnExporter::new()
        .with_comments(args.comments)
        .with_result(&args.result);
    println!("{}", exporter.render(game.records(), &headers));

    let written = exporter.export(game.records(), &headers, output_path)?;
    println!("Successfully wrote {} moves to '{}'", written, output_path.display());

    if let Some(path) = &args.positions {
        PositionLog::from_state(game.state()).write_to(path)?;
        println!("Wrote positions to '{}'", path.display());
    }

    Ok(())
}

/// Crop rectangle from the command line or the console, confirmed by the user
fn choose_crop(args: &Args, source: &ImageSource, prompter: &mut dyn Prompter) -> Result<CropRect> {
    let (width, height) = image::image_dimensions(&source.files()[0])?;
    let mut crop = match args.crop {
        Some(crop) => crop,
        None => {
            println!("First photograph is {}x{} pixels", width, height);
            prompter.crop_rect()?
        }
    };

    loop {
        if let Err(e) = crop.validate(width, height) {
            if args.yes {
                return Err(e);
            }
            println!("{}", e);
            crop = prompter.crop_rect()?;
            continue;
        }
        if args.yes {
            return Ok(crop);
        }
        println!("Board rectangle {} ({}x{} pixels)", crop, crop.width(), crop.height());
        if prompter.confirm("Are you happy with the crop? (enter y/n): ")? {
            return Ok(crop);
        }
        crop = prompter.crop_rect()?;
    }
}
