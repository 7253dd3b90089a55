// CLI entry point for the burr puzzle generator.
//
// Builds or loads a solid voxel shape, runs `generate_puzzle()` on it, and
// writes the resulting layout as JSON. Progress goes through the `log`
// facade to stderr; the layout goes to stdout unless `--output` is given.
//
// Usage:
//   burr [OPTIONS]
//     --box <NX> <NY> <NZ>    Fully solid box (default: 6 6 6)
//     --grid <FILE>           Shape file: {"size": [nx, ny, nz], "labels": [...]}
//     --pieces <N>            Piece count including the frame (default: 6)
//     --seed <N>              PRNG seed (default: 0)
//     --config <FILE>         PuzzleConfig JSON; flags override its fields
//     --output <FILE>         Write the layout here instead of stdout
//     --no-split              Build every piece directly, no halving
//     --verbose               Debug logging and full voxel dumps

use std::path::PathBuf;

use burr_core::prng::PuzzleRng;
use burr_core::{PieceId, PuzzleConfig, VoxelGrid, generate_puzzle};
use serde::Deserialize;

/// Where the shape comes from.
#[derive(Debug, PartialEq)]
enum Shape {
    Box(u32, u32, u32),
    File(PathBuf),
}

#[derive(Debug)]
struct CliArgs {
    shape: Shape,
    pieces: Option<u32>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    no_split: bool,
    verbose: bool,
}

/// On-disk shape format. Labels run x fastest, then y, then z; 0 is void
/// and 1 is solid.
#[derive(Debug, Deserialize)]
struct GridFile {
    size: [u32; 3],
    labels: Vec<PieceId>,
}

fn main() {
    let args = parse_args();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&args) {
        eprintln!("burr: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            PuzzleConfig::from_json(&text).map_err(|e| format!("parsing {}: {e}", path.display()))?
        }
        None => PuzzleConfig::default(),
    };
    if let Some(pieces) = args.pieces {
        config.piece_count = pieces;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_split {
        config.split_pieces = false;
    }
    config.verbose |= args.verbose;

    let mut grid = match &args.shape {
        Shape::Box(x, y, z) => VoxelGrid::solid_box(*x, *y, *z),
        Shape::File(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            parse_grid(&text)?
        }
    };
    let (sx, sy, sz) = grid.dimensions();
    log::info!(
        "shape {sx}x{sy}x{sz}, {} solid cells, seed {}",
        grid.solid_count(),
        config.seed
    );

    let mut rng = PuzzleRng::new(config.seed);
    let layout = generate_puzzle(&mut grid, &config, &mut rng).map_err(|e| e.to_string())?;
    log::info!(
        "{} pieces, {} cells left in the frame",
        layout.pieces.len(),
        layout.remaining.len()
    );

    let json = serde_json::to_string_pretty(&layout).map_err(|e| e.to_string())?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| format!("writing {}: {e}", path.display()))?;
            log::info!("layout written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Parse a shape file into a grid of void and unassigned cells.
fn parse_grid(text: &str) -> Result<VoxelGrid, String> {
    let file: GridFile = serde_json::from_str(text).map_err(|e| format!("bad grid file: {e}"))?;
    if let Some(bad) = file
        .labels
        .iter()
        .find(|&&l| l != PieceId::EMPTY && l != PieceId::UNASSIGNED)
    {
        return Err(format!("bad grid file: label {} is not 0 or 1", bad.0));
    }
    let [x, y, z] = file.size;
    VoxelGrid::from_labels((x, y, z), file.labels).map_err(|e| e.to_string())
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching;
/// malformed input prints usage and exits.
fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        shape: Shape::Box(6, 6, 6),
        pieces: None,
        seed: None,
        config: None,
        output: None,
        no_split: false,
        verbose: false,
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--box" => {
                let dim = |j: usize| -> u32 {
                    args.get(j).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--box requires three positive sizes");
                        std::process::exit(1);
                    })
                };
                cli.shape = Shape::Box(dim(i + 1), dim(i + 2), dim(i + 3));
                i += 3;
            }
            "--grid" => {
                i += 1;
                cli.shape = Shape::File(path_arg(&args, i, "--grid"));
            }
            "--pieces" => {
                i += 1;
                cli.pieces = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--pieces requires a number");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                cli.seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                cli.config = Some(path_arg(&args, i, "--config"));
            }
            "--output" => {
                i += 1;
                cli.output = Some(path_arg(&args, i, "--output"));
            }
            "--no-split" => cli.no_split = true,
            "--verbose" | "-v" => cli.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn path_arg(args: &[String], i: usize, flag: &str) -> PathBuf {
    args.get(i).map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{flag} requires a file path");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: burr [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --box <NX> <NY> <NZ>    Fully solid box (default: 6 6 6)");
    println!("  --grid <FILE>           Shape file: {{\"size\": [nx, ny, nz], \"labels\": [...]}}");
    println!("  --pieces <N>            Piece count including the frame (default: 6)");
    println!("  --seed <N>              PRNG seed (default: 0)");
    println!("  --config <FILE>         PuzzleConfig JSON; flags override its fields");
    println!("  --output <FILE>         Write the layout here instead of stdout");
    println!("  --no-split              Build every piece directly, no halving");
    println!("  --verbose, -v           Debug logging and full voxel dumps");
    println!("  --help, -h              Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;
    use burr_core::Voxel;

    #[test]
    fn grid_file_loads_void_and_solid() {
        let grid = parse_grid(r#"{ "size": [2, 1, 1], "labels": [0, 1] }"#).unwrap();
        assert_eq!(grid.dimensions(), (2, 1, 1));
        assert_eq!(grid.get(Voxel::new(0, 0, 0)), PieceId::EMPTY);
        assert_eq!(grid.get(Voxel::new(1, 0, 0)), PieceId::UNASSIGNED);
    }

    #[test]
    fn grid_file_rejects_piece_labels() {
        let err = parse_grid(r#"{ "size": [2, 1, 1], "labels": [1, 3] }"#).unwrap_err();
        assert!(err.contains("label 3"));
    }

    #[test]
    fn grid_file_rejects_wrong_label_count() {
        assert!(parse_grid(r#"{ "size": [2, 2, 1], "labels": [1, 1, 1] }"#).is_err());
    }
}
