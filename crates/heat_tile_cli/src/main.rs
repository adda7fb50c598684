use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heat_tile::{
    compute_tiles, paint_html, parse_change, parse_quotes, render_board, save_legend,
    search_tiles, HeatScale, MarketTile,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Paint heat-map tiles with gradients derived from their change")]
struct Cli {
    /// TOML file overriding the heat scale
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the gradient for each percentage change
    Gradient(GradientArgs),
    /// Paint the tiles of an HTML file, or of every HTML file under a directory
    Apply(ApplyArgs),
    /// Build a painted board from quote rows or an ISS board payload
    Board(BoardArgs),
    /// Write the heat scale legend as PNG
    Legend(LegendArgs),
}

#[derive(Parser, Debug)]
struct GradientArgs {
    /// Percentage changes, parsed like the tile attribute
    #[arg(required = true, allow_hyphen_values = true)]
    changes: Vec<String>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input HTML file or directory
    input: PathBuf,
    /// Output file or directory; the input is rewritten in place when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BoardArgs {
    /// JSON file holding an array of quote rows or an ISS `securities.json` payload
    input: PathBuf,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Page title
    #[arg(long, default_value = "Heat map")]
    title: String,
    /// Only keep tiles whose ticker or name contains this text
    #[arg(long)]
    search: Option<String>,
    /// Emit the computed tiles as JSON instead of HTML
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct LegendArgs {
    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
    /// Legend width in pixels
    #[arg(long, default_value_t = 320)]
    width: u32,
    /// Legend height in pixels
    #[arg(long, default_value_t = 24)]
    height: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let scale = load_scale(cli.config.as_deref())?;
    match cli.command {
        Commands::Gradient(args) => gradient(args, &scale),
        Commands::Apply(args) => apply(args, &scale),
        Commands::Board(args) => board(args, &scale),
        Commands::Legend(args) => legend(args, &scale),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_scale(path: Option<&Path>) -> Result<HeatScale> {
    match path {
        Some(path) => HeatScale::load(path)
            .with_context(|| format!("failed to load heat scale {:?}", path)),
        None => Ok(HeatScale::default()),
    }
}

fn gradient(args: GradientArgs, scale: &HeatScale) -> Result<()> {
    for raw in &args.changes {
        match parse_change(raw) {
            Some(change) => println!("{}\t{}", raw, scale.gradient_for_change(change)),
            None => println!("{}\t—", raw),
        }
    }
    Ok(())
}

fn apply(args: ApplyArgs, scale: &HeatScale) -> Result<()> {
    if !args.input.is_dir() {
        let output = args.output.as_deref().unwrap_or(args.input.as_path());
        return paint_file(&args.input, output, scale);
    }

    let files = html_files(&args.input);
    if files.is_empty() {
        anyhow::bail!("no HTML files found in {:?}", args.input);
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    for file in &files {
        let output = match &args.output {
            Some(out_dir) => {
                let relative = file.strip_prefix(&args.input).unwrap_or(file.as_path());
                out_dir.join(relative)
            },
            None => file.clone(),
        };
        paint_file(file, &output, scale)?;
        progress.inc(1);
    }

    progress.finish_with_message(format!("Painted {} pages", files.len()));
    Ok(())
}

fn paint_file(input: &Path, output: &Path, scale: &HeatScale) -> Result<()> {
    let html =
        fs::read_to_string(input).with_context(|| format!("failed to read {:?}", input))?;
    let (painted, report) =
        paint_html(&html, scale).with_context(|| format!("failed to paint {:?}", input))?;

    if report.painted == 0 && report.skipped == 0 {
        warn!("no tiles found in {:?}", input);
    }
    info!("{:?}: painted {} tiles, skipped {}", input, report.painted, report.skipped);

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {:?}", parent))?;
    }
    fs::write(output, painted).with_context(|| format!("failed to write {:?}", output))?;
    Ok(())
}

fn html_files(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "html" | "htm"))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    entries
}

fn board(args: BoardArgs, scale: &HeatScale) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;
    let rows =
        parse_quotes(&json).with_context(|| format!("failed to parse {:?}", args.input))?;
    let mut tiles = compute_tiles(&rows);
    info!("computed {} tiles from {:?}", tiles.len(), args.input);

    if let Some(query) = &args.search {
        let found: Vec<MarketTile> = search_tiles(&tiles, query).into_iter().cloned().collect();
        info!("{} tiles match {:?}", found.len(), query);
        tiles = found;
    }

    let rendered = if args.json {
        serde_json::to_string_pretty(&tiles).context("failed to serialize tiles")?
    } else {
        let (painted, _) = paint_html(&render_board(&args.title, &tiles), scale)
            .context("failed to paint board")?;
        painted
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("failed to write {:?}", path))?
        },
        None => println!("{}", rendered),
    }
    Ok(())
}

fn legend(args: LegendArgs, scale: &HeatScale) -> Result<()> {
    save_legend(scale, &args.output, args.width, args.height)
        .with_context(|| format!("failed to write legend {:?}", args.output))
}
