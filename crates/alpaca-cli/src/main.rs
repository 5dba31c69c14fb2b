use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use alpaca_core::analysis::PlayfieldSummary;
use alpaca_core::bbox::{nbhd_bounding_box, rules_bounding_box};
use alpaca_core::playfield::construct_representation_map_with;
use alpaca_core::{
    analyze, get_class_map, get_class_membership, get_defined_playfield, get_state_membership,
    AnalysisConfig, Error, GlyphPolicy, Node, SparsePlayfield,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// ALPACA — static analysis of cellular-automaton descriptions
///
/// Every command reads a description AST in the JSON form the parser emits.
#[derive(Parser)]
#[command(name = "alpaca", version, about, long_about = None)]
struct Cli {
    /// Suppress human-readable output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log analysis steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analysis and print the full report
    Analyze {
        /// Path to AST .json file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Reject states that share a glyph
        #[arg(long)]
        strict_glyphs: bool,
        /// Skip playfield materialization
        #[arg(long)]
        no_playfield: bool,
        /// JSON analysis config; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Membership closure of one state or class
    Membership {
        /// Path to AST .json file
        file: PathBuf,
        /// State id
        #[arg(long, conflicts_with = "class", required_unless_present = "class")]
        state: Option<String>,
        /// Class id
        #[arg(long)]
        class: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Class id → member states
    ClassMap {
        /// Path to AST .json file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Glyph → state id
    Repr {
        /// Path to AST .json file
        file: PathBuf,
        /// Reject states that share a glyph
        #[arg(long)]
        strict_glyphs: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Materialize the literal playfield
    Playfield {
        /// Path to AST .json file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bounding box of relative references
    Bbox {
        /// Path to AST .json file
        file: PathBuf,
        /// Restrict to one neighbourhood definition
        #[arg(long)]
        nbhd: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// SHA-256 fingerprint of the analysis report
    Hash {
        /// Path to AST .json file
        file: PathBuf,
    },

    /// Show version information
    Version,
}

/// Exit codes: 0 success, 1 analysis failure, 2 input or I/O error
const EXIT_FAILURE: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    process::exit(run(cli));
}

fn init_logging(verbose: bool) {
    let default = if verbose { "alpaca_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> i32 {
    let quiet = cli.quiet;
    let outcome = match cli.command {
        Commands::Analyze {
            file,
            json,
            strict_glyphs,
            no_playfield,
            config,
        } => cmd_analyze(&file, json, quiet, strict_glyphs, no_playfield, config.as_deref()),
        Commands::Membership {
            file,
            state,
            class,
            json,
        } => cmd_membership(&file, state, class, json, quiet),
        Commands::ClassMap { file, json } => cmd_class_map(&file, json, quiet),
        Commands::Repr {
            file,
            strict_glyphs,
            json,
        } => cmd_repr(&file, strict_glyphs, json, quiet),
        Commands::Playfield { file, json } => cmd_playfield(&file, json, quiet),
        Commands::Bbox { file, nbhd, json } => cmd_bbox(&file, nbhd, json, quiet),
        Commands::Hash { file } => cmd_hash(&file),
        Commands::Version => {
            println!(
                "alpaca {} (alpaca-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
    };

    match outcome {
        Ok(()) => 0,
        Err(CliError::Io(msg)) => {
            eprintln!("{} {}", "error:".red().bold(), msg);
            EXIT_ERROR
        }
        Err(CliError::Analysis(err)) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            match err {
                Error::Input(_) => EXIT_ERROR,
                _ => EXIT_FAILURE,
            }
        }
    }
}

enum CliError {
    Io(String),
    Analysis(Error),
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        CliError::Analysis(err)
    }
}

type CliResult = std::result::Result<(), CliError>;

// ── Helpers ───────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {}", path.display(), e)))
}

fn load_ast(path: &Path) -> Result<Node, CliError> {
    let text = read_file(path)?;
    let ast = alpaca_core::from_json(&text)?;
    debug!(file = %path.display(), "loaded description");
    Ok(ast)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Analysis(Error::Input(e.to_string())))?;
    println!("{}", text);
    Ok(())
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if items.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        items.join(", ")
    }
}

// ── Commands ──────────────────────────────────────────────

fn cmd_analyze(
    file: &Path,
    json: bool,
    quiet: bool,
    strict_glyphs: bool,
    no_playfield: bool,
    config_path: Option<&Path>,
) -> CliResult {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_json(&read_file(path)?)?,
        None => AnalysisConfig::default(),
    };
    if strict_glyphs {
        config.glyph_policy = GlyphPolicy::Reject;
    }
    if no_playfield {
        config.include_playfield = false;
    }

    let ast = load_ast(file)?;
    let report = analyze(&ast, &config)?;

    if json {
        return print_json(&report);
    }
    if quiet {
        return Ok(());
    }

    println!("{} {}", "✓".green().bold(), file.display());
    println!(
        "  default state: {}",
        report.default_state.as_deref().unwrap_or("(none)")
    );
    println!("  {}", "states:".bold());
    for (state, classes) in &report.states {
        println!("    {} is {}", state.cyan(), join(classes));
    }
    println!("  {}", "classes:".bold());
    for (class, members) in &report.classes {
        println!("    {} ∋ {}", class.yellow(), join(members));
    }
    for (nbhd, bb) in &report.neighbourhoods {
        println!("  neighbourhood {}: {}", nbhd.magenta(), bb);
    }
    println!("  references: {}", report.bounding_box);
    match &report.playfield {
        Some(pf) => println!("  playfield: {} cell(s) placed", pf.cells.len()),
        None => println!("  playfield: {}", "(none)".dimmed()),
    }
    Ok(())
}

fn cmd_membership(
    file: &Path,
    state: Option<String>,
    class: Option<String>,
    json: bool,
    quiet: bool,
) -> CliResult {
    let ast = load_ast(file)?;
    let (subject, closure) = match (state, class) {
        (Some(state), _) => {
            let closure = get_state_membership(&ast, &state)?;
            (state, closure)
        }
        (None, Some(class)) => {
            let closure = get_class_membership(&ast, &class)?;
            (class, closure)
        }
        (None, None) => {
            return Err(CliError::Io("one of --state or --class is required".into()));
        }
    };

    if json {
        return print_json(&closure);
    }
    if !quiet {
        println!("{} is {}", subject.cyan(), join(&closure));
    }
    Ok(())
}

fn cmd_class_map(file: &Path, json: bool, quiet: bool) -> CliResult {
    let ast = load_ast(file)?;
    let class_map = get_class_map(&ast)?;
    if json {
        return print_json(&class_map);
    }
    if !quiet {
        for (class, members) in &class_map {
            println!("{} ∋ {}", class.yellow(), join(members));
        }
    }
    Ok(())
}

fn cmd_repr(file: &Path, strict_glyphs: bool, json: bool, quiet: bool) -> CliResult {
    let ast = load_ast(file)?;
    let policy = if strict_glyphs {
        GlyphPolicy::Reject
    } else {
        GlyphPolicy::LastWins
    };
    let repr = construct_representation_map_with(&ast, policy)?;
    if json {
        let keyed: BTreeMap<String, &String> =
            repr.iter().map(|(glyph, state)| (glyph.to_string(), state)).collect();
        return print_json(&keyed);
    }
    if !quiet {
        for (glyph, state) in &repr {
            println!("'{}' → {}", glyph, state.cyan());
        }
    }
    Ok(())
}

fn cmd_playfield(file: &Path, json: bool, quiet: bool) -> CliResult {
    let ast = load_ast(file)?;
    let playfield: Option<SparsePlayfield> = get_defined_playfield(&ast)?;
    let summary = playfield.as_ref().map(PlayfieldSummary::from);

    if json {
        return print_json(&summary);
    }
    if quiet {
        return Ok(());
    }
    match summary {
        None => println!("{}", "no playfield defined".dimmed()),
        Some(pf) => {
            if let Some(limits) = pf.limits {
                println!(
                    "limits: ({}, {}) .. ({}, {})",
                    limits.min_x, limits.min_y, limits.max_x, limits.max_y
                );
            }
            for cell in &pf.cells {
                println!("  ({}, {}) {}", cell.x, cell.y, cell.state.cyan());
            }
        }
    }
    Ok(())
}

fn cmd_bbox(file: &Path, nbhd: Option<String>, json: bool, quiet: bool) -> CliResult {
    let ast = load_ast(file)?;
    let bb = match &nbhd {
        Some(id) => nbhd_bounding_box(&ast, id)?,
        None => rules_bounding_box(&ast)?,
    };
    if json {
        return print_json(&bb);
    }
    if !quiet {
        println!("{}", bb);
    }
    Ok(())
}

fn cmd_hash(file: &Path) -> CliResult {
    let ast = load_ast(file)?;
    let report = analyze(&ast, &AnalysisConfig::default())?;
    println!("{}", report.fingerprint()?);
    Ok(())
}
