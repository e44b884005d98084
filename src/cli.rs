use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use log::debug;

use crate::config::TrainerConfig;
use crate::display::{
    print_error, score_line, spot_table, strategy_grid, strategy_table,
    styled_action,
};
use crate::error::{TrainerError, TrainerResult};
use crate::generator::SpotRequest;
use crate::labels::format_bb;
use crate::loader::{load_catalog, FileLoader};
use crate::session::TrainingSession;
use crate::solution::NodeId;
use crate::spot::SpotType;
use crate::store::TreeStore;
use crate::strategy::playable_range;

#[derive(Parser)]
#[command(name = "gto", version = "1.0.0", about = "GTO Trainer: drill preflop decisions against solved trees.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the solutions in a solutions directory
    List {
        /// Directory holding solutions.json
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Show the strategy at one node of a solution
    Inspect {
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Solution id
        #[arg(long)]
        solution: String,

        #[arg(long, default_value_t = 0)]
        node: NodeId,

        /// Only show this hand (e.g. AKs)
        #[arg(long)]
        hand: Option<String>,
    },
    /// Answer generated spots and get scored
    Drill {
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Tournament phase to draw from
        #[arg(long)]
        phase: Option<String>,

        /// Spot type (repeatable): any, rfi, "vs open", "vs shove", "vs multiway shove"
        #[arg(long = "spot-type")]
        spot_types: Vec<SpotType>,

        /// Only solutions with this many seats
        #[arg(long)]
        players: Option<usize>,

        #[arg(long, default_value_t = 10)]
        rounds: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Seconds per answer
        #[arg(long)]
        time_limit: Option<u64>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub async fn run() {
    let cli = Cli::parse();
    dispatch(cli).await;
}

async fn dispatch(cli: Cli) {
    let result = match cli.command {
        Commands::List { dir } => cmd_list(&dir).await,
        Commands::Inspect {
            dir,
            solution,
            node,
            hand,
        } => cmd_inspect(&dir, &solution, node, hand).await,
        Commands::Drill {
            dir,
            phase,
            spot_types,
            players,
            rounds,
            seed,
            time_limit,
            config,
        } => {
            let request = SpotRequest {
                phase,
                spot_types,
                players,
            };
            cmd_drill(&dir, request, rounds, seed, time_limit, config).await
        }
    };
    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Store over a solutions directory, catalog loaded, no nodes yet.
pub async fn open_store(dir: &Path, config: &TrainerConfig) -> TrainerResult<Arc<TreeStore>> {
    let metas = load_catalog(dir).await?;
    let loader = Arc::new(FileLoader::new(dir, config.cache_ttl()));
    Ok(Arc::new(TreeStore::with_solutions(loader, metas)))
}

async fn cmd_list(dir: &Path) -> TrainerResult<()> {
    let store = open_store(dir, &TrainerConfig::default()).await?;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id"),
        Cell::new("Name"),
        Cell::new("Phase"),
        Cell::new("Seats").set_alignment(CellAlignment::Right),
        Cell::new("Avg stack").set_alignment(CellAlignment::Right),
        Cell::new("Loadable"),
    ]);
    for meta in store.metas() {
        let loadable = if meta.is_loadable() {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        };
        table.add_row(vec![
            Cell::new(&meta.id),
            Cell::new(&meta.name),
            Cell::new(&meta.phase),
            Cell::new(meta.seat_count()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}bb", format_bb(meta.average_stack_bb()))).set_alignment(CellAlignment::Right),
            Cell::new(loadable),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn cmd_inspect(dir: &Path, solution: &str, node_id: NodeId, hand: Option<String>) -> TrainerResult<()> {
    let store = open_store(dir, &TrainerConfig::default()).await?;
    let meta = store.meta(solution)?;
    let node = store.ensure_node(solution, node_id).await?;

    let title = format!("{} node {} (seat {} to act)", meta.name, node_id, node.player + 1);
    println!("{}", strategy_grid(&node, &title));

    let hands = match hand {
        Some(h) => {
            if node.hand(&h).is_none() {
                return Err(TrainerError::HandNotFound { hand: h, node: node_id });
            }
            vec![h]
        }
        None => playable_range(&node),
    };
    println!("{}", strategy_table(&meta, &node, &hands));
    Ok(())
}

async fn cmd_drill(
    dir: &Path,
    request: SpotRequest,
    rounds: usize,
    seed: Option<u64>,
    time_limit: Option<u64>,
    config_path: Option<PathBuf>,
) -> TrainerResult<()> {
    let mut config = match config_path {
        Some(path) => TrainerConfig::load(&path)?,
        None => TrainerConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if time_limit.is_some() {
        config.time_limit_secs = time_limit;
    }

    let store = open_store(dir, &config).await?;
    let mut session = TrainingSession::new(store, config, request);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    run_drill(&mut session, rounds, &mut reader, &mut writer).await
}

// ---------------------------------------------------------------------------
// Drill loop
// ---------------------------------------------------------------------------

fn prompt(message: &str, reader: &mut dyn BufRead, writer: &mut dyn Write) -> String {
    write!(writer, "{}: ", message).ok();
    writer.flush().ok();

    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => "q".to_string(),
        Ok(_) => line.trim().to_string(),
    }
}

/// A menu number becomes its label; anything else is passed on as typed.
fn pick_option(answer: &str, options: &[String]) -> String {
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 && n <= options.len() => options[n - 1].clone(),
        _ => answer.to_string(),
    }
}

/// Play `rounds` spots, reading answers from `reader`. Typing `q` stops early.
pub async fn run_drill(
    session: &mut TrainingSession,
    rounds: usize,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> TrainerResult<()> {
    writeln!(writer, "\n{}", "GTO Drill".cyan().bold()).ok();
    writeln!(writer, "Type {} at any prompt to quit.\n", "'q'".bold()).ok();

    'rounds: for round in 1..=rounds {
        let spot = match session.next_spot().await {
            Ok(Some(spot)) => spot.clone(),
            Ok(None) => continue,
            Err(TrainerError::GenerationExhausted { attempts }) => {
                debug!("round {} exhausted after {} attempts", round, attempts);
                writeln!(writer, "  {}", "Could not generate a spot, try again.".yellow()).ok();
                continue;
            }
            Err(e) => return Err(e),
        };
        let meta = session.store().meta(&spot.solution_id)?;
        let options = session.options()?;

        writeln!(writer, "\n  {} {}/{}", "Round".bold(), round, rounds).ok();
        writeln!(writer, "{}", spot_table(&meta, &spot)).ok();
        for (i, label) in options.iter().enumerate() {
            writeln!(writer, "    {}  {}", format!("{}.", i + 1).bold(), styled_action(label)).ok();
        }

        let started = Instant::now();
        let result = loop {
            let answer = prompt("  Your action", reader, writer);
            if answer.eq_ignore_ascii_case("q") {
                break 'rounds;
            }
            let label = pick_option(&answer, &options);
            match session.answer_timed(&label, started.elapsed()) {
                Ok(result) => break result,
                Err(TrainerError::UnknownAction(a)) => {
                    writeln!(writer, "  {} '{}'", "No such action:".red(), a).ok();
                }
                Err(e) => return Err(e),
            }
        };

        writeln!(writer, "{}", score_line(&result, &options)).ok();
        let history = session.history();
        writeln!(
            writer,
            "  {} {}/{}  streak {}",
            "Score".dimmed(),
            history.correct(),
            history.answered(),
            history.streak()
        )
        .ok();
    }

    let history = session.history();
    writeln!(
        writer,
        "\n  {} {}/{} correct ({:.0}%), best streak {}\n",
        "Done.".cyan().bold(),
        history.correct(),
        history.answered(),
        history.accuracy() * 100.0,
        history.best_streak()
    )
    .ok();
    Ok(())
}
