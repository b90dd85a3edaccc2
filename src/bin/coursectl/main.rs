//! CLI tool for inspecting and reordering course curricula offline.
//!
//! Usage:
//!   coursectl import --input course.json [--output course.curriculum]
//!   coursectl show course.curriculum
//!   coursectl drag course.curriculum --active L2 --over L3
//!   coursectl progress course.curriculum --completed 2
//!   coursectl push course.curriculum --base-url https://lms.example.com   (feature `client`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coursecraft::{progress, Course, CurriculumManager, Progress, ProgressSummary};

#[derive(Parser, Debug)]
#[command(
    name = "coursectl",
    about = "Inspect and reorder course curricula",
    version
)]
struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a course JSON payload into a session snapshot
    Import {
        /// Course JSON file (course with modules and lessons)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to input path with .curriculum extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the outline with orders
    Show {
        snapshot: PathBuf,

        /// Print the tree as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Apply one drag-and-drop and save the snapshot
    Drag {
        snapshot: PathBuf,

        /// Id of the dragged module or lesson
        #[arg(long)]
        active: String,

        /// Id of the item it was dropped on
        #[arg(long)]
        over: String,

        /// Write the result elsewhere instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resume lesson and completion for a completed count
    Progress {
        snapshot: PathBuf,

        /// Number of completed lessons
        #[arg(short, long)]
        completed: i64,
    },

    /// Persist every module and lesson order to the course service
    #[cfg(feature = "client")]
    Push {
        snapshot: PathBuf,

        /// Course service base URL
        #[arg(short = 'b', long, env = "COURSECRAFT_BASE_URL")]
        base_url: String,

        /// Bearer token
        #[arg(short = 't', long, env = "COURSECRAFT_TOKEN")]
        token: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Import { input, output } => import(&input, output),
        Command::Show { snapshot, json } => show(&snapshot, json),
        Command::Drag {
            snapshot,
            active,
            over,
            output,
        } => drag(&snapshot, &active, &over, output),
        Command::Progress { snapshot, completed } => show_progress(&snapshot, completed),
        #[cfg(feature = "client")]
        Command::Push {
            snapshot,
            base_url,
            token,
        } => push(&snapshot, base_url, token),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<CurriculumManager> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    CurriculumManager::from_bytes(&bytes).context("Failed to load snapshot")
}

fn import(input: &Path, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let json = std::fs::read_to_string(input).context("Failed to read input file")?;
    let course = Course::from_json(&json).context("Failed to parse course JSON")?;
    let mut manager = CurriculumManager::from_course(course).context("Failed to build curriculum")?;
    let binary = manager.save();

    let output = output.unwrap_or_else(|| input.with_extension("curriculum"));
    std::fs::write(&output, &binary).context("Failed to write output file")?;

    let tree = manager.state()?;
    println!(
        "Imported {} ({} modules, {} lessons) -> {}",
        tree.course_id,
        tree.modules.len(),
        tree.lesson_count(),
        output.display()
    );
    Ok(())
}

fn show(path: &Path, json: bool) -> Result<()> {
    let mut manager = load(path)?;
    let tree = manager.state()?;

    if json {
        println!("{}", serde_json::to_string_pretty(tree)?);
        return Ok(());
    }

    println!("{} ({})", tree.title, tree.course_id);
    for module in &tree.modules {
        println!("  [{}] {} ({})", module.order, module.title, module.id);
        for lesson in &module.lessons {
            println!(
                "      [{}] {} ({}, {})",
                lesson.order, lesson.title, lesson.id, lesson.kind
            );
        }
    }
    Ok(())
}

fn drag(path: &Path, active: &str, over: &str, output: Option<PathBuf>) -> Result<()> {
    let mut manager = load(path)?;
    let outcome = manager
        .apply_drag(active, over)
        .with_context(|| format!("Failed to drop {} on {}", active, over))?;

    if outcome.is_noop() {
        println!("Nothing to do");
        return Ok(());
    }

    let output = output.unwrap_or_else(|| path.to_path_buf());
    std::fs::write(&output, manager.save()).context("Failed to write snapshot")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn show_progress(path: &Path, completed: i64) -> Result<()> {
    let mut manager = load(path)?;
    let tree = manager.state()?;
    let learner = Progress::new(tree.course_id.clone(), completed, tree.lesson_count() as i64);
    let summary = ProgressSummary::resolve(tree, &learner);

    println!("Completion: {}%", summary.percentage);
    match progress::continue_learning(tree, &learner) {
        Some(lesson) => println!("Continue with: {} ({})", lesson.title, lesson.id),
        None => println!("All lessons completed"),
    }
    Ok(())
}

#[cfg(feature = "client")]
fn push(path: &Path, base_url: String, token: Option<String>) -> Result<()> {
    use coursecraft::service::{persist_reorder, HttpCourseService, ServiceConfig};
    use coursecraft::{DragAction, ReorderOutcome};

    let mut manager = load(path)?;
    let tree = manager.get_state()?;

    let mut config = ServiceConfig::new(base_url);
    if let Some(token) = token {
        config = config.with_token(token);
    }
    let service = HttpCourseService::new(&config)?;

    let outcome = ReorderOutcome {
        action: DragAction::NoOp,
        module_order_changed: true,
        lesson_orders_changed: tree.module_ids(),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime
        .block_on(persist_reorder(&service, &tree.course_id, &tree, &outcome))
        .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;

    println!(
        "Pushed orders for {} modules of {}",
        outcome.lesson_orders_changed.len(),
        tree.course_id
    );
    Ok(())
}
