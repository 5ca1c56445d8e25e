//! Gesture Routines - command-line front end
//!
//! Registers, inspects and runs gesture-bound routines from stroke files.

use anyhow::Context;
use gesture_routines::app::cli::{Cli, Commands, ConfigAction};
use gesture_routines::app::config::Config;
use gesture_routines::executor::{ExecutionReport, RoutineExecutor, TracingNotifier};
use gesture_routines::geometry::{strokes_from_json, Stroke};
use gesture_routines::recognition::{
    GestureValidator, NormalizedSampleCache, RecognitionEngine, RecognitionSession, Recognizer,
    SessionOutcome, MIN_POINTS, RECOGNITION_THRESHOLD,
};
use gesture_routines::routine::{
    sample_count_warning, Command, JsonFilePersistence, Routine, RoutineStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Store, executor and engine wired from config
struct Runtime {
    store: Arc<RoutineStore>,
    engine: Arc<RecognitionEngine>,
    cache: Arc<NormalizedSampleCache>,
}

impl Runtime {
    fn open(config: &Config) -> anyhow::Result<Self> {
        let cache = Arc::new(NormalizedSampleCache::new());
        let persistence = JsonFilePersistence::new(&config.storage.routines_path);
        let store = Arc::new(
            RoutineStore::open(Box::new(persistence), cache.clone()).with_context(|| {
                format!("failed to open routines at {:?}", config.storage.routines_path)
            })?,
        );
        let executor = Arc::new(RoutineExecutor::new(
            Arc::new(config.host()),
            Arc::new(config.shell()),
            Arc::new(TracingNotifier),
        ));
        let engine = Arc::new(RecognitionEngine::new(store.clone(), executor, cache.clone()));
        Ok(Self {
            store,
            engine,
            cache,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::List { detailed } => {
            run_list(detailed, &config)?;
        }
        Commands::Add {
            name,
            samples,
            commands,
            delay_ms,
            force,
        } => {
            run_add(&name, &samples, commands, delay_ms, force, &config)?;
        }
        Commands::Delete { name } => {
            run_delete(&name, &config)?;
        }
        Commands::Toggle { name } => {
            run_toggle(&name, &config)?;
        }
        Commands::Validate { name, stroke } => {
            run_validate(name.as_deref(), &stroke, &config)?;
        }
        Commands::Recognize { stroke, execute } => {
            run_recognize(&stroke, execute, &config).await?;
        }
        Commands::Run { name } => {
            run_routine(&name, &config).await?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn read_strokes(path: &Path) -> anyhow::Result<Vec<Stroke>> {
    if !path.exists() {
        anyhow::bail!("Stroke file not found: {:?}", path);
    }
    let content = std::fs::read_to_string(path)?;
    let strokes = strokes_from_json(&content)
        .with_context(|| format!("failed to parse strokes in {:?}", path))?;
    if strokes.is_empty() {
        anyhow::bail!("No strokes in {:?}", path);
    }
    Ok(strokes)
}

fn read_stroke(path: &Path) -> anyhow::Result<Stroke> {
    let mut strokes = read_strokes(path)?;
    if strokes.len() > 1 {
        warn!(count = strokes.len(), "File holds several strokes; using the first");
    }
    Ok(strokes.swap_remove(0))
}

fn describe_command(command: &Command) -> String {
    if command.label() == command.payload() {
        format!("{} {}", command.kind(), command.payload())
    } else {
        format!("{} {} ({})", command.kind(), command.payload(), command.label())
    }
}

fn print_report(name: &str, report: &ExecutionReport) {
    println!(
        "Routine '{}': {} succeeded, {} failed",
        name, report.success_count, report.failed_count
    );
    for failure in &report.failures {
        println!("  - step {} [{}]: {}", failure.index + 1, failure.label, failure.error);
    }
}

fn run_list(detailed: bool, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    let routines = runtime.store.get_all();

    if routines.is_empty() {
        println!("No routines in {}", config.storage.routines_path.display());
        println!("Register one with: gesture-routines add <name> --samples <file> --command <spec>");
        return Ok(());
    }

    println!("Routines in {:?}:", config.storage.routines_path);
    for routine in &routines {
        let state = if routine.is_enabled() { "enabled" } else { "disabled" };
        println!(
            "  {}  ({}, {} commands, {} samples, delay {}ms)",
            routine.name,
            state,
            routine.commands.len(),
            routine.samples.len(),
            routine.delay_ms
        );
        if detailed {
            for (i, command) in routine.commands.iter().enumerate() {
                println!("      {}. {}", i + 1, describe_command(command));
            }
            if let Some(created) = routine.created_at {
                println!("      created {}", created.to_rfc3339());
            }
            if let Some(updated) = routine.updated_at {
                println!("      updated {}", updated.to_rfc3339());
            }
        }
    }

    Ok(())
}

fn run_add(
    name: &str,
    samples_path: &Path,
    commands: Vec<Command>,
    delay_ms: u64,
    force: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let name = name.trim();
    let runtime = Runtime::open(config)?;
    let samples = read_strokes(samples_path)?;
    info!(routine = %name, samples = samples.len(), "Registering routine");
    if let Some(message) = sample_count_warning(samples.len()) {
        warn!(routine = %name, samples = samples.len(), "Non-canonical sample count");
        eprintln!("Warning: {}", message);
    }

    let validator = GestureValidator::new(Recognizer::with_cache(runtime.cache.clone()));
    let existing = runtime.store.get_all_gestures();
    for (i, sample) in samples.iter().enumerate() {
        if sample.len() < MIN_POINTS {
            anyhow::bail!(
                "Sample {} has {} points; at least {} are needed",
                i + 1,
                sample.len(),
                MIN_POINTS
            );
        }
        let result = validator.validate(sample, &existing, Some(name));
        if !result.accepted {
            anyhow::bail!(
                "Sample {} is too similar to '{}' ({:.0}%). Draw a more distinctive gesture.",
                i + 1,
                result.conflicting_name.unwrap_or_default(),
                result.score * 100.0
            );
        }
    }

    if !force {
        if let Some(consistency) = validator.sample_consistency(&samples) {
            if consistency < RECOGNITION_THRESHOLD {
                anyhow::bail!(
                    "Samples are inconsistent (lowest match {:.0}%). Redraw them or pass --force.",
                    consistency * 100.0
                );
            }
        }
    }

    let mut routine = Routine::new(name, commands, samples).with_delay_ms(delay_ms);
    if let Some(current) = runtime.store.get(name) {
        routine.enabled = current.enabled;
    }
    let saved = runtime.store.save_routine(routine)?;
    println!(
        "Saved routine '{}' ({} commands, {} samples)",
        saved.name,
        saved.commands.len(),
        saved.samples.len()
    );
    Ok(())
}

fn run_delete(name: &str, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    if !runtime.store.delete(name)? {
        anyhow::bail!("Routine '{}' not found", name);
    }
    println!("Deleted routine '{}'", name);
    Ok(())
}

fn run_toggle(name: &str, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    if !runtime.store.toggle(name)? {
        anyhow::bail!("Routine '{}' not found", name);
    }
    let enabled = runtime.store.get(name).map(|r| r.is_enabled()).unwrap_or(false);
    println!(
        "Routine '{}' is now {}",
        name,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn run_validate(name: Option<&str>, stroke_path: &Path, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    let stroke = read_stroke(stroke_path)?;
    let validator = GestureValidator::new(Recognizer::with_cache(runtime.cache.clone()));
    let result = validator.validate(&stroke, &runtime.store.get_all_gestures(), name);

    if result.accepted {
        println!("Gesture ACCEPTED (closest score {:.0}%)", result.score * 100.0);
        Ok(())
    } else if let Some(conflict) = result.conflicting_name {
        anyhow::bail!(
            "Gesture too similar to '{}' ({:.0}%)",
            conflict,
            result.score * 100.0
        )
    } else {
        anyhow::bail!(
            "Gesture too short: {} points, at least {} needed",
            stroke.len(),
            MIN_POINTS
        )
    }
}

async fn run_recognize(stroke_path: &Path, execute: bool, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    let stroke = read_stroke(stroke_path)?;

    let outcome = if execute {
        let session = RecognitionSession::new(runtime.engine.clone(), Arc::new(TracingNotifier))
            .with_timeout(config.recognition_timeout());
        match session.submit(stroke).await {
            SessionOutcome::Completed(outcome) => outcome,
            SessionOutcome::TimedOut => anyhow::bail!("Recognition timed out, please try again"),
            SessionOutcome::Busy => anyhow::bail!("Recognition already in progress"),
        }
    } else {
        let recognition = tokio::time::timeout(
            config.recognition_timeout(),
            runtime.engine.recognize_async(stroke),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Recognition timed out, please try again"))?;
        gesture_routines::recognition::RecognitionOutcome {
            recognition,
            execution: None,
        }
    };

    let recognition = &outcome.recognition;
    match (&recognition.matched_name, recognition.recognized) {
        (Some(name), true) => println!("Recognized '{}' ({:.0}%)", name, recognition.score * 100.0),
        (Some(name), false) => println!(
            "No match (closest: '{}', {:.0}%)",
            name,
            recognition.score * 100.0
        ),
        (None, _) => println!("No match"),
    }

    if let (Some(report), Some(name)) = (&outcome.execution, &recognition.matched_name) {
        print_report(name, report);
    }
    Ok(())
}

async fn run_routine(name: &str, config: &Config) -> anyhow::Result<()> {
    let runtime = Runtime::open(config)?;
    let routine = runtime
        .store
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("Routine '{}' not found", name))?;
    if !routine.is_enabled() {
        warn!(routine = %name, "Running a disabled routine");
    }

    let report = runtime.engine.executor().execute_routine(&routine).await;
    print_report(name, &report);
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    if let Some(parent) = config.storage.routines_path.parent() {
        std::fs::create_dir_all(parent)?;
        println!("\nRoutines directory: {:?}", parent);
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
    }
    Ok(())
}
