use chrono::Utc;
use clap::{Parser, Subcommand};
use pacekit_core::schedule::next_slot;
use pacekit_core::units::{format_clock, format_pace, parse_clock};
use pacekit_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pacekit")]
#[command(about = "Structured interval workout builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved workouts (default)
    List {
        /// Only show favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Show the blocks of one workout
    Show { id: WorkoutId },

    /// Build and save a new workout
    Create {
        /// Workout name
        #[arg(long)]
        name: String,

        /// Warmup target, a distance ("1mi") or a time ("10:00")
        #[arg(long)]
        warmup: Option<String>,

        /// Work target, a distance ("400m") or a time ("3:00")
        #[arg(long)]
        work: String,

        /// Target pace per mile for the work block ("7:30")
        #[arg(long)]
        pace: Option<String>,

        /// Number of work repeats
        #[arg(long)]
        repeats: Option<u32>,

        /// Rest target between repeats
        #[arg(long)]
        rest: Option<String>,

        /// Cooldown target
        #[arg(long)]
        cooldown: Option<String>,

        /// Validation mode (strict, custom)
        #[arg(long)]
        mode: Option<String>,

        /// Show the workout without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Toggle the favorite flag of a workout
    Favorite { id: WorkoutId },

    /// Delete a workout
    Delete { id: WorkoutId },

    /// Build a plan for a workout and schedule it an hour from now
    Schedule {
        id: WorkoutId,

        /// Plan kind (custom, goal, pacer)
        #[arg(long, default_value = "custom")]
        kind: String,

        /// Print the plan without scheduling it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    pacekit_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    match cli.command {
        Some(Commands::List { favorites }) => cmd_list(&config, favorites),
        Some(Commands::Show { id }) => cmd_show(&config, id),
        Some(Commands::Create {
            name,
            warmup,
            work,
            pace,
            repeats,
            rest,
            cooldown,
            mode,
            dry_run,
        }) => {
            let request = CreateRequest {
                name,
                warmup,
                work,
                pace,
                repeats,
                rest,
                cooldown,
                mode,
            };
            cmd_create(&config, request, dry_run)
        }
        Some(Commands::Favorite { id }) => cmd_favorite(&config, id),
        Some(Commands::Delete { id }) => cmd_delete(&config, id),
        Some(Commands::Schedule { id, kind, dry_run }) => cmd_schedule(&config, id, &kind, dry_run),
        None => cmd_list(&config, false),
    }
}

fn cmd_list(config: &Config, favorites: bool) -> Result<()> {
    let store = WorkoutStore::load(&config.workouts_path())?;

    let workouts: Vec<_> = if favorites {
        store.favorites().collect()
    } else {
        store.iter().collect()
    };

    if workouts.is_empty() {
        println!("No workouts.");
        return Ok(());
    }

    for workout in workouts {
        let star = if workout.is_favorite { "★" } else { " " };
        println!(
            "{} {:>3}  {}  ({} blocks)",
            star,
            workout.id,
            workout.name,
            workout.blocks().len()
        );
    }
    Ok(())
}

fn cmd_show(config: &Config, id: WorkoutId) -> Result<()> {
    let store = WorkoutStore::load(&config.workouts_path())?;
    let workout = store.get(id).ok_or(NotFound::Workout(id))?;
    display_workout(workout);
    Ok(())
}

/// Distance or time given on the command line
#[derive(Clone, Copy, Debug)]
enum Target {
    Distance(Distance),
    Time(u32),
}

fn parse_target(s: &str) -> Result<Target> {
    let is_time = s.contains(':') || s.trim().chars().all(|c| c.is_ascii_digit());
    if is_time {
        Ok(Target::Time(parse_clock(s)?))
    } else {
        Ok(Target::Distance(s.parse()?))
    }
}

fn apply_target(state: &mut BlockEditState, target: Target) -> Result<()> {
    match target {
        Target::Distance(distance) => {
            state.set_selected_metric(MetricType::Distance);
            state.update_distance(distance.value, distance.unit)?;
        }
        Target::Time(seconds) => {
            state.set_selected_metric(MetricType::Time);
            state.update_duration(seconds);
        }
    }
    Ok(())
}

struct CreateRequest {
    name: String,
    warmup: Option<String>,
    work: String,
    pace: Option<String>,
    repeats: Option<u32>,
    rest: Option<String>,
    cooldown: Option<String>,
    mode: Option<String>,
}

fn parse_mode(mode: &str) -> Result<ValidationMode> {
    match mode.to_lowercase().as_str() {
        "strict" => Ok(ValidationMode::Strict),
        "custom" => Ok(ValidationMode::Custom),
        other => Err(Error::InvalidArgument(format!(
            "unknown validation mode '{}'",
            other
        ))),
    }
}

fn add_block(session: &mut BuilderSession, block_type: BlockType, target: &str) -> Result<usize> {
    let target = parse_target(target)?;
    session.add_empty_block(block_type);
    let index = session.blocks().len() - 1;
    session.edit_block(index, |state| apply_target(state, target))??;
    Ok(index)
}

fn cmd_create(config: &Config, request: CreateRequest, dry_run: bool) -> Result<()> {
    let mut builder_config = config.builder.clone();
    if let Some(mode) = &request.mode {
        builder_config.validation_mode = parse_mode(mode)?;
    }

    let mut session = BuilderSession::from_config(&builder_config);
    session.subscribe(|event| tracing::debug!("Session event: {:?}", event));
    session.set_name(request.name);

    if let Some(warmup) = &request.warmup {
        add_block(&mut session, BlockType::Warmup, warmup)?;
    }

    add_block(&mut session, BlockType::Work, &request.work)?;

    if let Some(pace) = &request.pace {
        let raw = parse_clock(pace)?;
        let range = config.pace.range()?;
        let clamped = range.clamp(raw);
        if clamped != raw {
            println!(
                "Pace {} is outside {}..{}, using {}",
                format_clock(raw),
                format_clock(range.min_seconds),
                format_clock(range.max_seconds),
                format_clock(clamped)
            );
        }
        session.set_work_pace(Some(clamped))?;
    }

    if let Some(repeats) = request.repeats {
        session.update_repeated_count(builder_config.clamp_repeats(repeats))?;
    }

    if let Some(rest) = &request.rest {
        let target = parse_target(rest)?;
        session.add_rest_to_work_block()?;
        session.edit_rest_block(|state| apply_target(state, target))??;
    }

    if let Some(cooldown) = &request.cooldown {
        add_block(&mut session, BlockType::Cooldown, cooldown)?;
    }

    if dry_run {
        display_workout(&session.to_workout(0));
        println!("\n[Dry run - not saving workout]");
        return Ok(());
    }

    let path = config.workouts_path();
    let mut store = WorkoutStore::load(&path)?;

    let workout = match session.save_workout(&mut store) {
        Ok(workout) => workout,
        Err(Error::Validation(reason)) => {
            eprintln!("Cannot save workout: {}", reason);
            return Err(Error::Validation(reason));
        }
        Err(e) => return Err(e),
    };
    store.save(&path)?;

    display_workout(&workout);
    println!("\n✓ Workout saved (id {})", workout.id);
    Ok(())
}

fn cmd_favorite(config: &Config, id: WorkoutId) -> Result<()> {
    let path = config.workouts_path();
    let mut store = WorkoutStore::load(&path)?;

    let favorite = store.toggle_favorite(id)?;
    store.save(&path)?;

    if favorite {
        println!("★ Workout {} marked as favorite", id);
    } else {
        println!("Workout {} is no longer a favorite", id);
    }
    Ok(())
}

fn cmd_delete(config: &Config, id: WorkoutId) -> Result<()> {
    let path = config.workouts_path();
    let mut store = WorkoutStore::load(&path)?;

    let removed = store.remove(id)?;
    store.save(&path)?;

    println!("✓ Deleted workout {} ({})", removed.id, removed.name);
    Ok(())
}

fn cmd_schedule(config: &Config, id: WorkoutId, kind: &str, dry_run: bool) -> Result<()> {
    let store = WorkoutStore::load(&config.workouts_path())?;
    let workout = store.get(id).ok_or(NotFound::Workout(id))?;

    let plan = build_plan(workout, kind.parse()?)?;

    if dry_run {
        println!("{}", plan.to_json_pretty()?);
        println!("\n[Dry run - not scheduling plan]");
        return Ok(());
    }

    let at = next_slot(Utc::now());
    let mut scheduler = JsonlScheduler::new(config.schedule_path());
    scheduler.schedule(&plan, at)?;

    println!("✓ Scheduled {} for {}", workout.name, at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Plan: {}", plan.id);
    Ok(())
}

fn describe_block(block: &Block) -> String {
    let mut parts = Vec::new();
    if let Some(distance) = block.distance() {
        parts.push(distance.to_string());
    }
    if let Some(duration) = block.duration() {
        parts.push(duration.to_string());
    }
    if parts.is_empty() {
        parts.push("(no target)".into());
    }
    parts.join(" / ")
}

fn display_workout(workout: &Workout) {
    let star = if workout.is_favorite { " ★" } else { "" };
    println!("\n{}{}", workout.name, star);
    println!("─────────────────────────────────────────");

    for (i, block) in workout.blocks().iter().enumerate() {
        println!("  {}. {:<9} {}", i + 1, block.block_type().name(), describe_block(block));

        if let Some(pace) = block.pace_constraint() {
            println!("     → Pace: {}", format_pace(pace.duration_seconds));
        }
        if block.is_work() && block.repeats() > 1 {
            println!("     → Repeats: {}", block.repeats());
        }
        if let Some(rest) = block.rest_block() {
            println!("     → Rest: {}", describe_block(rest));
        }
    }

    let total = workout.total_duration_seconds();
    if total > 0 {
        println!();
        println!("  Timed total: {}", Duration::new(total));
    }
}
