use microplan_core::error::Entity;
use microplan_core::library::ExerciseLibrary;
use microplan_core::*;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mplan")]
#[command(about = "Drag-and-drop training plan board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new board with empty days
    Init {
        /// Microcycle name
        #[arg(long, default_value = "Microcycle")]
        name: String,

        /// First day of the microcycle (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Number of days to create
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Replace an existing board
        #[arg(long)]
        force: bool,
    },

    /// Print the board with the ids used by drag commands
    Show,

    /// List library exercises
    Library,

    /// Perform a drag gesture from SUBJECT onto TARGET
    ///
    /// Subjects: `library-<exercise>`, `training-day-<uuid>` or an item uuid.
    /// Targets: `day-<uuid>`, `training-day-<uuid>`, `<phase>-<uuid>` or an
    /// item uuid. Omitting the target drops outside the board.
    Drag {
        subject: String,
        target: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Set the exact order of one phase of a day
    Reorder {
        /// Day uuid or day number
        day: String,
        phase: Phase,
        /// Every item id of the phase, in the new order
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },

    /// Copy days into the microcycle
    CloneDays {
        /// Day uuids or day numbers
        #[arg(required = true)]
        days: Vec<String>,

        /// Zero-based insertion index, defaults to the end
        #[arg(long)]
        at: Option<usize>,
    },

    /// Append an empty day
    AddDay {
        name: String,

        /// Mark as a rest day
        #[arg(long)]
        rest: bool,
    },

    /// Delete a day and its exercises
    RemoveDay {
        /// Day uuid or day number
        day: String,
    },

    /// Delete a scheduled exercise
    RemoveItem { id: Uuid },

    /// Copy a scheduled exercise right after itself
    Duplicate { id: Uuid },

    /// Write the board as CSV
    Export { path: PathBuf },

    /// Validate the board and library without changing anything
    Check,
}

/// Prescription used when a library drop creates an exercise
#[derive(clap::Args)]
struct ConfigArgs {
    #[arg(long)]
    sets: Option<u32>,
    #[arg(long)]
    reps_min: Option<u32>,
    #[arg(long)]
    reps_max: Option<u32>,
    #[arg(long)]
    rest_seconds: Option<u32>,
    #[arg(long)]
    duration_seconds: Option<u32>,
    #[arg(long)]
    notes: Option<String>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.sets.is_none()
            && self.reps_min.is_none()
            && self.reps_max.is_none()
            && self.rest_seconds.is_none()
            && self.duration_seconds.is_none()
            && self.notes.is_none()
    }

    /// Library default overlaid with any flags given
    fn apply(&self, base: ItemConfig) -> ItemConfig {
        ItemConfig {
            sets: self.sets.unwrap_or(base.sets),
            reps_min: self.reps_min.or(base.reps_min),
            reps_max: self.reps_max.or(base.reps_max),
            rest_seconds: self.rest_seconds.unwrap_or(base.rest_seconds),
            duration_seconds: self.duration_seconds.or(base.duration_seconds),
            tempo: base.tempo,
            notes: self.notes.clone().or(base.notes),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    microplan_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let library = load_library(&config)?;

    match cli.command {
        Commands::Init {
            name,
            start,
            days: count,
            force,
        } => cmd_init(&data_dir, &config, name, start, count, force),
        Commands::Show => cmd_show(&data_dir, &library),
        Commands::Library => cmd_library(&library),
        Commands::Drag {
            subject,
            target,
            config: args,
        } => with_board(&data_dir, &config, library, |board| {
            cmd_drag(board, &subject, target.as_deref(), &args)
        }),
        Commands::Reorder { day, phase, ids } => {
            with_board(&data_dir, &config, library, |board| {
                let day_id = resolve_day(board.microcycle(), &day)?;
                let result = board.reorder(day_id, phase, &ids)?;
                report(board, &result);
                Ok(())
            })
        }
        Commands::CloneDays { days, at } => with_board(&data_dir, &config, library, |board| {
            let ids = days
                .iter()
                .map(|d| resolve_day(board.microcycle(), d))
                .collect::<Result<Vec<_>>>()?;
            let at = at.unwrap_or_else(|| board.microcycle().day_count());
            let result = board.clone_days(&ids, at)?;
            report(board, &result);
            Ok(())
        }),
        Commands::AddDay { name, rest } => with_board(&data_dir, &config, library, |board| {
            let id = board.append_day(&name, rest)?;
            let day = locator::find_day(board.microcycle(), id)?;
            println!("✓ Added day {} ({})", day.day_number, day.name);
            Ok(())
        }),
        Commands::RemoveDay { day } => with_board(&data_dir, &config, library, |board| {
            let day_id = resolve_day(board.microcycle(), &day)?;
            let removed = board.remove_day(day_id)?;
            println!(
                "✓ Removed day {} ({}) with {} exercise(s)",
                removed.day_number,
                removed.name,
                removed.item_count()
            );
            Ok(())
        }),
        Commands::RemoveItem { id } => with_board(&data_dir, &config, library, |board| {
            let removed = board.remove_item(id)?;
            println!("✓ Removed {}", board.library().name_of(&removed.exercise_id));
            Ok(())
        }),
        Commands::Duplicate { id } => with_board(&data_dir, &config, library, |board| {
            let copy = board.duplicate_item(id)?;
            println!(
                "✓ Duplicated {} as {}",
                board.library().name_of(&copy.exercise_id),
                copy.id
            );
            Ok(())
        }),
        Commands::Export { path } => {
            let mc = Microcycle::load(&board_path(&data_dir))?;
            let rows = export_csv(&mc, &library, &path)?;
            println!("✓ Exported {} rows to {}", rows, path.display());
            Ok(())
        }
        Commands::Check => cmd_check(&data_dir, &library),
    }
}

fn board_path(data_dir: &Path) -> PathBuf {
    data_dir.join("board.json")
}

fn commits_path(data_dir: &Path) -> PathBuf {
    data_dir.join("commits.jsonl")
}

fn load_library(config: &Config) -> Result<ExerciseLibrary> {
    let library = ExerciseLibrary::with_custom(&config.library.custom);

    let errors = library.validate();
    if !errors.is_empty() {
        eprintln!("Library validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::LibraryValidation("Invalid exercise library".into()));
    }
    Ok(library)
}

/// Load the board, run `f`, then save the board if `f` succeeded
fn with_board<F>(data_dir: &Path, config: &Config, library: ExerciseLibrary, f: F) -> Result<()>
where
    F: FnOnce(&mut Board<JsonlCommitLog>) -> Result<()>,
{
    let path = board_path(data_dir);
    let mc = Microcycle::load(&path)?;
    let log = JsonlCommitLog::new(commits_path(data_dir), mc.id);
    let mut board = Board::new(mc, library, config.board.clone(), log);

    f(&mut board)?;

    for notice in board.take_notices() {
        eprintln!("⚠ {} commit was not recorded: {}", notice.kind, notice.message);
    }

    board.into_microcycle().save(&path)
}

/// A day given as a uuid or a 1-based day number
fn resolve_day(mc: &Microcycle, raw: &str) -> Result<Uuid> {
    let found = match Uuid::parse_str(raw) {
        Ok(id) => locator::find_day(mc, id).ok(),
        Err(_) => raw
            .parse::<u32>()
            .ok()
            .and_then(|n| locator::find_day_by_number(mc, n)),
    };

    found.map(|day| day.id).ok_or_else(|| Error::NotFound {
        entity: Entity::Day,
        id: raw.to_string(),
    })
}

fn cmd_init(
    data_dir: &Path,
    config: &Config,
    name: String,
    start: Option<NaiveDate>,
    count: u32,
    force: bool,
) -> Result<()> {
    let path = board_path(data_dir);
    if path.exists() && !force {
        return Err(Error::State(format!(
            "Board already exists at {:?}; pass --force to replace it",
            path
        )));
    }

    let start = start.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut mc = Microcycle::new(name, start);

    let new_days: Vec<Day> = (1..=count).map(|n| Day::new(format!("Day {}", n))).collect();
    days::ensure_capacity(&mc, new_days.len(), config.board.max_days)?;
    days::insert_days(&mut mc, new_days, 0)?;

    mc.save(&path)?;
    println!("✓ Created board '{}' with {} days", mc.name, mc.day_count());
    println!("  Board: {}", path.display());
    Ok(())
}

fn cmd_show(data_dir: &Path, library: &ExerciseLibrary) -> Result<()> {
    let mc = Microcycle::load(&board_path(data_dir))?;

    println!(
        "{} (starts {}, {} days)",
        mc.name,
        mc.start_date,
        mc.day_count()
    );

    for day in &mc.days {
        println!();
        println!(
            "Day {}  {}  {}  [{}]",
            day.day_number,
            day.date.format("%a %Y-%m-%d"),
            day.name,
            drag::day_handle(day.id)
        );
        if day.rest_day {
            println!("  rest day");
            continue;
        }

        for phase in Phase::ALL {
            println!("  {:<8} [{}]", phase, drag::zone_marker(day.id, phase));
            let items = locator::items_in_container(&mc, day.id, phase)?;
            for (n, item) in items.iter().enumerate() {
                println!(
                    "    {}. {}  {}  {}",
                    n + 1,
                    library.name_of(&item.exercise_id),
                    item.config.summary(),
                    item.id
                );
            }
        }
    }

    Ok(())
}

fn cmd_library(library: &ExerciseLibrary) -> Result<()> {
    for exercise in library.sorted() {
        println!(
            "{:<32} {:<26} {:?}",
            drag::library_handle(&exercise.id),
            exercise.name,
            exercise.class
        );
    }
    Ok(())
}

fn cmd_drag(
    board: &mut Board<JsonlCommitLog>,
    subject: &str,
    target: Option<&str>,
    args: &ConfigArgs,
) -> Result<()> {
    if board.on_drag_start(subject).is_none() {
        println!("Nothing to drag at '{}'", subject);
        return Ok(());
    }
    if let Some(target) = target {
        board.on_drag_over(target);
    }

    let result = match board.on_drag_end(target) {
        Ok(result) => result,
        Err(e) if e.is_silent() => {
            tracing::info!("Drop ignored: {}", e);
            println!("Nothing changed");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if let MutationResult::PendingCreation(pending) = &result {
        let config = if args.is_empty() {
            None
        } else {
            let base = board
                .library()
                .get(&pending.exercise_id)
                .map(|ex| ex.default_config.clone())
                .unwrap_or_default();
            Some(args.apply(base))
        };
        let item = board.confirm_pending(config)?;
        let day = locator::find_day(board.microcycle(), item.day_id)?;
        println!(
            "✓ Added {} to day {} {} at #{}",
            board.library().name_of(&item.exercise_id),
            day.day_number,
            item.phase,
            item.position + 1
        );
        return Ok(());
    }

    report(board, &result);
    Ok(())
}

fn report(board: &Board<JsonlCommitLog>, result: &MutationResult) {
    let mc = board.microcycle();
    let day_number = |id: Uuid| {
        locator::find_day(mc, id)
            .map(|d| d.day_number)
            .unwrap_or_default()
    };

    match result {
        MutationResult::ReorderedContainer {
            day_id,
            phase,
            ordered_ids,
        } => {
            let names: Vec<&str> = ordered_ids
                .iter()
                .filter_map(|id| locator::find_item(mc, *id).ok())
                .map(|(_, item)| board.library().name_of(&item.exercise_id))
                .collect();
            println!(
                "✓ Reordered day {} {}: {}",
                day_number(*day_id),
                phase,
                names.join(", ")
            );
        }
        MutationResult::MovedAcrossContainers {
            item_id,
            to_day_id,
            to_phase,
            to_index,
            ..
        } => {
            let name = locator::find_item(mc, *item_id)
                .map(|(_, item)| board.library().name_of(&item.exercise_id))
                .unwrap_or("item");
            println!(
                "✓ Moved {} to day {} {} at #{}",
                name,
                day_number(*to_day_id),
                to_phase,
                to_index + 1
            );
        }
        MutationResult::DaysInserted {
            insertion_index,
            day_ids,
        } => {
            println!(
                "✓ Inserted {} day(s) as day {}",
                day_ids.len(),
                insertion_index + 1
            );
        }
        MutationResult::Cancelled => println!("Nothing changed"),
        MutationResult::PendingCreation(pending) => {
            println!("Waiting to add {}", pending.exercise_id);
        }
    }
}

fn cmd_check(data_dir: &Path, library: &ExerciseLibrary) -> Result<()> {
    let mc = Microcycle::read(&board_path(data_dir))?;

    let mut problems = mc.validate();
    for day in &mc.days {
        for item in day.all_items() {
            if library.get(&item.exercise_id).is_none() {
                problems.push(format!(
                    "Day {} references unknown exercise '{}'",
                    day.day_number, item.exercise_id
                ));
            }
        }
    }

    if problems.is_empty() {
        println!("✓ Board is consistent ({} days)", mc.day_count());
        return Ok(());
    }

    println!("Found {} problem(s):", problems.len());
    for problem in &problems {
        println!("  - {}", problem);
    }
    Err(Error::State(format!("{} problem(s) found", problems.len())))
}
