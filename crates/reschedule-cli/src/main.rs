//! `reschedule` CLI — preview, apply and undo bulk session changes against a
//! JSON roster snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Preview moving every session in a week one hour later
//! reschedule preview -r roster.json -s x --period week:2024-03-04 --shift +1:00
//!
//! # Apply the safe and near-miss changes, writing the roster back in place
//! reschedule apply -r roster.json -s x --period month:2024-03 --set-time 15:30 --include-warnings
//!
//! # Move Monday 16:00 sessions to Friday 13:00
//! reschedule preview -r roster.json -s x --period month:2024-03 --from Mon@16:00 --to Fri@13:00
//!
//! # Undo the last apply (within 10 minutes)
//! reschedule undo -r roster.json
//!
//! # Drag one session somewhere else
//! reschedule move -r roster.json -s x --session x1 --date 2024-03-07 --time 12:00
//!
//! # Free windows on a day, and recurring-session expansion
//! reschedule free -r roster.json --date 2024-03-04 --start 08:00 --end 20:00
//! reschedule expand -s x --rrule "FREQ=WEEKLY;BYDAY=MO" --first 2024-03-04 --time 16:00 --count 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};
use reschedule_engine::freebusy::{first_free_window, free_windows};
use reschedule_engine::recurrence::expand_sessions;
use reschedule_engine::{
    ApplyScope, Direction, EngineConfig, FileStore, ModificationRule, Period, PeriodSelection,
    RescheduleEngine, Roster, Student, SystemClock, UndoManager,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reschedule",
    version,
    about = "Bulk session rescheduling with conflict checks and undo"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the safe / warning / conflict split for a bulk change
    Preview {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        rule: RuleArgs,
    },
    /// Apply the safe (and optionally warning) changes and record an undo batch
    Apply {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        rule: RuleArgs,
        /// Also apply changes that only come close to another session
        #[arg(long)]
        include_warnings: bool,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Revert the last applied batch if it has not expired
    Undo {
        /// Roster JSON file
        #[arg(short, long)]
        roster: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Move a single session unless the new slot is taken
    Move {
        /// Roster JSON file
        #[arg(short, long)]
        roster: PathBuf,
        /// Student id
        #[arg(short, long)]
        student: String,
        /// Session id
        #[arg(long)]
        session: String,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// New time (HH:MM)
        #[arg(long)]
        time: String,
        /// Only report the classification
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Mark a student's scheduled sessions in the periods as vacation
    Vacation {
        #[command(flatten)]
        target: Target,
    },
    /// List free windows on a date
    Free {
        /// Roster JSON file
        #[arg(short, long)]
        roster: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "08:00")]
        start: String,
        #[arg(long, default_value = "20:00")]
        end: String,
        /// Only print the first window at least this many minutes long
        #[arg(long)]
        min: Option<u32>,
    },
    /// Expand an RRULE into sessions (printed as JSON)
    Expand {
        /// Student id used as the session id prefix
        #[arg(short, long)]
        student: String,
        #[arg(long)]
        rrule: String,
        /// Date of the first occurrence
        #[arg(long)]
        first: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "UTC")]
        tz: String,
        #[arg(long)]
        until: Option<NaiveDate>,
        #[arg(long)]
        count: Option<u32>,
    },
}

#[derive(Args)]
struct Target {
    /// Roster JSON file
    #[arg(short, long)]
    roster: PathBuf,
    /// Student id
    #[arg(short, long)]
    student: String,
    /// week:YYYY-MM-DD, month:YYYY-MM or custom:YYYY-MM-DD..YYYY-MM-DD (repeatable)
    #[arg(long = "period", required = true)]
    periods: Vec<String>,
}

#[derive(Args)]
struct RuleArgs {
    /// Shift times by +H:MM or -H:MM
    #[arg(long, allow_hyphen_values = true)]
    shift: Option<String>,
    /// Set every time to HH:MM
    #[arg(long)]
    set_time: Option<String>,
    /// Day-change source slot, e.g. Mon@16:00
    #[arg(long, requires = "to")]
    from: Option<String>,
    /// Day-change target slot, e.g. Fri@13:00
    #[arg(long, requires = "from")]
    to: Option<String>,
}

#[derive(Args)]
struct StoreArgs {
    /// Directory holding the undo record
    #[arg(long, default_value = ".reschedule")]
    undo_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = RescheduleEngine::new(config);

    match cli.command {
        Commands::Preview { target, rule } => {
            let roster = read_roster(&target.roster)?;
            let periods = parse_periods(&target.periods)?;
            let rule = parse_rule(&rule)?;
            let preview = engine
                .preview(roster.students(), &target.student, periods.periods(), &rule)
                .context("Failed to compute preview")?;
            print_json(&preview)?;
        }
        Commands::Apply {
            target,
            rule,
            include_warnings,
            store,
        } => {
            let mut roster = read_roster(&target.roster)?;
            let periods = parse_periods(&target.periods)?;
            let rule = parse_rule(&rule)?;
            let snapshot = roster.students().to_vec();
            let preview = engine
                .preview(&snapshot, &target.student, periods.periods(), &rule)
                .context("Failed to compute preview")?;
            let scope = if include_warnings {
                ApplyScope::SafeAndWarnings
            } else {
                ApplyScope::SafeOnly
            };
            let mut undo = open_undo(&store, &engine)?;
            let report = engine
                .apply(&preview, scope, &mut roster, &mut undo)
                .context("Failed to apply changes")?;
            write_roster(&target.roster, &roster)?;
            print_json(&report)?;
        }
        Commands::Undo { roster: path, store } => {
            let mut roster = read_roster(&path)?;
            let mut undo = open_undo(&store, &engine)?;
            match undo.undo(&mut roster).context("Failed to undo")? {
                Some(report) => {
                    write_roster(&path, &roster)?;
                    print_json(&report)?;
                }
                None => println!("Nothing to undo."),
            }
        }
        Commands::Move {
            roster: path,
            student,
            session,
            date,
            time,
            dry_run,
            store,
        } => {
            let mut roster = read_roster(&path)?;
            let snapshot = roster.students().to_vec();
            if dry_run {
                let info = engine
                    .evaluate_move(&snapshot, &student, &session, date, &time)
                    .context("Failed to evaluate move")?;
                print_json(&info)?;
            } else {
                let mut undo = open_undo(&store, &engine)?;
                let outcome = engine
                    .move_session(&snapshot, &student, &session, date, &time, &mut roster, &mut undo)
                    .context("Failed to move session")?;
                if outcome.applied {
                    write_roster(&path, &roster)?;
                }
                print_json(&outcome)?;
            }
        }
        Commands::Vacation { target } => {
            let mut roster = read_roster(&target.roster)?;
            let periods = parse_periods(&target.periods)?;
            let snapshot = roster.students().to_vec();
            let report = engine
                .mark_vacation(&snapshot, &target.student, periods.periods(), &mut roster)
                .context("Failed to mark vacation")?;
            write_roster(&target.roster, &roster)?;
            print_json(&report)?;
        }
        Commands::Free {
            roster,
            date,
            start,
            end,
            min,
        } => {
            let roster = read_roster(&roster)?;
            match min {
                Some(min) => {
                    let window =
                        first_free_window(roster.students(), date, &start, &end, min, engine.config())
                            .context("Failed to compute free windows")?;
                    print_json(&window)?;
                }
                None => {
                    let windows = free_windows(roster.students(), date, &start, &end, engine.config())
                        .context("Failed to compute free windows")?;
                    print_json(&windows)?;
                }
            }
        }
        Commands::Expand {
            student,
            rrule,
            first,
            time,
            tz,
            until,
            count,
        } => {
            let sessions = expand_sessions(&student, &rrule, first, &time, &tz, until, count)
                .context("Failed to expand recurrence")?;
            print_json(&sessions)?;
        }
    }

    Ok(())
}

/// Build the rule from exactly one of --shift, --set-time or --from/--to.
fn parse_rule(args: &RuleArgs) -> Result<ModificationRule> {
    let given = [args.shift.is_some(), args.set_time.is_some(), args.from.is_some()]
        .iter()
        .filter(|b| **b)
        .count();
    if given != 1 {
        bail!("Give exactly one of --shift, --set-time or --from/--to");
    }

    if let Some(shift) = &args.shift {
        let (direction, rest) = match shift.chars().next() {
            Some('+') => (Direction::Later, &shift[1..]),
            Some('-') => (Direction::Earlier, &shift[1..]),
            _ => (Direction::Later, shift.as_str()),
        };
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h.parse::<u32>(), m.parse::<u32>()),
            None => (Ok(0), rest.parse::<u32>()),
        };
        let (Ok(hours), Ok(minutes)) = (hours, minutes) else {
            bail!("Invalid --shift '{}': expected +H:MM, -H:MM or minutes", shift);
        };
        return ModificationRule::try_offset(direction, hours, minutes)
            .with_context(|| format!("Invalid --shift '{shift}'"));
    }
    if let Some(time) = &args.set_time {
        return Ok(ModificationRule::specific(time.clone()));
    }
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let (from_weekday, from_time) = parse_slot(from)?;
            let (to_weekday, to_time) = parse_slot(to)?;
            Ok(ModificationRule::day_change(from_weekday, from_time, to_weekday, to_time))
        }
        _ => bail!("--from and --to must be given together"),
    }
}

/// Parse `Mon@16:00`.
fn parse_slot(raw: &str) -> Result<(Weekday, String)> {
    let Some((day, time)) = raw.split_once('@') else {
        bail!("Invalid slot '{}': expected DAY@HH:MM", raw);
    };
    let weekday: Weekday = day
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", day))?;
    Ok((weekday, time.to_string()))
}

fn parse_periods(raw: &[String]) -> Result<PeriodSelection> {
    let mut selection = PeriodSelection::new();
    for spec in raw {
        let period = parse_period(spec)?;
        selection.add(period)?;
    }
    Ok(selection)
}

fn parse_period(spec: &str) -> Result<Period> {
    let Some((kind, value)) = spec.split_once(':') else {
        bail!("Invalid period '{}': expected KIND:VALUE", spec);
    };
    let parse_date = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: '{}'", s))
    };
    match kind {
        "week" => Ok(Period::week_of(parse_date(value)?)),
        "month" => Ok(Period::month_of(parse_date(&format!("{}-01", value))?)),
        "custom" => {
            let Some((start, end)) = value.split_once("..") else {
                bail!("Invalid custom period '{}': expected START..END", value);
            };
            Ok(Period::custom(parse_date(start)?, parse_date(end)?)?)
        }
        other => bail!(
            "Unknown period kind: '{}'. Available kinds: week, month, custom",
            other
        ),
    }
}

fn open_undo(
    store: &StoreArgs,
    engine: &RescheduleEngine,
) -> Result<UndoManager<FileStore, SystemClock>> {
    let file_store = FileStore::new(&store.undo_dir)
        .with_context(|| format!("Failed to open undo store: {}", store.undo_dir.display()))?;
    UndoManager::new(file_store, SystemClock, engine.config().undo_ttl())
        .context("Failed to load undo record")
}

fn read_roster(path: &Path) -> Result<Roster> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let students: Vec<Student> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse roster: {}", path.display()))?;
    Ok(Roster::new(students))
}

fn write_roster(path: &Path, roster: &Roster) -> Result<()> {
    let json = serde_json::to_string_pretty(roster.students())?;
    std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path.display()))?;
    debug!(path = %path.display(), "roster written");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
