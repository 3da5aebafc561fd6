//! clockin: verify presence and record attendance from a terminal.

mod probes;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use clockin_attendance::{AttendanceService, AttendanceSettings, SecurityModePreference};
use clockin_store::OfficeDirectory;
use clockin_store_lmdb::{environment::DEFAULT_MAP_SIZE, LmdbEnvironment};
use clockin_types::{EmployeeId, GeoPoint, LocationMethod, SecurityMode, Timestamp};
use clockin_utils::{format_hours, LogFormat};
use clockin_verification::{
    resolve_nearest_office, Capabilities, ObservedNetwork, PositionFix, RecoveryAction, Step,
    SystemClock, VerificationEvent, VerificationOrchestrator, VerificationOutcome,
};
use serde::Serialize;

use probes::{ArgsGeolocation, FileCamera, FlagNetwork, IndexOfficeSelector, SystemNetworkProbe};

#[derive(Parser)]
#[command(name = "clockin", about = "Multi-factor attendance check-in")]
struct Cli {
    /// Attendance settings file (TOML).
    #[arg(long, default_value = "clockin.toml", env = "CLOCKIN_CONFIG")]
    config: PathBuf,

    /// Data directory for attendance records and preferences.
    #[arg(long, default_value = "./clockin_data", env = "CLOCKIN_DATA_DIR")]
    data_dir: PathBuf,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "CLOCKIN_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "CLOCKIN_LOG_FORMAT")]
    log_format: LogFormat,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Inspect the attendance settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Office lookups.
    Office {
        #[command(subcommand)]
        action: OfficeAction,
    },
    /// The security mode used on this device.
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
    /// Verify presence and record a check-in.
    CheckIn(CheckInArgs),
    /// Close today's open check-in.
    CheckOut {
        #[arg(long, env = "CLOCKIN_EMPLOYEE")]
        employee: String,
    },
    /// Monthly attendance summary.
    Report {
        #[arg(long, env = "CLOCKIN_EMPLOYEE")]
        employee: String,
        /// Month as YYYY-MM.
        #[arg(long)]
        month: String,
    },
}

#[derive(clap::Subcommand)]
enum SettingsAction {
    /// Validate the settings file.
    Check,
}

#[derive(clap::Subcommand)]
enum OfficeAction {
    /// Nearest office to a position and whether it is in range.
    Resolve {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[derive(clap::Subcommand)]
enum ModeAction {
    /// The mode the next check-in will use.
    Show,
    /// Modes available to employees.
    List,
    /// Remember a mode for later check-ins.
    Set { mode: SecurityMode },
}

#[derive(clap::Args)]
struct CheckInArgs {
    #[arg(long, env = "CLOCKIN_EMPLOYEE")]
    employee: String,

    /// Current latitude.
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    lat: Option<f64>,

    /// Current longitude.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lng: Option<f64>,

    /// Reported accuracy of the position, in meters.
    #[arg(long, default_value_t = 10.0)]
    accuracy: f64,

    /// Connected WiFi SSID. Read from the host when omitted.
    #[arg(long)]
    ssid: Option<String>,

    /// Connected access point MAC.
    #[arg(long, requires = "ssid")]
    bssid: Option<String>,

    /// Image file used as the check-in photo.
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Office to check in at (1-based, settings order) for manual selection.
    #[arg(long)]
    office: Option<usize>,

    /// Select the office manually instead of detecting it.
    #[arg(long, requires = "office")]
    manual: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    clockin_utils::init_logging(cli.log_format, &cli.log_level);

    let settings = load_settings(&cli.config)?;

    match cli.command {
        Command::Settings {
            action: SettingsAction::Check,
        } => settings_check(&settings, cli.json),
        Command::Office {
            action: OfficeAction::Resolve { lat, lng },
        } => office_resolve(&settings, lat, lng, cli.json),
        Command::Mode { action } => {
            let env = LmdbEnvironment::open(&cli.data_dir, DEFAULT_MAP_SIZE)?;
            let store = env.preference_store();
            let preference = SecurityModePreference::new(&store, &settings);
            match action {
                ModeAction::Show => {
                    let mode = preference.resolve()?;
                    print_mode(mode, cli.json)
                }
                ModeAction::List => {
                    let modes = preference.available_modes();
                    if cli.json {
                        print_json(&modes)
                    } else {
                        for mode in modes {
                            println!("{:<18} {}", mode.as_str(), mode.description());
                        }
                        Ok(())
                    }
                }
                ModeAction::Set { mode } => {
                    preference.save(mode)?;
                    print_mode(mode, cli.json)
                }
            }
        }
        Command::CheckIn(args) => check_in(&settings, &cli.data_dir, args, cli.json),
        Command::CheckOut { employee } => {
            ensure_valid(&settings)?;
            let employee = EmployeeId::new(employee)?;
            let env = LmdbEnvironment::open(&cli.data_dir, DEFAULT_MAP_SIZE)?;
            let store = env.attendance_store();
            let record =
                AttendanceService::new(&store, &settings).check_out(&employee, Timestamp::now())?;
            if cli.json {
                print_json(&record)
            } else {
                println!(
                    "Checked out {} for {}: {} worked ({})",
                    employee,
                    record.date,
                    format_hours(record.total_hours),
                    record.status
                );
                Ok(())
            }
        }
        Command::Report { employee, month } => {
            let employee = EmployeeId::new(employee)?;
            let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
                .with_context(|| format!("'{month}' is not a YYYY-MM month"))?;
            let env = LmdbEnvironment::open(&cli.data_dir, DEFAULT_MAP_SIZE)?;
            let store = env.attendance_store();
            let summary = AttendanceService::new(&store, &settings).summary(
                &employee,
                first.year(),
                first.month(),
            )?;
            if cli.json {
                print_json(&summary)
            } else {
                println!("Attendance of {employee} in {month}");
                println!("  days recorded   {}", summary.total_days);
                println!("  present         {}", summary.present_days);
                println!("  late            {}", summary.late_days);
                println!("  half days       {}", summary.half_days);
                println!("  absent          {}", summary.absent_days);
                println!("  hours           {}", format_hours(summary.total_hours));
                println!("  average per day {}", format_hours(summary.average_hours));
                println!("  attendance rate {:.1}%", summary.attendance_rate);
                Ok(())
            }
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<AttendanceSettings> {
    if !path.exists() {
        tracing::warn!("settings file {} not found, using defaults", path.display());
        return Ok(AttendanceSettings::default());
    }
    let settings = AttendanceSettings::from_toml_file(path)?;
    tracing::debug!("loaded settings from {}", path.display());
    Ok(settings)
}

fn ensure_valid(settings: &AttendanceSettings) -> anyhow::Result<()> {
    if let Err(e) = settings.validate() {
        tracing::warn!("rejected attendance settings: {e}");
        return Err(e.into());
    }
    Ok(())
}

fn settings_check(settings: &AttendanceSettings, json: bool) -> anyhow::Result<()> {
    let result = settings.validate();
    if json {
        #[derive(Serialize)]
        struct Report {
            valid: bool,
            errors: Vec<String>,
        }
        let errors = match &result {
            Err(clockin_attendance::AttendanceError::InvalidSettings(errors)) => errors.clone(),
            Err(e) => vec![e.to_string()],
            Ok(()) => Vec::new(),
        };
        print_json(&Report {
            valid: errors.is_empty(),
            errors,
        })?;
    } else if result.is_ok() {
        println!(
            "Settings OK: {} office(s), default mode {}",
            settings.offices.len(),
            settings.default_security_mode.display_name()
        );
    }
    result?;
    Ok(())
}

fn office_resolve(
    settings: &AttendanceSettings,
    lat: f64,
    lng: f64,
    json: bool,
) -> anyhow::Result<()> {
    let point = GeoPoint::new(lat, lng)?;
    let found = resolve_nearest_office(point, &settings.offices()?)?;
    if json {
        return print_json(&found);
    }
    println!(
        "{} ({}) is {:.0}m away, radius {:.0}m: {}",
        found.office.name,
        found.office.id,
        found.distance_meters,
        found.office.radius_meters,
        if found.is_within_range {
            "in range".to_string()
        } else {
            format!("{:.0}m out of range", found.overshoot_meters())
        }
    );
    Ok(())
}

fn check_in(
    settings: &AttendanceSettings,
    data_dir: &Path,
    args: CheckInArgs,
    json: bool,
) -> anyhow::Result<()> {
    ensure_valid(settings)?;
    let employee = EmployeeId::new(args.employee.as_str())?;
    let env = LmdbEnvironment::open(data_dir, DEFAULT_MAP_SIZE)?;

    let preferences = env.preference_store();
    let mode = SecurityModePreference::new(&preferences, settings).resolve()?;

    let caps = capabilities(&args)?;
    let mut orch = VerificationOrchestrator::new(mode, settings.verification_config(), caps)?;
    if args.manual
        && orch.current_step() == Some(Step::Location)
        && orch.location_method() == LocationMethod::Automatic
    {
        orch.use_manual_location()?;
    }

    let outcome = match orch.run() {
        Ok(outcome) => outcome,
        Err(first) => {
            // An office given on the command line doubles as the manual
            // fallback when automatic detection fails.
            let fallback = args.office.is_some()
                && orch.recovery_actions().contains(&RecoveryAction::SelectManually);
            if !fallback {
                log_events(orch.drain_events());
                return Err(verification_failed(&orch, first));
            }
            orch.use_manual_location()?;
            match orch.run() {
                Ok(outcome) => outcome,
                Err(e) => {
                    log_events(orch.drain_events());
                    return Err(verification_failed(&orch, e));
                }
            }
        }
    };
    log_events(orch.drain_events());

    let store = env.attendance_store();
    let record = AttendanceService::new(&store, settings).check_in(&employee, &outcome)?;

    if json {
        #[derive(Serialize)]
        struct CheckIn<'a> {
            verification: &'a VerificationOutcome,
            record: &'a clockin_store::AttendanceRecord,
        }
        return print_json(&CheckIn {
            verification: &outcome,
            record: &record,
        });
    }
    println!(
        "Checked in {} on {} ({}, {})",
        employee,
        record.date,
        record.status,
        mode.display_name()
    );
    if let Some(found) = &outcome.office {
        println!(
            "  office  {} ({:.0}m from the office)",
            found.office.name, found.distance_meters
        );
    }
    if let Some(network) = &outcome.network {
        println!("  network {}", network.ssid);
    }
    if let Some(photo) = &outcome.photo {
        println!("  photo   {} bytes, blake2b {}", photo.len(), photo.digest);
    }
    Ok(())
}

fn capabilities(args: &CheckInArgs) -> anyhow::Result<Capabilities> {
    let mut caps = Capabilities::new().with_clock(Rc::new(SystemClock));

    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        let fix = PositionFix {
            point: GeoPoint::new(lat, lng)?,
            accuracy_meters: args.accuracy,
        };
        caps = caps.with_geolocation(Rc::new(ArgsGeolocation { fix }));
    }

    caps = match &args.ssid {
        Some(ssid) => caps.with_network(Rc::new(FlagNetwork {
            observed: ObservedNetwork {
                ssid: ssid.clone(),
                bssid: args.bssid.clone(),
            },
        })),
        None => caps.with_network(Rc::new(SystemNetworkProbe)),
    };

    if let Some(path) = &args.photo {
        caps = caps.with_camera(Rc::new(FileCamera { path: path.clone() }));
    }
    if let Some(index) = args.office {
        caps = caps.with_office_selector(Rc::new(IndexOfficeSelector { index }));
    }
    Ok(caps)
}

fn log_events(events: Vec<VerificationEvent>) {
    for event in events {
        match event {
            VerificationEvent::StepVerified { outcome } => {
                tracing::info!(step = %outcome.step(), "step verified")
            }
            VerificationEvent::StepFailed { step, error } => {
                tracing::warn!(step = %step, "step failed: {error}")
            }
            VerificationEvent::Completed { outcome } => tracing::info!(
                mode = %outcome.mode,
                steps = outcome.verified.len(),
                "verification complete"
            ),
            other => tracing::debug!(event = ?other, "verification event"),
        }
    }
}

fn verification_failed(
    orch: &VerificationOrchestrator,
    error: clockin_verification::VerificationError,
) -> anyhow::Error {
    let step = orch
        .current_step()
        .map(|s| s.as_str())
        .unwrap_or("verification");
    let hints: Vec<&str> = orch
        .recovery_actions()
        .into_iter()
        .map(|a| match a {
            RecoveryAction::Retry => "run check-in again",
            RecoveryAction::SelectManually => "pass --office N --manual",
            RecoveryAction::Cancel => "give up",
        })
        .collect();
    anyhow::anyhow!("{step} failed: {error} (options: {})", hints.join(", "))
}

fn print_mode(mode: SecurityMode, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&mode)
    } else {
        println!("{} ({})", mode.display_name(), mode.description());
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
