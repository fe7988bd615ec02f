//! VetWatch CLI
//!
//! Command-line interface for patient monitoring:
//! - Define symptom schemas
//! - Record observations
//! - Summaries, progress and timelines
//! - CSV export

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use vetwatch::analytics::{
    ProgressRequest, SeriesStatistics, TimeWindow, TimelineLayout, TimelineZoom,
};
use vetwatch::config::{generate_default_config, Config, LoggingConfig};
use vetwatch::schema::{DataType, SymptomSchema};
use vetwatch::store::{InMemoryRepository, MonitoringRepository, MonitoringService, ProgressGoal};

#[derive(Parser)]
#[command(name = "vetwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Veterinary patient monitoring")]
#[command(long_about = "VetWatch records typed symptom observations for patients and turns them\ninto summaries, progress reports, timelines and exports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file, overrides the configured one
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Zoom {
    In,
    Out,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Define a symptom schema in a monitoring plan
    SchemaAdd {
        #[arg(long)]
        plan: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "general")]
        category: String,
        /// numeric, boolean, scale, enumeration, text or image
        #[arg(long = "type")]
        data_type: DataType,
        #[arg(long)]
        units: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        /// Comma-separated options for enumerations
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// List the schemas of a plan
    Schemas {
        #[arg(long)]
        plan: Uuid,
    },

    /// Record an observation
    Record {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        schema: Uuid,
        /// Raw value, validated against the schema
        value: String,
        #[arg(short, long)]
        notes: Option<String>,
        /// Time of observation (default: now). Supports: "now", "yesterday", "now-3d", ISO 8601, YYYY-MM-DD
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Statistics and progress for one symptom
    Stats {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        schema: Uuid,
        /// 7days, 14days, 30days, 90days, all or START..END
        #[arg(short, long)]
        window: Option<TimeWindow>,
        #[arg(long)]
        target: Option<f64>,
        /// Lower values are better
        #[arg(long)]
        inverted: bool,
    },

    /// Compare two readings directly
    Progress {
        #[arg(long)]
        current: f64,
        #[arg(long)]
        previous: f64,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        inverted: bool,
    },

    /// Timeline of a patient's plan
    Timeline {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        plan: Uuid,
        /// Visible range in days (default: configured)
        #[arg(short, long)]
        range: Option<u32>,
        /// Zoom steps applied to the range, in order
        #[arg(long, value_enum)]
        zoom: Vec<Zoom>,
        /// End of the visible window (default: now)
        #[arg(long)]
        reference: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Export a patient's plan as CSV
    Export {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        plan: Uuid,
        #[arg(short, long, default_value = "all")]
        window: TimeWindow,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(data_file) = &cli.data_file {
        config.storage.data_file = data_file.to_string_lossy().to_string();
    }

    init_logging(&config.logging);
    tracing::debug!("VetWatch v{}", env!("CARGO_PKG_VERSION"));

    let repo = Arc::new(InMemoryRepository::open(&config.storage.data_file)?);
    let service = MonitoringService::new(repo.clone())
        .with_thresholds(config.analytics.thresholds()?)
        .with_duplicate_policy(config.export.duplicate_policy);
    let now = Utc::now();

    match cli.command {
        Commands::SchemaAdd {
            plan,
            name,
            category,
            data_type,
            units,
            min,
            max,
            options,
            description,
        } => {
            let mut schema = SymptomSchema::new(plan, name, category, data_type).options(options);
            schema.units = units;
            schema.min_value = min;
            schema.max_value = max;
            schema.description = description;

            let requirements = data_type.requirements();
            if requirements.requires_units && schema.units.is_none() {
                eprintln!("Note: {} schemas usually carry units (--units)", data_type);
            }

            let schema = service.define_schema(schema).await?;
            repo.save().await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
                OutputFormat::Table => println!("Defined {} ({})", schema.name, schema.id),
            }
        }

        Commands::Schemas { plan } => {
            let schemas = repo.get_symptom_schemas(plan).await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schemas)?),
                OutputFormat::Table if schemas.is_empty() => {
                    println!("No schemas defined for this plan.");
                }
                OutputFormat::Table => {
                    println!(
                        "{:<24} {:<12} {:<12} {:<8} {}",
                        "Name", "Type", "Category", "Version", "ID"
                    );
                    println!("{}", "-".repeat(96));
                    for s in schemas {
                        println!(
                            "{:<24} {:<12} {:<12} {:<8} {}",
                            s.column_header(),
                            s.data_type,
                            s.category,
                            s.version,
                            s.id
                        );
                    }
                }
            }
        }

        Commands::Record {
            patient,
            schema,
            value,
            notes,
            time,
        } => {
            let recorded_at = match time.as_deref() {
                Some(s) => parse_time(s, now)?,
                None => now,
            };

            let observation = service
                .record_observation(patient, schema, value.into(), notes.as_deref(), recorded_at)
                .await?;
            repo.save().await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&observation)?),
                OutputFormat::Table => println!(
                    "Recorded {} at {}",
                    observation.value,
                    observation.recorded_at.format("%Y-%m-%dT%H:%M:%SZ")
                ),
            }
        }

        Commands::Stats {
            patient,
            schema,
            window,
            target,
            inverted,
        } => {
            let window = window.unwrap_or(config.analytics.default_window);
            let summary = service
                .summarize(patient, schema, window, now, ProgressGoal { target, inverted })
                .await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Table => {
                    println!(
                        "{} - {} readings ({})",
                        summary.schema.column_header(),
                        summary.series.len(),
                        summary.window
                    );
                    match &summary.statistics {
                        Some(stats) => print_statistics(stats),
                        None => println!("No statistics for {} symptoms", summary.schema.data_type),
                    }
                    if let Some(progress) = &summary.progress {
                        println!();
                        println!(
                            "Change:   {:+} ({}%) {}",
                            progress.change_value, progress.change_percent, progress.status
                        );
                        if let Some(p) = progress.progress_to_target {
                            println!("Target:   {}% of the way", p);
                        }
                    }
                }
            }
        }

        Commands::Progress {
            current,
            previous,
            target,
            inverted,
        } => {
            let snapshot = ProgressRequest::new(current, previous)
                .maybe_target(target)
                .inverted(inverted)
                .thresholds(config.analytics.thresholds()?)
                .compute();

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                OutputFormat::Table => {
                    println!("Direction: {}", snapshot.direction);
                    println!("Change:    {:+} ({}%)", snapshot.change_value, snapshot.change_percent);
                    println!("Status:    {}", snapshot.status);
                    println!(
                        "Target:    {}",
                        SeriesStatistics::display(snapshot.progress_to_target)
                    );
                }
            }
        }

        Commands::Timeline {
            patient,
            plan,
            range,
            zoom,
            reference,
            search,
        } => {
            let (min, max) = config.timeline.zoom()?.bounds();
            let mut state = TimelineZoom::new(
                range.unwrap_or(config.timeline.default_time_range),
                min,
                max,
            )?;
            for step in zoom {
                match step {
                    Zoom::In => state.zoom_in(),
                    Zoom::Out => state.zoom_out(),
                };
            }

            let reference = match reference.as_deref() {
                Some(s) => parse_time(s, now)?,
                None => now,
            };

            let layout = service
                .timeline(
                    patient,
                    plan,
                    Vec::new(),
                    reference,
                    &state,
                    search.as_deref(),
                )
                .await?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layout)?),
                OutputFormat::Table => print_timeline(&layout),
            }
        }

        Commands::Export {
            patient,
            plan,
            window,
            output,
        } => {
            let table = service.export_patient(patient, plan, window, now).await?;
            let csv = table.to_csv()?;

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &csv)
                        .with_context(|| format!("writing export to {:?}", path))?;
                    println!("Exported {} rows to {:?}", table.len(), path);
                }
                None => print!("{}", csv),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vetwatch={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_time(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    match s {
        "now" => return Ok(now),
        "yesterday" => return Ok(now - Duration::days(1)),
        _ => {}
    }

    let re = regex::Regex::new(r"^now-(\d+)([hdw])$")?;
    if let Some(caps) = re.captures(s) {
        let amount: i64 = caps[1].parse()?;
        let offset = match &caps[2] {
            "h" => Duration::hours(amount),
            "d" => Duration::days(amount),
            _ => Duration::weeks(amount),
        };
        return Ok(now - offset);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(12, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    bail!("Invalid timestamp format: {}", s)
}

fn print_statistics(stats: &SeriesStatistics) {
    println!("Latest:   {}", SeriesStatistics::display(stats.latest));
    println!("Average:  {}", SeriesStatistics::display(stats.average));
    println!("Min:      {}", SeriesStatistics::display(stats.min));
    println!("Max:      {}", SeriesStatistics::display(stats.max));
}

fn print_timeline(layout: &TimelineLayout) {
    println!(
        "{} to {} ({} days, ticks every {} days)",
        layout.window_start.format("%Y-%m-%d"),
        layout.window_end.format("%Y-%m-%d"),
        layout.total_days,
        layout.tick_interval_days
    );

    if layout.groups.is_empty() {
        println!("No events in this range");
        return;
    }

    for group in &layout.groups {
        println!();
        println!("{}", group.date);
        for positioned in &group.events {
            let event = &positioned.event;
            let value = event
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>5.1}%  {:<20} {}",
                positioned.position, event.title, value
            );
        }
    }
}
