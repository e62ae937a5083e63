use tle_backend::cli::{Cli, Command, QueryArgs};
use tle_backend::config::IngestConfig;
use tle_backend::module::ingest::IngestManager;
use tle_backend::module::local;
use tle_backend::module::spacetrack::ArchiveQuery;
use tle_backend::module::tle::{
    DerivedOrbit, MAX_SCHEDULE_STEPS, OrbitSummary, analyze, parse_line2_extras, propagation_schedule,
};

use anyhow::Result;
use clap::Parser;
use tle_common::{EarthModel, TleRecord};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Query(args)) => print_query(args),
        Some(Command::Extract {
            file,
            group,
            schedule,
            step_seconds,
        }) => extract(file, group, schedule.then_some(step_seconds)).await,
        Some(Command::Ingest) | None => ingest(&cli.config).await,
    }
}

async fn ingest(config_path: &std::path::Path) -> Result<()> {
    let config = IngestConfig::load_or_default(config_path)?;

    let _logging_guard = tle_backend::logging::init_logging(
        &config.log_dir,
        "tle-backend",
        &config.log_level,
        config.log_retention_days,
    )?;

    tracing::info!("TLE ingest starting...");
    tracing::info!("Output directory: {:?}", config.output_dir);

    let manager = IngestManager::new(config);
    let report = manager.run().await?;

    let problems = report.problems().count();
    if problems > 0 {
        tracing::warn!("{} of {} sources did not complete", problems, report.outcomes.len());
    }
    Ok(())
}

async fn extract(
    file: std::path::PathBuf,
    group: Option<String>,
    schedule_step: Option<f64>,
) -> Result<()> {
    let mut records = local::read_tle_file(&file).await?;
    if let Some(group) = group {
        for record in &mut records {
            record.source_group = group.clone();
        }
    }

    let earth = EarthModel::STANDARD;
    for record in &records {
        let orbit = analyze(record, &earth);
        println!(
            "{:<24} {:>6} {:>9} {:>12} {:>10} {}",
            orbit.name,
            display(orbit.norad_id),
            display(orbit.inclination_deg.map(|v| format!("{:.4}", v))),
            display(orbit.mean_motion_rev_per_day.map(|v| format!("{:.8}", v))),
            display(orbit.altitude_km.map(|v| format!("{:.1}", v))),
            display(orbit.regime),
        );

        if let Some(step) = schedule_step {
            print_schedule(record, &orbit, &earth, step);
        }
    }
    println!("{} TLE sets in {:?}", records.len(), file);
    Ok(())
}

fn print_schedule(record: &TleRecord, orbit: &DerivedOrbit, earth: &EarthModel, step: f64) {
    let extras = parse_line2_extras(&record.line2);
    let summary = OrbitSummary::from_elements(orbit.mean_motion_rev_per_day, extras.eccentricity, earth);
    let (Some(epoch), Some(summary)) = (orbit.epoch, summary) else {
        println!("    no epoch or orbit, no schedule");
        return;
    };

    let times = propagation_schedule(epoch, summary.period_seconds, step);
    if times.is_empty() {
        println!(
            "    no schedule: step {}s is invalid or gives more than {} steps",
            step, MAX_SCHEDULE_STEPS
        );
        return;
    }
    println!(
        "    {} steps of {}s from {}",
        times.len(),
        step,
        epoch.format("%Y-%m-%d %H:%M:%S%.3f UTC")
    );
    for time in times {
        println!("    {}", time.to_rfc3339());
    }
}

fn print_query(args: QueryArgs) -> Result<()> {
    let query = ArchiveQuery::try_from(args)?;
    println!("{}", query.path());
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
