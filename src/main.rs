use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use tripcast::data::{Horizon, HourRow, MonthSummary};
use tripcast::engine::{DayReport, ScoredScenario};
use tripcast::score::DayAggregates;
use tripcast::sky;
use tripcast::table::Table;
use tripcast::{Activity, ApiConfig, Engine};

#[derive(Parser)]
#[command(name = "tripcast")]
#[command(about = "Score travel weather from Open-Meteo climatology")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a single day at a destination
    Day {
        /// Location name or lat,long pair
        location: String,

        /// YYYY-MM-DD, 'today', or 'tomorrow'
        #[arg(default_value = "today")]
        date: String,

        /// Activity profile to score for
        #[arg(long, value_enum, default_value = "general")]
        activity: Activity,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Score every month of the year at a destination
    Annual {
        /// Location name or lat,long pair
        location: String,

        /// Activity profile to score for
        #[arg(long, value_enum, default_value = "general")]
        activity: Activity,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn init_tracing(verbose: bool) {
    let default = if verbose { "tripcast=debug" } else { "tripcast=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    match s {
        "today" => Ok(today),
        "tomorrow" => Ok(today + chrono::Duration::days(1)),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD")),
    }
}

fn fmt_temp(c: Option<f64>) -> String {
    match c {
        Some(c) => format!("{c:.1}°C"),
        None => "-".to_string(),
    }
}

fn fmt_pct(p: f64) -> String {
    format!("{}%", p.round() as i64)
}

fn horizon_wording(horizon: Horizon, seasonal_corrected: bool) -> &'static str {
    match horizon {
        Horizon::Today | Horizon::Live(_) => "live forecast",
        Horizon::Seasonal(_) if seasonal_corrected => "climate normals, seasonal-adjusted",
        Horizon::Seasonal(_) => "climate normals",
        Horizon::Climatology => "climate normals (10-year archive)",
    }
}

fn hourly_table(rows: &[HourRow]) -> Table {
    let mut hours = Vec::new();
    let mut skies = Vec::new();
    let mut temps = Vec::new();
    let mut rains = Vec::new();
    let mut winds = Vec::new();
    for row in rows {
        let condition = sky::classify_hour(row);
        hours.push(format!("{:02}h", row.hour));
        skies.push(condition.label().to_string());
        temps.push(fmt_temp(row.temp));
        rains.push(fmt_pct(row.rain));
        winds.push(match row.wind {
            Some(w) => format!("{w:.0} km/h"),
            None => "-".to_string(),
        });
    }
    Table::new()
        .column_left("Hour", hours)
        .column_left("Sky", skies)
        .column("Temp", temps)
        .column("Rain", rains)
        .column("Wind", winds)
}

fn print_scenario_line(name: &str, scenario: &ScoredScenario) {
    let DayAggregates { tmin, tmax, avg_rain, .. } = scenario.aggregates;
    println!(
        "{name:<12} {:>3}/100   {} to {}, rain {}",
        scenario.score.total,
        fmt_temp(tmin),
        fmt_temp(tmax),
        fmt_pct(avg_rain),
    );
}

fn print_day_report(report: &DayReport, activity: Activity) {
    println!();
    hourly_table(&report.main.rows).print();
    println!();

    let s = &report.main.score;
    println!(
        "{} score: {}/100 (rain {:.0}, temp {:.0}, wind {:.0}, sun {:.0}{})",
        activity.label(),
        s.total,
        s.rain,
        s.temp,
        s.wind,
        s.sun,
        if s.humidity_malus > 0.0 {
            format!(", humidity -{:.0}", s.humidity_malus)
        } else {
            String::new()
        },
    );
    println!();
    print_scenario_line("typical", &report.main);
    print_scenario_line("pessimistic", &report.pessimistic);
    print_scenario_line("optimistic", &report.optimistic);
}

fn seasonal_note(m: &MonthSummary) -> String {
    let mut parts = Vec::new();
    if let Some(dt) = m.seas_temp_delta {
        parts.push(format!("{dt:+.1}°C"));
    }
    if let Some(dr) = m.seas_rain_delta {
        parts.push(format!("{dr:+} pts rain"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn print_annual_report(report: &tripcast::AnnualReport, activity: Activity) {
    let mut names = Vec::new();
    let mut tmaxs = Vec::new();
    let mut tmins = Vec::new();
    let mut rains = Vec::new();
    let mut suns = Vec::new();
    let mut skies = Vec::new();
    let mut scores = Vec::new();
    for m in &report.months {
        names.push(format!(
            "{}{}",
            MONTHS[usize::from(m.month) - 1],
            if m.has_seasonal { "*" } else { "" }
        ));
        tmaxs.push(fmt_temp(m.tmax));
        tmins.push(fmt_temp(m.tmin));
        rains.push(fmt_pct(m.rain_pct));
        suns.push(match m.sun_hours {
            Some(h) => format!("{h:.1}h"),
            None => "-".to_string(),
        });
        skies.push(sky::classify_month(m).label().to_string());
        scores.push(format!("{}", tripcast::score::score_month(m, activity)));
    }
    println!();
    Table::new()
        .column_left("Month", names)
        .column("Tmax", tmaxs)
        .column("Tmin", tmins)
        .column("Rain", rains)
        .column("Sun", suns)
        .column_left("Sky", skies)
        .column("Score", scores)
        .print();

    let seasonal = report
        .months
        .iter()
        .filter(|m| m.has_seasonal && !seasonal_note(m).is_empty())
        .map(|m| format!("{}{}", MONTHS[usize::from(m.month) - 1], seasonal_note(m)))
        .join(", ");
    if !seasonal.is_empty() {
        println!("\n* seasonal model adjustment: {seasonal}");
    }
    if let Some(name) = &report.reference_name {
        println!("scores calibrated against catalog destination {name}");
    }

    let best = report
        .ranked(activity)
        .iter()
        .take(3)
        .filter(|(_, score)| *score >= 55)
        .map(|(m, score)| format!("{} ({score})", MONTHS[usize::from(m.month) - 1]))
        .join(", ");
    if best.is_empty() {
        println!("\nno month stands out for {}", activity.label());
    } else {
        println!("\nbest months for {}: {best}", activity.label());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let today = Local::now().date_naive();
    match cli.command {
        Command::Day { location, date, activity, verbose } => {
            init_tracing(verbose);
            let date = parse_date(&date, today)?;
            if date < today {
                bail!("date {date} is in the past");
            }
            let engine = Engine::new(ApiConfig::default());
            let loc = engine.resolve(&location).await?;
            let report = engine.day_report(loc.coord, date, activity, today).await?;
            println!(
                "{} - {} ({})",
                loc.display_name,
                date.format("%A, %B %-d %Y"),
                horizon_wording(report.horizon, report.seasonal_corrected),
            );
            print_day_report(&report, activity);
        }
        Command::Annual { location, activity, verbose } => {
            init_tracing(verbose);
            let engine = Engine::new(ApiConfig::default());
            let loc = engine.resolve(&location).await?;
            let report = engine.annual_report(loc.coord, today).await?;
            println!("{} - year at a glance", loc.display_name);
            print_annual_report(&report, activity);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parsing() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(
            parse_date("tomorrow", today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
        );
        assert_eq!(
            parse_date("2026-12-24", today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap()
        );
        assert!(parse_date("christmas", today).is_err());
    }

    #[test]
    fn hourly_table_renders_all_rows() {
        let rows: Vec<HourRow> = (0..24).map(HourRow::empty).collect();
        let out = hourly_table(&rows).render();
        // Header, rule, 24 hours.
        assert_eq!(out.lines().count(), 26);
        assert!(out.contains("00h"));
        assert!(out.contains("23h"));
    }
}
