use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use team_health_dashboard::config::{
    DashboardConfig, DEFAULT_MUSCLE_HIGH_RISK_CUTOFF, DEFAULT_SESSION_RISK_QUANTILE,
};
use team_health_dashboard::dashboard;
use team_health_dashboard::filter::{self, FilterSelection, Filterable};
use team_health_dashboard::loader::{self, Snapshot};
use team_health_dashboard::predict::{
    self, LogisticModel, PredictionRequestBuilder, ProbabilityModel,
};
use team_health_dashboard::report;

#[derive(Parser)]
#[command(name = "team-dashboard")]
#[command(
    about = "Player injury, muscle imbalance, session and performance analytics",
    long_about = None
)]
struct Cli {
    /// Directory holding the exported CSV files
    #[arg(long, env = "TEAM_DASHBOARD_DATA_DIR", default_value = "Injury/Data", global = true)]
    data_dir: PathBuf,

    /// Emit JSON instead of markdown
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlayerArgs {
    /// Player to include (repeatable); defaults to the first three by name
    #[arg(long = "player")]
    players: Vec<String>,
    /// Include every player in the data set
    #[arg(long, conflicts_with = "players")]
    all_players: bool,
}

#[derive(Args)]
struct FeatureArgs {
    /// Serialized model artifact (JSON)
    #[arg(long)]
    model: PathBuf,
    /// Feature value as name=value (repeatable)
    #[arg(long = "feature", value_parser = parse_feature)]
    features: Vec<(String, f64)>,
    /// Start from the form defaults before applying --feature values
    #[arg(long)]
    use_defaults: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Form {
    Injury,
    Performance,
}

impl Form {
    fn builder(self) -> PredictionRequestBuilder {
        match self {
            Form::Injury => PredictionRequestBuilder::injury(),
            Form::Performance => PredictionRequestBuilder::performance(),
        }
    }

    fn title(self) -> &'static str {
        match self {
            Form::Injury => "Injury Prediction",
            Form::Performance => "Performance Prediction",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Injury history summary
    Injuries {
        #[command(flatten)]
        players: PlayerArgs,
        /// Severity level to include (repeatable); defaults to all
        #[arg(long = "severity")]
        severities: Vec<String>,
    },
    /// Muscle imbalance summary and risk scores
    Muscle {
        #[command(flatten)]
        players: PlayerArgs,
        /// Imbalance metric to summarise (repeatable); defaults to all five metrics
        #[arg(long = "metric")]
        metrics: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_MUSCLE_HIGH_RISK_CUTOFF)]
        high_risk_cutoff: f64,
    },
    /// Training session load summary
    Sessions {
        #[command(flatten)]
        players: PlayerArgs,
        #[arg(long, default_value_t = DEFAULT_SESSION_RISK_QUANTILE)]
        risk_quantile: f64,
    },
    /// Shooting performance summary
    Performance {
        #[command(flatten)]
        players: PlayerArgs,
    },
    /// Classify injury risk with a pre-trained model
    PredictInjury {
        #[command(flatten)]
        features: FeatureArgs,
    },
    /// Recommend a shooter for the final possession
    PredictPerformance {
        #[command(flatten)]
        features: FeatureArgs,
        #[arg(long)]
        shooter: String,
    },
    /// List a prediction form's inputs with their ranges and defaults
    Features {
        #[arg(value_enum)]
        form: Form,
    },
    /// Write every tab to one markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_feature(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for {name}: {err}"))?;
    Ok((name.trim().to_string(), value))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn player_selection<T: Filterable>(
    records: &[T],
    args: &PlayerArgs,
    config: &DashboardConfig,
) -> FilterSelection {
    if args.all_players {
        FilterSelection::players(filter::distinct_players(records))
    } else if args.players.is_empty() {
        FilterSelection::players(filter::default_players(records, config.default_player_count))
    } else {
        FilterSelection::players(args.players.iter().cloned())
    }
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    markdown: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", markdown());
    }
    Ok(())
}

fn load(data_dir: &Path, config: &DashboardConfig) -> anyhow::Result<Snapshot> {
    loader::load_snapshot(data_dir, &config.files)
        .with_context(|| format!("failed to load data from {}", data_dir.display()))
}

fn form_inputs(builder: &PredictionRequestBuilder, args: &FeatureArgs) -> HashMap<String, f64> {
    let mut inputs = if args.use_defaults {
        builder.defaults()
    } else {
        HashMap::new()
    };
    inputs.extend(args.features.iter().cloned());
    inputs
}

fn load_model(path: &Path, builder: &PredictionRequestBuilder) -> anyhow::Result<LogisticModel> {
    let model = LogisticModel::load(path)?;
    model.ensure_compatible(builder)?;
    Ok(model)
}

fn build_report(snapshot: &Snapshot, config: &DashboardConfig) -> String {
    let mut output = String::from("# Player Injury Analysis Dashboard\n\n");

    let selection = FilterSelection::players(filter::distinct_players(&snapshot.injuries))
        .with_categories(filter::distinct_categories(&snapshot.injuries));
    match dashboard::injury_tab(&snapshot.injuries, &selection) {
        Ok(summary) => output.push_str(&report::injury_section(&selection, &summary)),
        Err(err) => output.push_str(&format!("## Injury History\n{err}\n")),
    }
    output.push('\n');

    let selection = FilterSelection::players(filter::distinct_players(&snapshot.muscle));
    match dashboard::muscle_tab(&snapshot.muscle, &selection, config) {
        Ok(summary) => output.push_str(&report::muscle_section(&selection, &summary)),
        Err(err) => output.push_str(&format!("## Muscle Imbalance\n{err}\n")),
    }
    output.push('\n');

    let selection = FilterSelection::players(filter::distinct_players(&snapshot.sessions));
    match dashboard::sessions_tab(&snapshot.sessions, &selection, config) {
        Ok(summary) => output.push_str(&report::sessions_section(&selection, &summary)),
        Err(err) => output.push_str(&format!("## Sessions\n{err}\n")),
    }

    if let Some(performance) = snapshot.performance.as_deref() {
        output.push('\n');
        let selection = FilterSelection::players(filter::distinct_players(performance));
        match dashboard::performance_tab(Some(performance), &selection) {
            Ok(summary) => output.push_str(&report::performance_section(&selection, &summary)),
            Err(err) => output.push_str(&format!("## Shooting Performance\n{err}\n")),
        }
    }

    output
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = DashboardConfig::default();

    match cli.command {
        Commands::Injuries {
            players,
            severities,
        } => {
            let snapshot = load(&cli.data_dir, &config)?;
            let categories = if severities.is_empty() {
                filter::distinct_categories(&snapshot.injuries)
            } else {
                severities
            };
            let selection = player_selection(&snapshot.injuries, &players, &config)
                .with_categories(categories);
            let summary = dashboard::injury_tab(&snapshot.injuries, &selection)?;
            emit(cli.json, &summary, || report::injury_section(&selection, &summary))?;
        }
        Commands::Muscle {
            players,
            metrics,
            high_risk_cutoff,
        } => {
            config.muscle_high_risk_cutoff = high_risk_cutoff;
            let snapshot = load(&cli.data_dir, &config)?;
            let mut selection = player_selection(&snapshot.muscle, &players, &config);
            if !metrics.is_empty() {
                selection = selection.with_categories(metrics);
            }
            let summary = dashboard::muscle_tab(&snapshot.muscle, &selection, &config)?;
            emit(cli.json, &summary, || report::muscle_section(&selection, &summary))?;
        }
        Commands::Sessions {
            players,
            risk_quantile,
        } => {
            config.session_risk_quantile = risk_quantile;
            let snapshot = load(&cli.data_dir, &config)?;
            let selection = player_selection(&snapshot.sessions, &players, &config);
            let summary = dashboard::sessions_tab(&snapshot.sessions, &selection, &config)?;
            emit(cli.json, &summary, || report::sessions_section(&selection, &summary))?;
        }
        Commands::Performance { players } => {
            let snapshot = load(&cli.data_dir, &config)?;
            let records = snapshot.performance.as_deref().unwrap_or_default();
            let selection = player_selection(records, &players, &config);
            let summary = dashboard::performance_tab(snapshot.performance.as_deref(), &selection)?;
            emit(cli.json, &summary, || report::performance_section(&selection, &summary))?;
        }
        Commands::PredictInjury { features } => {
            let builder = Form::Injury.builder();
            let model = load_model(&features.model, &builder)?;
            let inputs = form_inputs(&builder, &features);
            let prediction = predict::predict_injury(&model, &inputs)
                .context("injury prediction failed; `features injury` lists the inputs")?;
            emit(cli.json, &prediction, || report::injury_prediction_section(&prediction))?;
        }
        Commands::PredictPerformance { features, shooter } => {
            let builder = Form::Performance.builder();
            let model = load_model(&features.model, &builder)?;
            let inputs = form_inputs(&builder, &features);
            let recommendation = predict::predict_performance(&model, &inputs, &shooter)
                .context("shot prediction failed; `features performance` lists the inputs")?;
            emit(cli.json, &recommendation, || {
                report::shot_recommendation_section(&recommendation)
            })?;
        }
        Commands::Features { form } => {
            let builder = form.builder();
            emit(cli.json, &builder.specs(), || {
                report::feature_form_section(form.title(), &builder)
            })?;
        }
        Commands::Report { out } => {
            let snapshot = load(&cli.data_dir, &config)?;
            let markdown = build_report(&snapshot, &config);
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
