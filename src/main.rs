use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod artifacts;
mod batch;
mod density;
mod encoder;
mod error;
mod form;
mod loader;
mod models;
mod pipeline;
mod report;
mod session;
mod sweep;
#[cfg(test)]
mod testing;

use artifacts::ModelArtifacts;
use density::DensityStyle;
use form::ProfileForm;
use loader::{ArtifactPaths, ArtifactStore};
use models::{GradeClass, ParentalSupport, StudentProfile, ABSENCES_MAX, STUDY_TIME_MAX};
use session::Session;

#[derive(Parser)]
#[command(name = "gpa-insight")]
#[command(about = "GPA prediction from a student profile using a fitted kNN model", long_about = None)]
struct Cli {
    /// Fitted regressor (JSON)
    #[arg(long, global = true, env = "GPA_MODEL_PATH", default_value = "model.json")]
    model: PathBuf,

    /// Fitted feature scaler (JSON)
    #[arg(long, global = true, env = "GPA_SCALER_PATH", default_value = "scaler.json")]
    scaler: PathBuf,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict GPA and performance band for one profile
    Predict {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Simulate GPA across the full study time range
    Sweep {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the illustrative density curve around the prediction
    Density {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum, default_value_t = DensityStyle::Wide)]
        style: DensityStyle,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum, default_value_t = DensityStyle::Wide)]
        style: DensityStyle,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Score every profile in a CSV file
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "predictions.csv")]
        out: PathBuf,
    },
    /// Show what was loaded from the artifact files
    Inspect {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Edit a profile line by line on stdin and predict on demand
    Session,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    /// Study time in hours per week (0-40)
    #[arg(long, default_value_t = 12.0, value_parser = parse_study_time)]
    study_time: f64,
    /// Absences (0-50)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=ABSENCES_MAX as i64))]
    absences: u32,
    /// Tutoring support (Yes/No)
    #[arg(long, default_value = "No", action = clap::ArgAction::Set, value_parser = parse_yes_no)]
    tutoring: bool,
    /// Parental support level (0-3)
    #[arg(long, default_value = "0", value_parser = parse_support)]
    parental_support: ParentalSupport,
    /// Extracurricular (Yes/No)
    #[arg(long, default_value = "No", action = clap::ArgAction::Set, value_parser = parse_yes_no)]
    extracurricular: bool,
    /// Sports (Yes/No)
    #[arg(long, default_value = "No", action = clap::ArgAction::Set, value_parser = parse_yes_no)]
    sports: bool,
    /// Music (Yes/No)
    #[arg(long, default_value = "No", action = clap::ArgAction::Set, value_parser = parse_yes_no)]
    music: bool,
    /// Grade class (1-4)
    #[arg(long, default_value = "1", value_parser = parse_grade)]
    grade_class: GradeClass,
}

impl From<ProfileArgs> for StudentProfile {
    fn from(args: ProfileArgs) -> Self {
        StudentProfile {
            study_time: args.study_time,
            absences: args.absences,
            tutoring: args.tutoring,
            parental_support: args.parental_support,
            extracurricular: args.extracurricular,
            sports: args.sports,
            music: args.music,
            grade_class: args.grade_class,
        }
    }
}

fn parse_study_time(raw: &str) -> Result<f64, String> {
    let hours: f64 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    if !hours.is_finite() || !(0.0..=STUDY_TIME_MAX).contains(&hours) {
        return Err(format!("study time must be within 0-{STUDY_TIME_MAX}"));
    }
    Ok(hours)
}

fn parse_yes_no(raw: &str) -> Result<bool, String> {
    form::parse_flag("flag", raw).map_err(|err| err.to_string())
}

fn parse_support(raw: &str) -> Result<ParentalSupport, String> {
    let code: u8 = raw.parse().map_err(|_| format!("`{raw}` is not 0-3"))?;
    ParentalSupport::try_from(code)
}

fn parse_grade(raw: &str) -> Result<GradeClass, String> {
    let code: u8 = raw.parse().map_err(|_| format!("`{raw}` is not 1-4"))?;
    GradeClass::try_from(code)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = ArtifactStore::new(ArtifactPaths {
        scaler: cli.scaler.clone(),
        model: cli.model.clone(),
    });
    // nothing is served until both artifacts are in memory
    let artifacts = store
        .get_or_load()
        .context("failed to load model artifacts")?;

    match cli.command {
        Commands::Predict { profile, format } => {
            let mut session = Session::new();
            let result = session.submit(&artifacts, profile.into())?;
            match format {
                OutputFormat::Json => print_json(&session)?,
                OutputFormat::Text => {
                    println!("Predicted GPA: {:.2}", result.gpa);
                    println!("Category: {}", result.category);
                    println!("{}", result.category.commentary());
                }
            }
        }
        Commands::Sweep { profile, format } => {
            let points = sweep::sensitivity_sweep(&artifacts, &profile.into())?;
            match format {
                OutputFormat::Json => print_json(&points)?,
                OutputFormat::Text => {
                    println!("Study hours  GPA");
                    for point in &points {
                        println!("{:>11.2}  {:.2}", point.study_time, point.gpa);
                    }
                }
            }
        }
        Commands::Density {
            profile,
            style,
            format,
        } => {
            let result = pipeline::predict(&artifacts, &profile.into())?;
            let curve = density::density_curve(result.gpa, style);
            match format {
                OutputFormat::Json => print_json(&curve)?,
                OutputFormat::Text => {
                    println!(
                        "Illustrative spread around {:.2} (σ {:.2}); not a confidence interval.",
                        result.gpa,
                        style.std_dev()
                    );
                    for point in curve.iter().step_by(10) {
                        println!("{:>6.3}  {:.4}", point.x, point.density);
                    }
                }
            }
        }
        Commands::Report {
            profile,
            style,
            out,
        } => {
            let mut session = Session::new();
            let profile: StudentProfile = profile.into();
            session.submit(&artifacts, profile)?;
            let points = sweep::sensitivity_sweep(&artifacts, &profile)?;
            let snapshot = session
                .last()
                .context("session has no prediction after submit")?;
            let report = report::build_report(snapshot, &points, style);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Batch { csv, out } => {
            let records = batch::score_csv(&artifacts, &csv)?;
            let summary = batch::write_results(&records, &out)?;
            println!(
                "Scored {} profiles from {} ({} rejected), results in {}.",
                summary.scored,
                csv.display(),
                summary.failed,
                out.display()
            );
        }
        Commands::Inspect { format } => match (artifacts.summary(), format) {
            (Some(summary), OutputFormat::Json) => print_json(summary)?,
            (Some(summary), OutputFormat::Text) => {
                println!("Scaler: {} features", summary.scaler_features);
                println!(
                    "Model: kNN, k={}, weights={:?}, p={}, {} training rows, {} features",
                    summary.n_neighbors,
                    summary.weights,
                    summary.p,
                    summary.training_rows,
                    summary.model_features
                );
                println!("Encoder order: {}", encoder::FEATURE_NAMES.join(", "));
                if let Some(paths) = store.paths() {
                    println!(
                        "Loaded from {} and {}",
                        paths.scaler.display(),
                        paths.model.display()
                    );
                }
            }
            (None, _) => println!("No artifact summary available."),
        },
        Commands::Session => run_session(&artifacts)?,
    }

    Ok(())
}

const SESSION_HELP: &str = "Enter key=value pairs to edit the profile, then `predict`. \
Other commands: show, sweep, reset, help, quit.";

fn run_session(artifacts: &ModelArtifacts) -> anyhow::Result<()> {
    let mut session = Session::new();
    let mut form = ProfileForm::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{SESSION_HELP}");
    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{SESSION_HELP}"),
            "reset" => {
                form.reset();
                println!("Profile reset to defaults.");
            }
            "show" => {
                println!("Profile: {:?}", form.profile());
                match session.last() {
                    Some(snapshot) => println!(
                        "Last prediction: {:.2} ({})",
                        snapshot.result.gpa, snapshot.result.category
                    ),
                    None => println!("No prediction yet."),
                }
            }
            "predict" => match session.submit(artifacts, form.profile()) {
                Ok(result) => println!("Predicted GPA {:.2}: {}", result.gpa, result.category),
                Err(err) => {
                    error!(error = %err, "prediction failed");
                    println!("Prediction error: {err}");
                }
            },
            "sweep" => match sweep::sensitivity_sweep(artifacts, &form.profile()) {
                Ok(points) => {
                    for point in points.iter().step_by(4) {
                        println!("{:>6.2} h  {:.2}", point.study_time, point.gpa);
                    }
                }
                Err(err) => println!("Sweep error: {err}"),
            },
            edits => {
                if let Err(err) = form.apply_line(edits) {
                    println!("{err}");
                }
            }
        }
        print!("> ");
        stdout.flush()?;
    }

    Ok(())
}
