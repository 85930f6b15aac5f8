use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod charts;
mod error;
mod form;
mod history;
mod insights;
mod models;
mod predict;
mod report;
mod session;
mod suggest;

use crate::form::RecordArgs;
use crate::predict::LinearScorer;
use crate::session::{Outcome, Session};

#[derive(Parser)]
#[command(name = "exam-score-predictor")]
#[command(about = "Predict a student's exam score and suggest improvements", long_about = None)]
struct Cli {
    /// Pre-trained model artifact
    #[arg(
        long,
        global = true,
        env = "EXAM_MODEL_PATH",
        default_value = "./models/student_score_model.json"
    )]
    model: PathBuf,

    /// Historical dataset used for the charts
    #[arg(
        long,
        global = true,
        env = "EXAM_DATASET_PATH",
        default_value = "./dataset/StudentExamScores1.csv"
    )]
    dataset: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the exam score, draw charts and print suggestions
    Predict {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long, default_value = "charts")]
        charts: PathBuf,
    },
    /// Print improvement suggestions only
    Suggest {
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Run a prediction and write a markdown report
    Report {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long, default_value = "charts")]
        charts: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("exam_score_predictor=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict { record, charts } => {
            let scorer = LinearScorer::load(&cli.model)?;
            let record = record.collect()?;
            let session = Session {
                scorer: &scorer,
                dataset: &cli.dataset,
                charts_dir: &charts,
            };
            print_outcome(&session.run(record));
        }
        Commands::Suggest { record } => {
            let record = record.collect()?;
            println!("Smart Suggestions for Improvement:");
            for tip in suggest::suggest(&record).lines() {
                println!("- {tip}");
            }
        }
        Commands::Report {
            record,
            charts,
            out,
        } => {
            let scorer = LinearScorer::load(&cli.model)?;
            let record = record.collect()?;
            let session = Session {
                scorer: &scorer,
                dataset: &cli.dataset,
                charts_dir: &charts,
            };
            let outcome = session.run(record);
            let report = report::build_report(&outcome, chrono::Utc::now());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match &outcome.prediction {
        Ok(score) => println!("Predicted Exam Score: {score:.2}"),
        Err(err) => println!("Prediction Failed: {err}"),
    }

    match &outcome.insights {
        Some(Ok(charts)) => {
            println!();
            println!("Data Insights:");
            for file in &charts.files {
                println!("- chart written to {}", file.display());
            }
            println!(
                "- your predicted score is at or above {:.1}% of past students",
                charts.context.percentile
            );
            for summary in &charts.context.by_motivation {
                println!(
                    "- {} motivation: {} students (avg score {:.1})",
                    summary.category, summary.count, summary.avg_score
                );
            }
        }
        Some(Err(err)) => println!("Plotting Failed: {err}"),
        None => {}
    }

    println!();
    println!("Smart Suggestions for Improvement:");
    for tip in outcome.suggestions.lines() {
        println!("- {tip}");
    }
}
