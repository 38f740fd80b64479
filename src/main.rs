use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aggregate;
mod api;
mod config;
mod error;
mod loader;
mod metrics;
mod models;
mod report;
mod store;

use crate::config::Config;
use crate::store::StudentStore;

#[derive(Parser)]
#[command(name = "student-metrics")]
#[command(about = "Student performance scoring and summary API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the student API from an in-memory roster
    Serve {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the student CSV, JSON summary and markdown reports
    Report {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the highest scoring students
    Score {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_metrics=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { csv, port } => {
            if let Some(csv) = csv {
                config.students_csv = csv;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Commands::Report { csv, out_dir } => {
            let csv = csv.unwrap_or(config.students_csv);
            let out_dir = out_dir.unwrap_or(config.report_dir);
            let students = loader::load_scored(&csv)
                .with_context(|| format!("failed to load {}", csv.display()))?;
            let (summary, paths) = report::generate_reports(&csv, &out_dir, &students)?;

            println!("CSV report generated: {}", paths.students_csv.display());
            println!("JSON report generated: {}", paths.summary_json.display());
            println!("Markdown report generated: {}", paths.summary_markdown.display());
            println!(
                "{} students, {} at risk.",
                summary.total_students, summary.at_risk_count
            );

            println!();
            println!("Sample student metrics:");
            for student in students.iter().take(3) {
                println!(
                    "- {} {}: assignment avg {:.2}, quiz avg {:.2}, final score {:.2}, {}, at risk: {}",
                    student.student_id(),
                    student.raw.name,
                    student.assignment_avg,
                    student.quiz_avg,
                    student.final_score,
                    student.category,
                    student.is_at_risk
                );
            }
        }
        Commands::Score { csv, limit } => {
            let csv = csv.unwrap_or(config.students_csv);
            let mut students = loader::load_scored(&csv)
                .with_context(|| format!("failed to load {}", csv.display()))?;

            if students.is_empty() {
                println!("No students found in {}.", csv.display());
                return Ok(());
            }

            students.sort_by(|a, b| {
                b.final_score
                    .partial_cmp(&a.final_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            println!("Top students by final score:");
            for student in students.iter().take(limit) {
                println!(
                    "- {} ({}, {}) score {:.2} {}{}",
                    student.raw.name,
                    student.student_id(),
                    student.raw.program,
                    student.final_score,
                    student.category,
                    if student.is_at_risk { " [at risk]" } else { "" }
                );
            }
        }
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = match loader::load_scored(&config.students_csv)
        .and_then(StudentStore::from_students)
    {
        Ok(store) => {
            info!("Loaded {} students from {}", store.len(), config.students_csv.display());
            store
        }
        Err(e) => {
            error!(
                "Failed to load {}: {} - starting with an empty roster",
                config.students_csv.display(),
                e
            );
            StudentStore::new()
        }
    };

    let app = api::router(api::AppState::new(store))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C signal"),
        Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
    }
}
