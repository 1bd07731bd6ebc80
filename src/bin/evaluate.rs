//! Evaluation CLI: runs the fixed question set through the live pipeline and
//! writes a JSON results file plus a Markdown summary report.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use clone_rag::config::Config;
use clone_rag::eval::{cases, report, Evaluator};
use clone_rag::ingest::run_ingestion;
use clone_rag::state::{AppState, PipelineState};

#[derive(Parser)]
#[command(name = "evaluate", about = "Evaluate the clone-rag answer pipeline")]
struct Args {
    /// Model size preset: "1.5b" or "7b"
    #[arg(long, default_value = "1.5b")]
    model: String,

    /// Rebuild the vector index before evaluating
    #[arg(long)]
    force_refresh: bool,

    /// Output path for the per-case JSON results
    #[arg(long, default_value = "evaluation_results.json")]
    results: PathBuf,

    /// Output path for the Markdown summary report
    #[arg(long, default_value = "evaluation_report.md")]
    report: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env().with_model_size(&args.model);
    let model_name = config.llm.chat_model.clone();

    tracing::info!(model = %model_name, "Preparing evaluation");

    let state = AppState::new(config)?;
    state.set_pipeline_state(PipelineState::Loading);
    let outcome = run_ingestion(
        &state.config,
        Arc::clone(&state.embedder),
        args.force_refresh,
    )
    .await?;
    state.retriever.attach(Arc::clone(&outcome.store));
    state.set_pipeline_state(PipelineState::Ready);
    tracing::info!(
        chunks = outcome.report.chunks_indexed,
        reused = outcome.report.reused_existing,
        "Index ready"
    );

    let case_set = cases::evaluation_cases();
    let evaluator = Evaluator::new(Arc::clone(&state.engine));
    let results = evaluator.run(&case_set).await;

    let aggregates = report::aggregate(&results);
    report::write_json(&args.results, &results)?;
    report::write_markdown(&args.report, &aggregates, &model_name)?;

    tracing::info!(
        "Evaluation complete: score {:.2}%, citation rate {:.2}%, hallucination rate {:.2}%",
        aggregates.mean_score * 100.0,
        aggregates.citation_rate * 100.0,
        aggregates.hallucination_rate * 100.0
    );

    Ok(())
}
