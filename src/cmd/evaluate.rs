use crate::reports;
use clap::Args;
use std::fs;
use tracewise::error::TraceResult;
use tracewise::geometry::Point;
use tracewise::letters::ReferenceStore;
use tracewise::metrics::evaluate_handwriting;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// JSON array of strokes, each an array of `{x, y, timestamp}` points in logical units.
    #[arg(short, long)]
    pub strokes: String,

    #[arg(long, default_value = "A")]
    pub letter: String,
}

pub fn run(args: &EvaluateArgs, store: &ReferenceStore) -> TraceResult<()> {
    info!("📂 Loading strokes: {}", args.strokes);
    let content = fs::read_to_string(&args.strokes)?;
    let strokes: Vec<Vec<Point>> = serde_json::from_str(&content)?;

    let metrics = evaluate_handwriting(store, &args.letter, &strokes)?;
    reports::print_metrics(&args.letter, &metrics);
    Ok(())
}
