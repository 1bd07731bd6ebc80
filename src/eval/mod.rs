//! End-to-end evaluation: drive the answer engine over the fixed case set,
//! score every answer, and aggregate into a report.
//!
//! A failing case is recorded with score 0.0 and an error field; it never
//! aborts the run.

pub mod cases;
pub mod metrics;
pub mod report;

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::eval::cases::{Category, Difficulty, EvaluationCase};
use crate::eval::metrics::{CitationMetrics, QualityMetrics};
use crate::models::Confidence;
use crate::rag::AnswerEngine;

/// Full per-case scoring record, serialized into the JSON results file.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub question: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub should_refuse: bool,
    pub score: f64,
    pub response_time_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_metrics: Option<CitationMetrics>,
    pub has_hallucination: bool,
    pub correct_refuse: bool,
    pub incorrect_refuse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseResult {
    /// Whether this record carries usable metrics.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Evaluator {
    engine: Arc<AnswerEngine>,
}

impl Evaluator {
    pub fn new(engine: Arc<AnswerEngine>) -> Self {
        Self { engine }
    }

    /// Run every case, in order, returning one record per case.
    pub async fn run(&self, case_set: &[EvaluationCase]) -> Vec<CaseResult> {
        let mut results = Vec::with_capacity(case_set.len());

        for (idx, case) in case_set.iter().enumerate() {
            tracing::info!(
                case = idx + 1,
                total = case_set.len(),
                category = case.category.label(),
                "Evaluating: {}",
                case.question
            );
            results.push(self.run_case(case).await);
        }

        results
    }

    async fn run_case(&self, case: &EvaluationCase) -> CaseResult {
        let started = Instant::now();

        match self.engine.respond(case.question).await {
            Ok(result) => {
                let response_time_secs = started.elapsed().as_secs_f64();

                let quality =
                    metrics::evaluate_answer_quality(&result.answer, case.expected_keywords);
                let citation = metrics::evaluate_citation(&result.sources);
                let has_hallucination =
                    metrics::detect_hallucination(&result.answer, &result.sources);

                let correct_refuse = case.should_refuse && quality.has_refuse;
                let incorrect_refuse = !case.should_refuse && quality.has_refuse;
                let score = metrics::composite_score(
                    case.should_refuse,
                    &quality,
                    &citation,
                    has_hallucination,
                );

                CaseResult {
                    question: case.question.to_string(),
                    category: case.category,
                    difficulty: case.difficulty,
                    should_refuse: case.should_refuse,
                    score,
                    response_time_secs,
                    answer: Some(result.answer),
                    sources: result.sources,
                    confidence: Some(result.confidence),
                    quality_metrics: Some(quality),
                    citation_metrics: Some(citation),
                    has_hallucination,
                    correct_refuse,
                    incorrect_refuse,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Case failed: {e:#}");
                CaseResult {
                    question: case.question.to_string(),
                    category: case.category,
                    difficulty: case.difficulty,
                    should_refuse: case.should_refuse,
                    score: 0.0,
                    response_time_secs: started.elapsed().as_secs_f64(),
                    answer: None,
                    sources: Vec::new(),
                    confidence: None,
                    quality_metrics: None,
                    citation_metrics: None,
                    has_hallucination: false,
                    correct_refuse: false,
                    incorrect_refuse: false,
                    error: Some(format!("{e:#}")),
                }
            }
        }
    }
}
