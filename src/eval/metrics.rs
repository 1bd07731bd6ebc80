//! Per-answer scoring: keyword coverage, length sanity, citations, the
//! hallucination heuristic, refusal correctness, and the composite score.
//!
//! The hallucination check is a crude proxy (no sources + long answer + no
//! hedging language); treat it as a signal, not ground truth.

use serde::Serialize;
use std::collections::HashSet;

/// Phrases that count as the system declining to assert a claim.
pub const REFUSAL_MARKERS: [&str; 5] = ["不确定", "不知道", "无法回答", "抱歉", "没有找到"];

/// Narrower marker set used by the hallucination check.
const HEDGING_MARKERS: [&str; 3] = ["没有找到", "无法", "不确定"];

/// An answer this long with no sources and no hedging is flagged.
const HALLUCINATION_MIN_CHARS: usize = 100;

const LENGTH_MIN: usize = 50;
const LENGTH_MAX: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct QualityMetrics {
    pub keyword_coverage: f64,
    pub matched_keywords: Vec<String>,
    pub length_score: f64,
    pub answer_length: usize,
    pub has_refuse: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CitationMetrics {
    pub has_citation: bool,
    pub citation_count: usize,
    pub unique_sources: usize,
    pub diversity: f64,
}

/// Score answer text against the case's expected keywords.
pub fn evaluate_answer_quality(answer: &str, expected_keywords: &[&str]) -> QualityMetrics {
    let answer_lower = answer.to_lowercase();
    let matched_keywords: Vec<String> = expected_keywords
        .iter()
        .filter(|kw| answer_lower.contains(&kw.to_lowercase()))
        .map(|kw| kw.to_string())
        .collect();
    let keyword_coverage = if expected_keywords.is_empty() {
        0.0
    } else {
        matched_keywords.len() as f64 / expected_keywords.len() as f64
    };

    let answer_length = answer.chars().count();
    let length_score = if (LENGTH_MIN..=LENGTH_MAX).contains(&answer_length) {
        1.0
    } else {
        0.5
    };

    QualityMetrics {
        keyword_coverage,
        matched_keywords,
        length_score,
        answer_length,
        has_refuse: has_refusal_marker(answer),
    }
}

pub fn evaluate_citation(sources: &[String]) -> CitationMetrics {
    let citation_count = sources.len();
    let unique_sources = sources.iter().collect::<HashSet<_>>().len();
    CitationMetrics {
        has_citation: citation_count > 0,
        citation_count,
        unique_sources,
        diversity: if citation_count > 0 {
            unique_sources as f64 / citation_count as f64
        } else {
            0.0
        },
    }
}

pub fn has_refusal_marker(answer: &str) -> bool {
    REFUSAL_MARKERS.iter().any(|m| answer.contains(m))
}

/// True iff the answer is long, cites nothing, and never hedges.
pub fn detect_hallucination(answer: &str, sources: &[String]) -> bool {
    sources.is_empty()
        && answer.chars().count() > HALLUCINATION_MIN_CHARS
        && !HEDGING_MARKERS.iter().any(|m| answer.contains(m))
}

/// Composite score. Refuse cases are all-or-nothing; everything else is a
/// weighted blend of coverage, length, citation presence, and the
/// hallucination flag.
pub fn composite_score(
    should_refuse: bool,
    quality: &QualityMetrics,
    citation: &CitationMetrics,
    has_hallucination: bool,
) -> f64 {
    if should_refuse {
        return if quality.has_refuse { 1.0 } else { 0.0 };
    }
    let citation_score = if citation.has_citation { 1.0 } else { 0.0 };
    let grounded_score = if has_hallucination { 0.0 } else { 1.0 };
    quality.keyword_coverage * 0.4
        + quality.length_score * 0.2
        + citation_score * 0.3
        + grounded_score * 0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("doc{i}.pdf")).collect()
    }

    #[test]
    fn test_keyword_coverage_is_case_insensitive() {
        let quality =
            evaluate_answer_quality("nicad是基于文本规范化的工具", &["NiCad", "Token"]);
        assert_eq!(quality.keyword_coverage, 0.5);
        assert_eq!(quality.matched_keywords, vec!["NiCad"]);
    }

    #[test]
    fn test_length_score_inside_and_outside_band() {
        let inside = "字".repeat(200);
        assert_eq!(evaluate_answer_quality(&inside, &[]).length_score, 1.0);

        let too_short = "短回答";
        assert_eq!(evaluate_answer_quality(too_short, &[]).length_score, 0.5);

        let too_long = "字".repeat(1500);
        assert_eq!(evaluate_answer_quality(&too_long, &[]).length_score, 0.5);
    }

    #[test]
    fn test_citation_diversity() {
        let mut list = sources(3);
        list.push("doc0.pdf".to_string());
        let citation = evaluate_citation(&list);
        assert!(citation.has_citation);
        assert_eq!(citation.citation_count, 4);
        assert_eq!(citation.unique_sources, 3);
        assert!((citation.diversity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_no_sources_no_citation() {
        let citation = evaluate_citation(&[]);
        assert!(!citation.has_citation);
        assert_eq!(citation.diversity, 0.0);
    }

    #[test]
    fn test_hallucination_long_unsourced_answer() {
        let answer = "这".repeat(150);
        assert!(detect_hallucination(&answer, &[]));
    }

    #[test]
    fn test_hallucination_suppressed_by_hedging() {
        let answer = format!("{}没有找到相关资料。", "这".repeat(150));
        assert!(!detect_hallucination(&answer, &[]));
    }

    #[test]
    fn test_hallucination_needs_empty_sources() {
        let answer = "这".repeat(150);
        assert!(!detect_hallucination(&answer, &sources(1)));
    }

    #[test]
    fn test_short_answer_is_not_hallucination() {
        assert!(!detect_hallucination("简短回答", &[]));
    }

    #[test]
    fn test_composite_score_scenario() {
        // coverage 0.75, length 1.0, cited, no hallucination → 0.9
        let quality = QualityMetrics {
            keyword_coverage: 0.75,
            matched_keywords: vec![],
            length_score: 1.0,
            answer_length: 200,
            has_refuse: false,
        };
        let citation = evaluate_citation(&sources(2));
        let score = composite_score(false, &quality, &citation, false);
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_refuse_case_is_all_or_nothing() {
        let mut quality = evaluate_answer_quality("详细讲解了天气预报的原理", &[]);
        let citation = evaluate_citation(&[]);
        assert_eq!(composite_score(true, &quality, &citation, false), 0.0);

        quality.has_refuse = true;
        assert_eq!(composite_score(true, &quality, &citation, false), 1.0);
    }
}
