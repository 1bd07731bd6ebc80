//! Aggregation and report output: a machine-readable JSON results file and a
//! human-readable Markdown summary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::eval::cases::Difficulty;
use crate::eval::CaseResult;

#[derive(Debug, Clone, Serialize)]
pub struct GroupStat {
    pub name: String,
    pub mean_score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    pub case_count: usize,
    pub mean_score: f64,
    pub avg_response_time_secs: f64,
    /// Mean keyword coverage over non-refuse cases
    pub avg_keyword_coverage: f64,
    pub citation_rate: f64,
    pub avg_citation_count: f64,
    pub hallucination_rate: f64,
    /// None when the case set contains no refuse cases
    pub refusal_accuracy: Option<f64>,
    pub by_category: Vec<GroupStat>,
    pub by_difficulty: Vec<GroupStat>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}

/// Aggregate valid case records. Records carrying an error are excluded
/// from every metric denominator.
pub fn aggregate(results: &[CaseResult]) -> Aggregates {
    let valid: Vec<&CaseResult> = results.iter().filter(|r| r.is_valid()).collect();

    let mean_score = mean(valid.iter().map(|r| r.score));
    let avg_response_time_secs = mean(valid.iter().map(|r| r.response_time_secs));

    let avg_keyword_coverage = mean(
        valid
            .iter()
            .filter(|r| !r.should_refuse)
            .filter_map(|r| r.quality_metrics.as_ref())
            .map(|q| q.keyword_coverage),
    );

    let cited = valid
        .iter()
        .filter(|r| {
            r.citation_metrics
                .as_ref()
                .is_some_and(|c| c.has_citation)
        })
        .count();
    let citation_rate = if valid.is_empty() {
        0.0
    } else {
        cited as f64 / valid.len() as f64
    };
    let avg_citation_count = mean(
        valid
            .iter()
            .filter_map(|r| r.citation_metrics.as_ref())
            .map(|c| c.citation_count as f64),
    );

    let hallucinated = valid.iter().filter(|r| r.has_hallucination).count();
    let hallucination_rate = if valid.is_empty() {
        0.0
    } else {
        hallucinated as f64 / valid.len() as f64
    };

    let refuse_cases: Vec<&&CaseResult> =
        valid.iter().filter(|r| r.should_refuse).collect();
    let refusal_accuracy = if refuse_cases.is_empty() {
        None
    } else {
        let correct = refuse_cases.iter().filter(|r| r.correct_refuse).count();
        Some(correct as f64 / refuse_cases.len() as f64)
    };

    Aggregates {
        case_count: valid.len(),
        mean_score,
        avg_response_time_secs,
        avg_keyword_coverage,
        citation_rate,
        avg_citation_count,
        hallucination_rate,
        refusal_accuracy,
        by_category: group_stats(&valid, |r| r.category.label()),
        by_difficulty: difficulty_stats(&valid),
    }
}

fn group_stats(valid: &[&CaseResult], key: impl Fn(&CaseResult) -> &'static str) -> Vec<GroupStat> {
    let mut groups: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for result in valid {
        groups.entry(key(result)).or_default().push(result.score);
    }
    groups
        .into_iter()
        .map(|(name, scores)| GroupStat {
            name: name.to_string(),
            mean_score: scores.iter().sum::<f64>() / scores.len() as f64,
            count: scores.len(),
        })
        .collect()
}

/// Difficulty stats in easy → medium → hard order, excluding n/a.
fn difficulty_stats(valid: &[&CaseResult]) -> Vec<GroupStat> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .filter_map(|difficulty| {
            let scores: Vec<f64> = valid
                .iter()
                .filter(|r| r.difficulty == difficulty)
                .map(|r| r.score)
                .collect();
            if scores.is_empty() {
                return None;
            }
            Some(GroupStat {
                name: difficulty.label().to_string(),
                mean_score: scores.iter().sum::<f64>() / scores.len() as f64,
                count: scores.len(),
            })
        })
        .collect()
}

/// Write the full per-case records as pretty-printed JSON.
pub fn write_json(path: &Path, results: &[CaseResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)
        .context("Failed to serialize evaluation results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Detailed results written to {}", path.display());
    Ok(())
}

/// Write the Markdown summary: overview, core metrics, per-category and
/// per-difficulty tables, narrative conclusions.
pub fn write_markdown(path: &Path, aggregates: &Aggregates, model_name: &str) -> Result<()> {
    let mut report = String::new();

    report.push_str("# RAG 系统评估报告\n\n");
    report.push_str("## 评估概览\n\n");
    report.push_str(&format!(
        "- **评估时间**: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("- **测试样本数**: {}\n", aggregates.case_count));
    report.push_str(&format!("- **模型**: {model_name}\n\n"));

    report.push_str("## 核心指标\n\n");
    report.push_str("| 指标 | 数值 | 说明 |\n|------|------|------|\n");
    report.push_str(&format!(
        "| **总体得分** | {:.2}% | 综合评分 |\n",
        aggregates.mean_score * 100.0
    ));
    report.push_str(&format!(
        "| **准确率** | {:.2}% | 关键词覆盖率 |\n",
        aggregates.avg_keyword_coverage * 100.0
    ));
    report.push_str(&format!(
        "| **引用率** | {:.2}% | 提供引用来源的比例 |\n",
        aggregates.citation_rate * 100.0
    ));
    report.push_str(&format!(
        "| **幻觉率** | {:.2}% | 无依据回答的比例 |\n",
        aggregates.hallucination_rate * 100.0
    ));
    if let Some(refusal_accuracy) = aggregates.refusal_accuracy {
        report.push_str(&format!(
            "| **拒绝准确率** | {:.2}% | 域外问题被正确拒绝的比例 |\n",
            refusal_accuracy * 100.0
        ));
    }
    report.push_str(&format!(
        "| **平均响应时间** | {:.2}秒 | 包含检索和生成 |\n\n",
        aggregates.avg_response_time_secs
    ));

    report.push_str("## 详细分析\n\n### 按类别统计\n\n");
    report.push_str("| 类别 | 得分 | 样本数 |\n|------|------|--------|\n");
    for stat in &aggregates.by_category {
        report.push_str(&format!(
            "| {} | {:.2}% | {} |\n",
            stat.name,
            stat.mean_score * 100.0,
            stat.count
        ));
    }

    report.push_str("\n### 按难度统计\n\n");
    report.push_str("| 难度 | 得分 | 样本数 |\n|------|------|--------|\n");
    for stat in &aggregates.by_difficulty {
        report.push_str(&format!(
            "| {} | {:.2}% | {} |\n",
            stat.name,
            stat.mean_score * 100.0,
            stat.count
        ));
    }

    report.push_str("\n## 结论\n\n");
    report.push_str(&format!(
        "1. **准确率**: 系统在关键词覆盖方面达到 {:.2}%\n",
        aggregates.avg_keyword_coverage * 100.0
    ));
    report.push_str(&format!(
        "2. **引用质量**: {:.2}% 的回答提供了引用来源\n",
        aggregates.citation_rate * 100.0
    ));
    report.push_str(&format!(
        "3. **幻觉控制**: 幻觉率为 {:.2}%\n",
        aggregates.hallucination_rate * 100.0
    ));
    report.push_str(&format!(
        "4. **响应速度**: 平均响应时间 {:.2}秒\n",
        aggregates.avg_response_time_secs
    ));

    std::fs::write(path, report)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Markdown report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::cases::Category;
    use crate::eval::metrics::{CitationMetrics, QualityMetrics};

    fn valid_result(
        category: Category,
        difficulty: Difficulty,
        score: f64,
        cited: bool,
    ) -> CaseResult {
        CaseResult {
            question: "q".into(),
            category,
            difficulty,
            should_refuse: false,
            score,
            response_time_secs: 2.0,
            answer: Some("a".into()),
            sources: if cited { vec!["s.pdf".into()] } else { vec![] },
            confidence: None,
            quality_metrics: Some(QualityMetrics {
                keyword_coverage: score,
                matched_keywords: vec![],
                length_score: 1.0,
                answer_length: 100,
                has_refuse: false,
            }),
            citation_metrics: Some(CitationMetrics {
                has_citation: cited,
                citation_count: usize::from(cited),
                unique_sources: usize::from(cited),
                diversity: if cited { 1.0 } else { 0.0 },
            }),
            has_hallucination: false,
            correct_refuse: false,
            incorrect_refuse: false,
            error: None,
        }
    }

    fn failed_result() -> CaseResult {
        CaseResult {
            question: "q".into(),
            category: Category::Concept,
            difficulty: Difficulty::Easy,
            should_refuse: false,
            score: 0.0,
            response_time_secs: 0.1,
            answer: None,
            sources: vec![],
            confidence: None,
            quality_metrics: None,
            citation_metrics: None,
            has_hallucination: false,
            correct_refuse: false,
            incorrect_refuse: false,
            error: Some("provider down".into()),
        }
    }

    #[test]
    fn test_errors_excluded_from_denominators() {
        let results = vec![
            valid_result(Category::Concept, Difficulty::Easy, 1.0, true),
            valid_result(Category::Tool, Difficulty::Medium, 0.5, false),
            failed_result(),
        ];

        let aggregates = aggregate(&results);
        assert_eq!(aggregates.case_count, 2);
        assert!((aggregates.mean_score - 0.75).abs() < 1e-9);
        assert!((aggregates.citation_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_group_tables() {
        let results = vec![
            valid_result(Category::Concept, Difficulty::Easy, 1.0, true),
            valid_result(Category::Concept, Difficulty::Hard, 0.0, true),
            valid_result(Category::Tool, Difficulty::Medium, 0.5, true),
        ];

        let aggregates = aggregate(&results);

        let concept = aggregates
            .by_category
            .iter()
            .find(|s| s.name == "concept")
            .unwrap();
        assert_eq!(concept.count, 2);
        assert!((concept.mean_score - 0.5).abs() < 1e-9);

        let names: Vec<&str> = aggregates
            .by_difficulty
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["easy", "medium", "hard"]);
    }

    #[test]
    fn test_report_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![valid_result(Category::Concept, Difficulty::Easy, 0.9, true)];
        let aggregates = aggregate(&results);

        let json_path = dir.path().join("evaluation_results.json");
        let md_path = dir.path().join("evaluation_report.md");
        write_json(&json_path, &results).unwrap();
        write_markdown(&md_path, &aggregates, "Qwen2.5-Coder-1.5B").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);

        let md = std::fs::read_to_string(&md_path).unwrap();
        assert!(md.contains("# RAG 系统评估报告"));
        assert!(md.contains("| concept |"));
        assert!(md.contains("Qwen2.5-Coder-1.5B"));
    }
}
