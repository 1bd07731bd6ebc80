//! Query intent classification and the out-of-domain gate.
//!
//! Both are keyword heuristics over the (mostly Chinese) question text,
//! matching the domain corpus language. Classification is exhaustive: every
//! question maps to exactly one [`Intent`] variant.

/// Questions containing any of these are clearly outside the clone-detection
/// domain and are refused without retrieval.
const OUT_OF_DOMAIN_KEYWORDS: [&str; 16] = [
    "天气",
    "股票",
    "彩票",
    "明天",
    "今天的新闻",
    "做菜",
    "烹饪",
    "旅游",
    "购物",
    "电影",
    "音乐",
    "体育",
    "足球",
    "篮球",
    "游戏",
    "娱乐",
];

/// Vocabulary that marks a question as in-domain.
const DOMAIN_KEYWORDS: [&str; 18] = [
    "代码", "克隆", "检测", "工具", "算法", "相似", "type", "ast", "token", "pdg", "nicad",
    "ccfinder", "复制", "重复", "软件", "程序", "函数", "变量",
];

/// Very short questions with no domain vocabulary are treated as
/// out-of-domain rather than guessed at.
const MIN_QUESTION_CHARS: usize = 10;

const COMPARISON_MARKERS: [&str; 3] = ["比较", "对比", "vs"];
const DEFINITION_MARKERS: [&str; 3] = ["解释", "什么是", "定义"];
const CODE_MARKERS: [&str; 3] = ["代码", "函数", "类"];

/// The recognized question intents. Each selects its own prompt template
/// and retrieval shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Default open question answering
    General,
    /// Tool comparison, retrieval restricted to tool documentation
    Comparison,
    /// Concept explanation; carries the concept with markers stripped
    Definition { concept: String },
    /// Analysis of a code fragment or code-centric question
    CodeAnalysis,
}

/// True if the question should be refused before any retrieval happens.
pub fn is_out_of_domain(question: &str) -> bool {
    let lower = question.to_lowercase();

    if OUT_OF_DOMAIN_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }

    let has_domain_keyword = DOMAIN_KEYWORDS.iter().any(|kw| lower.contains(kw));
    question.chars().count() < MIN_QUESTION_CHARS && !has_domain_keyword
}

/// Classify a question into an intent. Marker checks run in priority order:
/// comparison, then definition, then code analysis, defaulting to general.
pub fn classify(question: &str) -> Intent {
    let lower = question.to_lowercase();

    if COMPARISON_MARKERS.iter().any(|m| lower.contains(m)) {
        return Intent::Comparison;
    }

    if DEFINITION_MARKERS.iter().any(|m| lower.contains(m)) {
        let concept = extract_concept(question);
        if !concept.is_empty() {
            return Intent::Definition { concept };
        }
    }

    if CODE_MARKERS.iter().any(|m| lower.contains(m)) {
        return Intent::CodeAnalysis;
    }

    Intent::General
}

/// Strip the definition markers from the question, leaving the concept text.
fn extract_concept(question: &str) -> String {
    let mut concept = question.to_string();
    for marker in DEFINITION_MARKERS {
        concept = concept.replace(marker, "");
    }
    concept.trim().trim_end_matches(['？', '?']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_question_is_out_of_domain() {
        assert!(is_out_of_domain("明天天气怎么样？"));
    }

    #[test]
    fn test_cooking_question_is_out_of_domain() {
        assert!(is_out_of_domain("如何做红烧肉？"));
    }

    #[test]
    fn test_domain_question_passes_gate() {
        assert!(!is_out_of_domain("什么是代码克隆检测？"));
        assert!(!is_out_of_domain("NiCad工具的特点是什么？"));
    }

    #[test]
    fn test_short_question_without_domain_keywords_is_gated() {
        assert!(is_out_of_domain("你好吗？"));
    }

    #[test]
    fn test_short_question_with_domain_keyword_passes() {
        // 6 chars, but mentions AST
        assert!(!is_out_of_domain("AST是什么"));
    }

    #[test]
    fn test_comparison_intent() {
        assert_eq!(classify("比较NiCad和CCFinder工具"), Intent::Comparison);
        assert_eq!(classify("NiCad vs CCFinder"), Intent::Comparison);
    }

    #[test]
    fn test_definition_intent_extracts_concept() {
        assert_eq!(
            classify("什么是Type-1代码克隆？"),
            Intent::Definition {
                concept: "Type-1代码克隆".to_string()
            }
        );
        assert_eq!(
            classify("解释抽象语法树"),
            Intent::Definition {
                concept: "抽象语法树".to_string()
            }
        );
    }

    #[test]
    fn test_code_analysis_intent() {
        assert_eq!(classify("这个函数有克隆吗"), Intent::CodeAnalysis);
    }

    #[test]
    fn test_general_is_the_default() {
        assert_eq!(classify("克隆检测面临哪些挑战"), Intent::General);
    }

    #[test]
    fn test_comparison_wins_over_code_markers() {
        // Mentions 代码 but the comparison marker takes priority
        assert_eq!(classify("对比两个代码检测工具"), Intent::Comparison);
    }
}
