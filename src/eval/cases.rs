//! The fixed evaluation question set: 20 in-domain questions across three
//! categories and three difficulty levels, plus 2 questions the system must
//! refuse.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Concept,
    Tool,
    Technical,
    Uncertain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Concept => "concept",
            Category::Tool => "tool",
            Category::Technical => "technical",
            Category::Uncertain => "uncertain",
        }
    }
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::NotApplicable => "n/a",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationCase {
    pub question: &'static str,
    pub expected_keywords: &'static [&'static str],
    pub category: Category,
    pub difficulty: Difficulty,
    pub should_refuse: bool,
}

impl EvaluationCase {
    const fn new(
        question: &'static str,
        expected_keywords: &'static [&'static str],
        category: Category,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            question,
            expected_keywords,
            category,
            difficulty,
            should_refuse: false,
        }
    }

    const fn refuse(question: &'static str) -> Self {
        Self {
            question,
            expected_keywords: &[],
            category: Category::Uncertain,
            difficulty: Difficulty::NotApplicable,
            should_refuse: true,
        }
    }
}

pub fn evaluation_cases() -> Vec<EvaluationCase> {
    use Category::*;
    use Difficulty::*;

    vec![
        // Concept questions
        EvaluationCase::new(
            "什么是代码克隆检测？",
            &["代码克隆", "相似", "重复", "代码片段"],
            Concept,
            Easy,
        ),
        EvaluationCase::new(
            "Type-1克隆是什么？",
            &["Type-1", "完全相同", "空格", "注释"],
            Concept,
            Easy,
        ),
        EvaluationCase::new(
            "Type-2克隆和Type-1克隆有什么区别？",
            &["Type-2", "标识符", "变量名", "类型"],
            Concept,
            Medium,
        ),
        EvaluationCase::new(
            "Type-3克隆的特点是什么？",
            &["Type-3", "语句", "修改", "添加", "删除"],
            Concept,
            Medium,
        ),
        EvaluationCase::new(
            "Type-4克隆如何定义？",
            &["Type-4", "功能", "语义", "实现方式"],
            Concept,
            Hard,
        ),
        EvaluationCase::new(
            "什么是AST方法？",
            &["AST", "抽象语法树", "语法结构"],
            Concept,
            Medium,
        ),
        EvaluationCase::new(
            "Token方法的原理是什么？",
            &["Token", "词法", "序列", "匹配"],
            Concept,
            Medium,
        ),
        EvaluationCase::new(
            "什么是PDG方法？",
            &["PDG", "程序依赖图", "控制流", "数据流"],
            Concept,
            Hard,
        ),
        EvaluationCase::new(
            "代码克隆检测有哪些应用场景？",
            &["重构", "维护", "质量", "版权"],
            Concept,
            Easy,
        ),
        EvaluationCase::new(
            "代码克隆检测面临哪些挑战？",
            &["准确率", "召回率", "性能", "可扩展性"],
            Concept,
            Medium,
        ),
        // Tool questions
        EvaluationCase::new(
            "NiCad工具的特点是什么？",
            &["NiCad", "Type-1", "Type-2", "Type-3"],
            Tool,
            Medium,
        ),
        EvaluationCase::new(
            "CCFinder和NiCad有什么区别？",
            &["CCFinder", "NiCad", "Token", "AST"],
            Tool,
            Medium,
        ),
        EvaluationCase::new(
            "SourcererCC的优势是什么？",
            &["SourcererCC", "大规模", "可扩展", "性能"],
            Tool,
            Medium,
        ),
        EvaluationCase::new(
            "哪个工具适合检测Type-4克隆？",
            &["Type-4", "语义", "功能"],
            Tool,
            Hard,
        ),
        EvaluationCase::new(
            "开源克隆检测工具有哪些？",
            &["NiCad", "CCFinder", "SourcererCC", "JPlag"],
            Tool,
            Easy,
        ),
        // Technical questions
        EvaluationCase::new(
            "如何评估克隆检测工具的性能？",
            &["准确率", "召回率", "F1", "精确率"],
            Technical,
            Medium,
        ),
        EvaluationCase::new(
            "什么是克隆对？",
            &["克隆对", "代码片段", "相似"],
            Technical,
            Easy,
        ),
        EvaluationCase::new(
            "什么是克隆类？",
            &["克隆类", "等价类", "相似代码"],
            Technical,
            Medium,
        ),
        EvaluationCase::new(
            "如何处理大规模代码库的克隆检测？",
            &["索引", "分布式", "并行", "优化"],
            Technical,
            Hard,
        ),
        EvaluationCase::new(
            "克隆检测的时间复杂度是多少？",
            &["复杂度", "O(n", "性能"],
            Technical,
            Hard,
        ),
        // Out-of-domain questions the system must refuse
        EvaluationCase::refuse("明天天气怎么样？"),
        EvaluationCase::refuse("如何做红烧肉？"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_set_shape() {
        let cases = evaluation_cases();
        assert_eq!(cases.len(), 22);
        assert_eq!(cases.iter().filter(|c| c.should_refuse).count(), 2);
        assert_eq!(
            cases
                .iter()
                .filter(|c| c.category == Category::Concept)
                .count(),
            10
        );
        assert_eq!(
            cases.iter().filter(|c| c.category == Category::Tool).count(),
            5
        );
        assert_eq!(
            cases
                .iter()
                .filter(|c| c.category == Category::Technical)
                .count(),
            5
        );
    }

    #[test]
    fn test_refuse_cases_have_no_keywords() {
        for case in evaluation_cases().iter().filter(|c| c.should_refuse) {
            assert!(case.expected_keywords.is_empty());
            assert_eq!(case.difficulty, Difficulty::NotApplicable);
        }
    }
}
