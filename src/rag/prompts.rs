//! Prompt templates, one per intent. Template text is in Chinese to match
//! the corpus and the models it was tuned against.

use crate::rag::intent::Intent;

pub const SYSTEM_PROMPT: &str =
    "你是一个专业的代码克隆检测专家助手，请基于提供的文档内容准确回答问题。";

const GENERAL_QA_TEMPLATE: &str = "你是一个专业的代码克隆检测专家助手。你的任务是帮助开发者理解代码克隆检测的相关知识。

基于以下检索到的文档内容，回答用户的问题。如果文档中没有相关信息，请基于你的专业知识回答，并明确说明。

检索到的文档：
{context}

用户问题：{question}

请提供准确、详细、专业的回答。如果涉及技术概念，请给出清晰的解释和示例。

回答：";

const CODE_ANALYSIS_TEMPLATE: &str = "作为一个代码克隆检测专家，请分析以下代码片段或问题。

相关文档内容：
{context}

用户输入：
{question}

请从克隆检测的角度进行分析，包括：
1. 可能的克隆类型
2. 检测方法建议
3. 注意事项
4. 相关工具推荐

分析结果：";

const TOOL_COMPARISON_TEMPLATE: &str = "请比较不同的代码克隆检测工具。

相关文档：
{context}

用户询问：{question}

请提供详细的工具比较，包括：
- 各工具的特点和优势
- 适用场景
- 性能表现
- 使用难度

比较结果：";

const CONCEPT_TEMPLATE: &str = "请详细解释以下代码克隆检测相关的概念。

相关文档：
{context}

需要解释的概念：{question}

请提供：
1. 概念定义
2. 背景和动机
3. 主要特点
4. 应用场景
5. 相关研究或工具

解释：";

/// Fill the template for `intent` with the context block and question text.
/// Total over intents: every variant has a template.
pub fn render(intent: &Intent, context: &str, question: &str) -> String {
    let template = match intent {
        Intent::General => GENERAL_QA_TEMPLATE,
        Intent::Comparison => TOOL_COMPARISON_TEMPLATE,
        Intent::Definition { .. } => CONCEPT_TEMPLATE,
        Intent::CodeAnalysis => CODE_ANALYSIS_TEMPLATE,
    };
    template
        .replace("{context}", context)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_both_slots() {
        let prompt = render(&Intent::General, "文档内容", "什么是克隆对？");
        assert!(prompt.contains("文档内容"));
        assert!(prompt.contains("什么是克隆对？"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn test_each_intent_has_a_distinct_template() {
        let intents = [
            Intent::General,
            Intent::Comparison,
            Intent::Definition {
                concept: "AST".into(),
            },
            Intent::CodeAnalysis,
        ];
        let rendered: Vec<String> = intents.iter().map(|i| render(i, "c", "q")).collect();
        for (i, a) in rendered.iter().enumerate() {
            for b in rendered.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
