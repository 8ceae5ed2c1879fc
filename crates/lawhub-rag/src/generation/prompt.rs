//! Prompt and answer templates for legal question answering

use crate::retrieval::RetrievedChunk;

/// Generic next steps closing every extractive answer
const NEXT_STEPS: &[&str] = &[
    "Review the relevant constitutional provisions",
    "Consult with a legal expert for specific advice",
    "Gather necessary documentation",
    "Follow proper legal procedures",
];

/// Prompt builder for grounded legal answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate chunk text, separated by blank lines
    pub fn build_context(chunks: &[RetrievedChunk]) -> String {
        chunks
            .iter()
            .map(|retrieved| retrieved.chunk.text.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the step-structured legal prompt.
    ///
    /// The section headings double as degenerate-output markers: a model
    /// that repeats them back has not answered.
    pub fn build_legal_prompt(document_title: &str, question: &str, context: &str) -> String {
        format!(
            r#"You are a professional legal assistant. Based on the provided constitutional context, provide a clear, step-by-step answer to the user's legal question.

Context from {title}:
{context}

User Question: {question}

Provide a structured response with:

1. Immediate Actions Required (if any)
2. Step-by-Step Legal Process
3. Important Legal Rights
4. When to Seek Professional Help
5. Key Considerations

Format with clear step numbers, emojis, and practical advice. Be specific and actionable based on the constitutional context.

Answer:"#,
            title = document_title,
            context = context,
            question = question
        )
    }

    /// Render an extractive answer body from selected lines
    pub fn build_extractive_answer(document_title: &str, lines: &[String]) -> String {
        let bullets = lines
            .iter()
            .map(|line| format!("• {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        let next_steps = NEXT_STEPS
            .iter()
            .map(|step| format!("• {}", step))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Here's what the {} says about your question:\n\n{}\n\n📋 Next Steps:\n{}",
            document_title, bullets, next_steps
        )
    }
}
