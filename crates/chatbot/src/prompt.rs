use retrieval::SourcePaper;

pub const SYSTEM_PROMPT: &str = "You are a friendly assistant that answers user questions concisely. \
Keep responses short and to the point unless the user asks for more detail. \
You may engage in light small talk and be empathetic, but always prioritize a clear, useful answer. \
When possible, use 1-3 short sentences or a short bullet list. \
Avoid long explanations and unnecessary background.";

pub const ACKNOWLEDGEMENT: &str = "Understood. I will provide a concise answer based on the context.";

pub const EMPTY_QUERY_REPLY: &str = "Please provide a query.";

pub const NO_CONTEXT_REPLY: &str =
    "I could not find any relevant information in the knowledge base to answer your question.";

/// The exact phrase the model must use when the context does not answer the question.
pub const NO_ANSWER_PHRASE: &str = "I don't have enough information to answer that.";

pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

pub fn build_context(texts: &[String]) -> String {
    texts.join(PASSAGE_SEPARATOR)
}

/// Numbered source list: `[1] Title (Authors)`, one per line.
pub fn format_sources(sources: &[SourcePaper]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] {} ({})", i + 1, s.title, s.authors))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_answer_prompt(query: &str, context: &str, sources: &str) -> String {
    format!(
        r#"Answer the user's question using ONLY the context below.

RULES:
- Answer in at most three sentences.
- Support every claim with a numbered citation like [1] or [2] that matches the SOURCES list.
- Do not cite sources that are not in the SOURCES list.
- If the context does not contain the answer, reply exactly: "{}"

CONTEXT:
{}

SOURCES:
{}

USER QUESTION: {}

ANSWER:"#,
        NO_ANSWER_PHRASE, context, sources, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sources_numbered() {
        let sources = vec![
            SourcePaper { title: "Mars Soil".into(), authors: "Kim, Lee".into() },
            SourcePaper { title: "Lunar Dust".into(), authors: "N/A".into() },
        ];
        assert_eq!(format_sources(&sources), "[1] Mars Soil (Kim, Lee)\n[2] Lunar Dust (N/A)");
    }

    #[test]
    fn test_prompt_contains_rules_and_inputs() {
        let context = build_context(&["one".to_string(), "two".to_string()]);
        assert_eq!(context, "one\n\n---\n\ntwo");

        let prompt = build_answer_prompt("why?", &context, "[1] T (A)");
        assert!(prompt.contains("at most three sentences"));
        assert!(prompt.contains(NO_ANSWER_PHRASE));
        assert!(prompt.contains("one\n\n---\n\ntwo"));
        assert!(prompt.contains("[1] T (A)"));
        assert!(prompt.contains("USER QUESTION: why?"));
    }
}
