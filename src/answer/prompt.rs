//! Citation prompt construction
//!
//! Vector snippets and search results are numbered independently: snippets
//! carry `sourceNumber` (what the model cites), results carry `number` (what
//! the reference list resolves to a URL). Both start at 1.

use super::types::ChatMessage;
use crate::error::Result;
use crate::results::SearchResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reply the model is told to give when nothing relevant is available
pub const NO_RESULTS_REPLY: &str = "No relevant results found.";

/// A hit from the vector store; extra fields are passed to the model as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorSnippet {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VectorSnippet {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Snippet tagged for `[Source X]` citation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedSnippet<'a> {
    #[serde(flatten)]
    pub snippet: &'a VectorSnippet,
    pub source_number: usize,
}

/// Entry of the reference list
#[derive(Debug, Serialize)]
pub struct NumberedReference<'a> {
    pub number: usize,
    pub title: &'a str,
    pub link: &'a str,
}

pub fn number_snippets(snippets: &[VectorSnippet]) -> Vec<NumberedSnippet<'_>> {
    snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| NumberedSnippet {
            snippet,
            source_number: i + 1,
        })
        .collect()
}

pub fn number_references(results: &[SearchResult]) -> Vec<NumberedReference<'_>> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| NumberedReference {
            number: i + 1,
            title: &result.title,
            link: &result.link,
        })
        .collect()
}

/// Rules the model must follow: Markdown, detail, citations, reference list
pub fn system_instruction(query: &str, reference_count: usize) -> String {
    format!(
        r#"
  - Here is my query "{query}", respond back ALWAYS IN MARKDOWN and be verbose with a lot of details, never mention the system message.
  - Always cite your sources using [Source X] format where X is the number of the source.
  - Each source is numbered from 1 to {reference_count}.
  - After citing a source, include its link in a reference list at the end of your response.
  - If you can't find any relevant results, respond with "{NO_RESULTS_REPLY}"
"#
    )
}

/// Numbered snippet content and references, serialized as pretty JSON
pub fn user_message(snippets: &[VectorSnippet], results: &[SearchResult]) -> Result<String> {
    let content = serde_json::to_string_pretty(&number_snippets(snippets))?;
    let references = serde_json::to_string_pretty(&number_references(results))?;

    Ok(format!(
        "Here are the numbered sources to use in your response:

Content from sources:
{content}

Source References:
{references}

Please provide a detailed answer using these sources, citing them with [Source X] format. \
Include a reference list at the end with the links to the cited sources."
    ))
}

/// System + user messages for one answer
pub fn build_messages(
    query: &str,
    snippets: &[VectorSnippet],
    results: &[SearchResult],
) -> Result<Vec<ChatMessage>> {
    Ok(vec![
        ChatMessage::system(system_instruction(query, results.len())),
        ChatMessage::user(user_message(snippets, results)?),
    ])
}
