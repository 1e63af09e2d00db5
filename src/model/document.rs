use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed card: optional front matter plus top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Front matter key/value pairs, present only when the card opens
    /// with a `---` block
    pub meta: Option<IndexMap<String, String>>,
    /// Top-level blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a document with no front matter.
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { meta: None, blocks }
    }

    /// Look up a front matter value by key.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key).map(String::as_str)
    }
}

/// A structural unit, top-level or nested under a list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    /// `# Title` — level counts the leading `#` run
    Header { level: usize, text: Text },
    /// Fenced code; lines are stored raw, unescaped
    CodeBlock { lang: String, lines: Vec<String> },
    /// An indented run of inline text
    Quoted { text: Text },
    /// ` [x] ` / ` [ ] ` items
    Checklist { items: Vec<CheckItem> },
    /// ` - ` items
    BulletList { items: Vec<BulletItem> },
    /// A plain paragraph
    Text(Text),
}

/// One checklist entry and the blocks nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub checked: bool,
    pub content: Vec<Block>,
}

/// One bullet entry and the blocks nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletItem {
    pub content: Vec<Block>,
}

/// A run of inline spans: one paragraph, title, quote body, or item line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub spans: Vec<Span>,
}

impl Text {
    pub fn new(spans: Vec<Span>) -> Self {
        Text { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// An inline run with its delimiters stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Span {
    /// Undelimited text
    Plain(String),
    /// `*strong*`
    Strong(String),
    /// `_emphasis_`
    Em(String),
    /// `` `code` ``
    Code(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_value_lookup() {
        let mut meta = IndexMap::new();
        meta.insert("title".to_string(), "Sprint notes".to_string());
        let doc = Document {
            meta: Some(meta),
            blocks: Vec::new(),
        };
        assert_eq!(doc.meta_value("title"), Some("Sprint notes"));
        assert_eq!(doc.meta_value("owner"), None);
        assert_eq!(Document::new(Vec::new()).meta_value("title"), None);
    }

    #[test]
    fn test_document_serializes_for_the_renderer() {
        let doc = Document::new(vec![
            Block::Header {
                level: 2,
                text: Text::new(vec![Span::Plain("Plan".to_string())]),
            },
            Block::Text(Text::new(vec![
                Span::Plain("see ".to_string()),
                Span::Code("lexer.rs".to_string()),
            ])),
        ]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["blocks"][0]["type"], "header");
        assert_eq!(json["blocks"][0]["value"]["level"], 2);
        assert_eq!(
            json["blocks"][1]["value"]["spans"][1]["type"],
            "code"
        );

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
