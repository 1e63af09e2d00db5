use crate::model::document::{Block, BulletItem, CheckItem, Document, Span, Text};
use crate::parse::token::{
    BACKTICK, BULLET, CHECKED_BOX, FENCE, META_DELIM, META_KV_DELIM, POUND, STAR, UNCHECKED_BOX,
    UNDER,
};

/// Canonical indent width for quoted blocks.
const QUOTE_INDENT: usize = 4;

/// Serialize a document to markup lines in canonical form.
/// Parsing the output yields the same document.
pub fn serialize_document(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(meta) = &doc.meta {
        lines.push(META_DELIM.to_string());
        for (key, value) in meta {
            lines.push(format!("{key}{META_KV_DELIM}{value}"));
        }
        lines.push(META_DELIM.to_string());
    }

    for (i, block) in doc.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        serialize_block(block, 0, &mut lines);
    }
    lines
}

fn serialize_block(block: &Block, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    match block {
        Block::Header { level, text } => {
            // headers only occur at column zero
            lines.push(format!("{} {}", POUND.repeat(*level), serialize_text(text)));
        }
        Block::CodeBlock { lang, lines: code } => {
            lines.push(format!("{pad}{FENCE}{lang}"));
            for line in code {
                if line.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{pad}{line}"));
                }
            }
            lines.push(format!("{pad}{FENCE}"));
        }
        Block::Quoted { text } => {
            lines.push(format!(
                "{}{}",
                " ".repeat(indent + QUOTE_INDENT),
                serialize_text(text)
            ));
        }
        Block::Checklist { items } => {
            for CheckItem { checked, content } in items {
                let marker = if *checked { CHECKED_BOX } else { UNCHECKED_BOX };
                serialize_item(marker, content, indent, lines);
            }
        }
        Block::BulletList { items } => {
            for BulletItem { content } in items {
                serialize_item(BULLET, content, indent, lines);
            }
        }
        Block::Text(text) => {
            lines.push(format!("{pad}{}", serialize_text(text)));
        }
    }
}

/// One list item: inline text on the marker line, nested blocks
/// indented past the marker.
fn serialize_item(marker: &str, content: &[Block], indent: usize, lines: &mut Vec<String>) {
    let mut rest = content;
    let inline = match content.first() {
        Some(Block::Text(text)) => {
            rest = &content[1..];
            serialize_text(text)
        }
        _ => String::new(),
    };
    lines.push(format!("{}{marker}{inline}", " ".repeat(indent)));

    for block in rest {
        serialize_block(block, indent + marker.len(), lines);
    }
}

/// Render inline spans back to their delimited textual form.
fn serialize_text(text: &Text) -> String {
    let mut out = String::new();
    for span in &text.spans {
        match span {
            Span::Plain(s) => out.push_str(s),
            Span::Strong(s) => out.push_str(&format!("{STAR}{s}{STAR}")),
            Span::Em(s) => out.push_str(&format!("{UNDER}{s}{UNDER}")),
            Span::Code(s) => out.push_str(&format!("{BACKTICK}{s}{BACKTICK}")),
        }
    }
    out
}
