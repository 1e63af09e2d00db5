pub mod lexer;
pub mod parser;
pub mod serializer;
pub mod token;

pub use lexer::lex;
pub use parser::parse;
pub use serializer::serialize_document;
pub use token::Token;

use crate::model::document::Document;

/// Error type for lexing and parsing card markup
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A front matter line without its separator, or a front matter
    /// block never closed
    #[error("malformed front matter: {0}")]
    MalformedMeta(String),
    /// A dedent to a width never on the stack, or a continuation line
    /// at the wrong depth
    #[error("indentation mismatch: {0}")]
    IndentationMismatch(String),
    #[error("code block never closed with a bare ```")]
    UnterminatedCodeBlock,
    #[error("`{0}` span never closed")]
    UnterminatedSpan(&'static str),
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
}

/// Parse a whole card's text into a document.
pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    parse(lex(&lines)?)
}
