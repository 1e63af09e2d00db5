//! cardmark — the markup language behind board cards.
//!
//! Cards are written in a small indentation-sensitive markup: an
//! optional `---` front matter block, `#` headers, fenced code blocks,
//! indented quotes, ` - ` bullet lists, ` [x] ` checklists, and
//! `*strong*` / `_em_` / `` `code` `` inline spans. [`parse_document`]
//! turns card text into a [`Document`] tree for rendering;
//! [`serialize_document`] writes the canonical textual form back out.

pub mod model;
pub mod parse;

pub use model::document::{Block, BulletItem, CheckItem, Document, Span, Text};
pub use parse::{ParseError, lex, parse, parse_document, serialize_document};
