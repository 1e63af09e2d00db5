use indexmap::IndexMap;

/// Front matter block delimiter (a line of its own)
pub const META_DELIM: &str = "---";
/// Front matter key/value separator
pub const META_KV_DELIM: char = ':';
/// One header level
pub const POUND: &str = "#";
/// Code block fence
pub const FENCE: &str = "```";
/// Inline code delimiter
pub const BACKTICK: &str = "`";
/// Strong delimiter
pub const STAR: &str = "*";
/// Emphasis delimiter
pub const UNDER: &str = "_";
/// Checked checklist marker
pub const CHECKED_BOX: &str = " [x] ";
/// Unchecked checklist marker
pub const UNCHECKED_BOX: &str = " [ ] ";
/// Bullet list marker
pub const BULLET: &str = " - ";

/// One lexed token. Every input line contributes its content tokens
/// followed by exactly one `Newline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Front matter mapping; only ever the first token of a stream
    Meta(IndexMap<String, String>),
    /// One `#` of a header run at column zero
    Pound,
    /// A fence line; the annotation is everything after the backticks
    Fence(String),
    Backtick,
    Star,
    Under,
    CheckedBox,
    UncheckedBox,
    Bullet,
    /// Indentation grew to this width
    Indent(usize),
    /// Indentation shrank by one stack level
    Dedent,
    /// A run of characters free of whitespace and span delimiters
    Word(String),
    /// A single whitespace character inside a line
    Blank(char),
    Newline,
}

impl Token {
    /// Append this token's literal text to `out`. Bookkeeping tokens
    /// (`Meta`, `Indent`, `Dedent`, `Newline`) have no literal form.
    pub fn write_literal(&self, out: &mut String) {
        match self {
            Token::Pound => out.push_str(POUND),
            Token::Fence(annot) => {
                out.push_str(FENCE);
                out.push_str(annot);
            }
            Token::Backtick => out.push_str(BACKTICK),
            Token::Star => out.push_str(STAR),
            Token::Under => out.push_str(UNDER),
            Token::CheckedBox => out.push_str(CHECKED_BOX),
            Token::UncheckedBox => out.push_str(UNCHECKED_BOX),
            Token::Bullet => out.push_str(BULLET),
            Token::Word(word) => out.push_str(word),
            Token::Blank(c) => out.push(*c),
            Token::Meta(_) | Token::Indent(_) | Token::Dedent | Token::Newline => {}
        }
    }
}
