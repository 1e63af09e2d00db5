use crate::model::document::{Block, BulletItem, CheckItem, Document, Span, Text};
use crate::parse::ParseError;
use crate::parse::token::{BACKTICK, STAR, Token, UNDER};

/// Parse a token stream into a document.
pub fn parse(tokens: Vec<Token>) -> Result<Document, ParseError> {
    let mut cursor = Cursor::new(tokens);

    // front matter is only ever the stream's first token
    let meta = match cursor.peek() {
        Some(Token::Meta(_)) => match cursor.advance() {
            Some(Token::Meta(meta)) => Some(meta),
            _ => None,
        },
        _ => None,
    };

    let blocks = parse_blocks(&mut cursor)?;
    Ok(Document { meta, blocks })
}

/// Cursor over the lexed token buffer: single-token lookahead plus
/// one-token pushback, with a saved position for the bounded lookahead
/// across blank-line runs between list items.
struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn new(tokens: Vec<Token>) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Undo the most recent `advance`.
    fn backup(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Consume and return the next token only if `pred` matches it.
    fn eat(&mut self, pred: impl Fn(&Token) -> bool) -> Option<Token> {
        match self.peek() {
            Some(token) if pred(token) => self.advance(),
            _ => None,
        }
    }

    fn check(&self, pred: impl Fn(&Token) -> bool) -> bool {
        self.peek().is_some_and(pred)
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }
}

/// Top-level dispatch: one block per iteration until the stream ends.
fn parse_blocks(cursor: &mut Cursor) -> Result<Vec<Block>, ParseError> {
    let mut blocks = Vec::new();
    while let Some(token) = cursor.peek() {
        match token {
            // blank lines separate blocks; dedent runs return to column
            // zero after an indented block
            Token::Newline | Token::Dedent => {
                cursor.advance();
            }
            Token::Pound => blocks.push(parse_header(cursor)?),
            Token::Fence(_) => blocks.push(parse_code_block(cursor)?),
            Token::Indent(_) => blocks.push(parse_indented(cursor)?),
            Token::Meta(_) => {
                return Err(ParseError::UnexpectedToken(
                    "front matter past the start of the card".to_string(),
                ));
            }
            Token::Bullet | Token::CheckedBox | Token::UncheckedBox => {
                return Err(ParseError::UnexpectedToken(format!(
                    "{token:?} at block start"
                )));
            }
            _ => blocks.push(Block::Text(parse_text(cursor, 0)?)),
        }
    }
    Ok(blocks)
}

/// `# Title` — the pound run sets the level; the title is inline text,
/// terminated like any paragraph.
fn parse_header(cursor: &mut Cursor) -> Result<Block, ParseError> {
    let mut level = 0;
    while cursor.eat(|t| matches!(t, Token::Pound)).is_some() {
        level += 1;
    }
    Ok(Block::Header {
        level,
        text: parse_text(cursor, 0)?,
    })
}

/// A fenced code block: every line until the bare closing fence is kept
/// verbatim.
fn parse_code_block(cursor: &mut Cursor) -> Result<Block, ParseError> {
    let lang = match cursor.advance() {
        Some(Token::Fence(annot)) => annot,
        other => {
            return Err(ParseError::UnexpectedToken(format!(
                "{other:?} where a fence was expected"
            )));
        }
    };
    // the fence line's own newline
    cursor.eat(|t| matches!(t, Token::Newline));

    let mut lines = Vec::new();
    loop {
        // indentation bookkeeping carries no text inside a fence
        while cursor
            .eat(|t| matches!(t, Token::Indent(_) | Token::Dedent))
            .is_some()
        {}

        match cursor.peek() {
            None => return Err(ParseError::UnterminatedCodeBlock),
            Some(Token::Fence(annot)) if annot.is_empty() => {
                cursor.advance();
                cursor.eat(|t| matches!(t, Token::Newline));
                break;
            }
            _ => lines.push(parse_literal_line(cursor)),
        }
    }
    Ok(Block::CodeBlock { lang, lines })
}

/// One verbatim line inside a fence: concatenated literals up to the
/// line's newline.
fn parse_literal_line(cursor: &mut Cursor) -> String {
    let mut line = String::new();
    while let Some(token) = cursor.advance() {
        match token {
            Token::Newline => break,
            other => other.write_literal(&mut line),
        }
    }
    line
}

/// An indented construct: a checklist, a bullet list, or a quoted block,
/// decided by the token right after the `Indent`.
fn parse_indented(cursor: &mut Cursor) -> Result<Block, ParseError> {
    cursor.advance(); // the Indent that opened this construct
    match cursor.peek() {
        Some(Token::CheckedBox | Token::UncheckedBox) => parse_checklist(cursor),
        Some(Token::Bullet) => parse_bullet_list(cursor),
        _ => {
            // not a list: give the Indent back, the quote text expects it
            cursor.backup();
            let text = parse_text(cursor, 1)?;
            eat_closing_dedent(cursor);
            Ok(Block::Quoted { text })
        }
    }
}

/// Checklist items continue at the same depth until the closing dedent,
/// a blank run without a further item, or the end of the stream.
fn parse_checklist(cursor: &mut Cursor) -> Result<Block, ParseError> {
    let mut items = Vec::new();
    loop {
        let checked = match cursor.peek() {
            Some(Token::CheckedBox) => true,
            Some(Token::UncheckedBox) => false,
            _ => break,
        };
        cursor.advance();
        items.push(CheckItem {
            checked,
            content: parse_item_content(cursor)?,
        });
        if !seek_next_item(cursor, |t| {
            matches!(t, Token::CheckedBox | Token::UncheckedBox)
        }) {
            break;
        }
    }
    Ok(Block::Checklist { items })
}

fn parse_bullet_list(cursor: &mut Cursor) -> Result<Block, ParseError> {
    let mut items = Vec::new();
    while cursor.eat(|t| matches!(t, Token::Bullet)).is_some() {
        items.push(BulletItem {
            content: parse_item_content(cursor)?,
        });
        if !seek_next_item(cursor, |t| matches!(t, Token::Bullet)) {
            break;
        }
    }
    Ok(Block::BulletList { items })
}

/// One list item: a single line of inline content, then any blocks
/// nested at deeper indentation.
fn parse_item_content(cursor: &mut Cursor) -> Result<Vec<Block>, ParseError> {
    let mut content = Vec::new();
    let text = parse_line_text(cursor)?;
    if !text.is_empty() {
        content.push(Block::Text(text));
    }
    while cursor.check(|t| matches!(t, Token::Indent(_))) {
        content.push(parse_indented(cursor)?);
    }
    Ok(content)
}

/// After an item: skip blank lines when a same-family marker follows,
/// or consume the dedent that closes the list. Returns true when
/// another item follows.
fn seek_next_item(cursor: &mut Cursor, marker: impl Fn(&Token) -> bool) -> bool {
    let start = cursor.pos();
    while cursor.eat(|t| matches!(t, Token::Newline)).is_some() {}
    match cursor.peek() {
        Some(token) if marker(token) => true,
        Some(Token::Dedent) => {
            cursor.advance();
            false
        }
        _ => {
            cursor.rewind(start);
            false
        }
    }
}

/// Consume the dedent closing an indented construct, past any trailing
/// blank lines. Leaves the cursor untouched when none follows (end of
/// stream, or the stream keeps indenting).
fn eat_closing_dedent(cursor: &mut Cursor) {
    let start = cursor.pos();
    while cursor.eat(|t| matches!(t, Token::Newline)).is_some() {}
    if cursor.eat(|t| matches!(t, Token::Dedent)).is_none() {
        cursor.rewind(start);
    }
}

/// The three delimited span kinds and their delimiter tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Code,
    Strong,
    Em,
}

impl Delim {
    fn of(token: &Token) -> Option<Delim> {
        match token {
            Token::Backtick => Some(Delim::Code),
            Token::Star => Some(Delim::Strong),
            Token::Under => Some(Delim::Em),
            _ => None,
        }
    }

    fn literal(self) -> &'static str {
        match self {
            Delim::Code => BACKTICK,
            Delim::Strong => STAR,
            Delim::Em => UNDER,
        }
    }

    fn span(self, content: String) -> Span {
        match self {
            Delim::Code => Span::Code(content),
            Delim::Strong => Span::Strong(content),
            Delim::Em => Span::Em(content),
        }
    }
}

/// Inline text for paragraphs, headers, and quotes: runs until a blank
/// line, a dedent out of the block, or the end of the stream. `depth`
/// is the number of `Indent` tokens each of this block's lines opens
/// with.
fn parse_text(cursor: &mut Cursor, depth: usize) -> Result<Text, ParseError> {
    let mut spans = Vec::new();
    let mut plain = String::new();

    expect_line_indent(cursor, depth)?;
    skip_leading_blanks(cursor);

    loop {
        let Some(token) = cursor.peek() else { break };
        if let Some(delim) = Delim::of(token) {
            cursor.advance();
            flush_plain(&mut plain, &mut spans);
            spans.push(delim.span(parse_delimited(cursor, delim, depth)?));
            continue;
        }
        match token {
            Token::Newline => {
                cursor.advance();
                match cursor.peek() {
                    // blank line or end of stream: the block is done
                    None => break,
                    Some(Token::Newline) => {
                        cursor.advance();
                        break;
                    }
                    // a shallower line: the block is over, the dedent
                    // belongs to whoever opened the level
                    Some(Token::Dedent) => break,
                    _ => {
                        expect_line_indent(cursor, depth)?;
                        skip_leading_blanks(cursor);
                        soft_break(&mut plain, &spans);
                    }
                }
            }
            Token::Indent(_) | Token::Dedent => {
                return Err(ParseError::IndentationMismatch(
                    "line indented past its block".to_string(),
                ));
            }
            Token::Meta(_) => {
                return Err(ParseError::UnexpectedToken(
                    "front matter inside text".to_string(),
                ));
            }
            other => {
                other.write_literal(&mut plain);
                cursor.advance();
            }
        }
    }

    flush_plain(&mut plain, &mut spans);
    Ok(Text { spans })
}

/// Inline text for a single list-item line: ends at the line's newline,
/// which is also a span boundary.
fn parse_line_text(cursor: &mut Cursor) -> Result<Text, ParseError> {
    let mut spans = Vec::new();
    let mut plain = String::new();

    skip_leading_blanks(cursor);
    loop {
        let Some(token) = cursor.peek() else { break };
        if let Some(delim) = Delim::of(token) {
            cursor.advance();
            flush_plain(&mut plain, &mut spans);
            spans.push(delim.span(parse_delimited_line(cursor, delim)?));
            continue;
        }
        match token {
            Token::Newline => {
                cursor.advance();
                break;
            }
            Token::Indent(_) | Token::Dedent | Token::Meta(_) => {
                return Err(ParseError::UnexpectedToken(format!(
                    "{token:?} inside a list item line"
                )));
            }
            other => {
                other.write_literal(&mut plain);
                cursor.advance();
            }
        }
    }

    flush_plain(&mut plain, &mut spans);
    Ok(Text { spans })
}

/// The inside of a `` `code` ``, `*strong*`, or `_em_` span: literal
/// content up to the matching delimiter. A block boundary first is an
/// error.
fn parse_delimited(cursor: &mut Cursor, delim: Delim, depth: usize) -> Result<String, ParseError> {
    let mut content = String::new();
    loop {
        let Some(token) = cursor.advance() else {
            return Err(ParseError::UnterminatedSpan(delim.literal()));
        };
        if Delim::of(&token) == Some(delim) {
            return Ok(content);
        }
        match token {
            Token::Newline => match cursor.peek() {
                None | Some(Token::Newline) | Some(Token::Dedent) => {
                    return Err(ParseError::UnterminatedSpan(delim.literal()));
                }
                _ => expect_line_indent(cursor, depth)?,
            },
            Token::Indent(_) | Token::Dedent => {
                return Err(ParseError::IndentationMismatch(
                    "line indented past its block".to_string(),
                ));
            }
            Token::Meta(_) => {
                return Err(ParseError::UnexpectedToken(
                    "front matter inside text".to_string(),
                ));
            }
            other => other.write_literal(&mut content),
        }
    }
}

/// Span inside a list-item line: must close before the line ends.
fn parse_delimited_line(cursor: &mut Cursor, delim: Delim) -> Result<String, ParseError> {
    let mut content = String::new();
    loop {
        let Some(token) = cursor.advance() else {
            return Err(ParseError::UnterminatedSpan(delim.literal()));
        };
        if Delim::of(&token) == Some(delim) {
            return Ok(content);
        }
        match token {
            Token::Newline => return Err(ParseError::UnterminatedSpan(delim.literal())),
            other => other.write_literal(&mut content),
        }
    }
}

/// Every line of an indented block opens with the block's `Indent`s.
fn expect_line_indent(cursor: &mut Cursor, depth: usize) -> Result<(), ParseError> {
    for _ in 0..depth {
        if cursor.eat(|t| matches!(t, Token::Indent(_))).is_none() {
            return Err(ParseError::IndentationMismatch(
                "continuation line does not match its block's depth".to_string(),
            ));
        }
    }
    Ok(())
}

fn skip_leading_blanks(cursor: &mut Cursor) {
    while cursor.eat(|t| matches!(t, Token::Blank(_))).is_some() {}
}

fn flush_plain(plain: &mut String, spans: &mut Vec<Span>) {
    if !plain.is_empty() {
        spans.push(Span::Plain(std::mem::take(plain)));
    }
}

/// Joined continuation lines read as one run of text with a single
/// space at the seam.
fn soft_break(plain: &mut String, spans: &[Span]) {
    if (!plain.is_empty() || !spans.is_empty()) && !plain.ends_with(' ') {
        plain.push(' ');
    }
}
