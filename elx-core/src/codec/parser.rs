//! Parser for component source files.
//!
//! A component file is an exported object literal:
//!
//! ```text
//! module.exports = {
//!   name: "Card",
//!   props: ["title"],
//!   template: /* html */`
//!     <div>{{ title }}</div>
//!   `,
//! }
//! ```
//!
//! The grammar is deliberately small. Each value is a quoted string, a
//! template string (optionally tagged with a leading block comment), or a
//! bare literal captured as raw text. Nothing is evaluated.

use super::error::ParseError;

/// A property value as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `"text"` or `'text'`, escapes resolved
    Quoted(String),
    /// `` /* tag */`body` ``, with `` \` `` and `\${` unescaped
    Template { tag: Option<String>, body: String },
    /// Anything else, e.g. `["a", "b"]` or `function () {}`
    Bare(String),
}

/// One `key: value` property of the object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    pub line: usize,
    pub column: usize,
}

/// Parses a component module into its properties, in source order.
pub fn parse_object(source: &str) -> Result<Vec<Entry>, ParseError> {
    let mut cursor = Cursor::new(source);

    cursor.skip_trivia()?;
    cursor.skip_export_prefix()?;
    cursor.skip_trivia()?;
    cursor.expect('{')?;

    let mut entries = Vec::new();
    loop {
        cursor.skip_trivia()?;
        if cursor.eat('}') {
            break;
        }

        let (line, column) = cursor.location(cursor.pos);
        let key = cursor.read_key()?;
        cursor.skip_trivia()?;
        cursor.expect(':')?;
        let value = cursor.read_value()?;
        entries.push(Entry {
            key,
            value,
            line,
            column,
        });

        cursor.skip_trivia()?;
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat('}') {
            break;
        }
        return Err(cursor.error("expected ',' or '}' after property"));
    }

    cursor.skip_trivia()?;
    cursor.eat(';');
    cursor.skip_trivia()?;
    if cursor.peek().is_some() {
        return Err(cursor.error("unexpected content after object literal"));
    }

    Ok(entries)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn location(&self, pos: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in self.chars.iter().take(pos) {
            if *c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    fn error_at(&self, pos: usize, message: &str) -> ParseError {
        let (line, column) = self.location(pos);
        ParseError {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn error(&self, message: &str) -> ParseError {
        self.error_at(self.pos, message)
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.read_block_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Reads a `/* ... */` comment and returns its inner text.
    fn read_block_comment(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 2;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated comment")),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.pos += 2;
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn read_identifier(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            None
        } else {
            Some(self.chars[start..self.pos].iter().collect())
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        let start = self.pos;
        match self.read_identifier() {
            Some(ident) if ident == word => Ok(()),
            _ => Err(self.error_at(start, &format!("expected '{}'", word))),
        }
    }

    /// Skips `module.exports =` or `export default` if present.
    fn skip_export_prefix(&mut self) -> Result<(), ParseError> {
        if self.starts_with("module") {
            self.expect_word("module")?;
            self.skip_trivia()?;
            self.expect('.')?;
            self.skip_trivia()?;
            self.expect_word("exports")?;
            self.skip_trivia()?;
            self.expect('=')?;
        } else if self.starts_with("export") {
            self.expect_word("export")?;
            self.skip_trivia()?;
            self.expect_word("default")?;
        }
        Ok(())
    }

    fn read_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some('"') | Some('\'') => self.read_quoted(),
            _ => self
                .read_identifier()
                .ok_or_else(|| self.error("expected a property name")),
        }
    }

    fn read_value(&mut self) -> Result<Value, ParseError> {
        // A block comment right before a template string is its tag.
        let mut tag = None;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_at(1) == Some('*') => {
                    tag = Some(self.read_block_comment()?.trim().to_string());
                }
                _ => break,
            }
        }

        match self.peek() {
            Some('`') => Ok(Value::Template {
                tag: tag.filter(|t| !t.is_empty()),
                body: self.read_template()?,
            }),
            Some('"') | Some('\'') => Ok(Value::Quoted(self.read_quoted()?)),
            None => Err(self.error("expected a value")),
            Some(_) => Ok(Value::Bare(self.read_bare()?)),
        }
    }

    fn read_quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let quote = self.peek().unwrap_or('"');
        self.pos += 1;

        let mut text = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.error_at(start, "unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self
                        .peek()
                        .ok_or_else(|| self.error_at(start, "unterminated string"))?;
                    self.pos += 1;
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '0' => text.push('\0'),
                        'u' => text.push(self.read_unicode_escape()?),
                        other => text.push(other),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char, ParseError> {
        let start = self.pos;
        let digits: String = (0..4).filter_map(|i| self.peek_at(i)).collect();
        let code = u32::from_str_radix(&digits, 16)
            .ok()
            .filter(|_| digits.len() == 4)
            .and_then(char::from_u32)
            .ok_or_else(|| self.error_at(start, "invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }

    /// Reads a template string body. Only `` \` `` and `\${` are escapes;
    /// every other backslash is kept as written.
    fn read_template(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;

        let mut body = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated template string")),
                Some('\\') if self.peek_at(1) == Some('`') => {
                    body.push('`');
                    self.pos += 2;
                }
                Some('\\') if self.peek_at(1) == Some('$') && self.peek_at(2) == Some('{') => {
                    body.push_str("${");
                    self.pos += 3;
                }
                Some('`') => {
                    self.pos += 1;
                    return Ok(body);
                }
                Some(c) => {
                    body.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Captures raw text up to the next top-level `,` or `}`.
    fn read_bare(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut open: Vec<char> = Vec::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(self.error_at(start, "unterminated value"));
            };
            match c {
                '"' | '\'' => {
                    self.read_quoted()?;
                }
                '`' => {
                    self.read_template()?;
                }
                '/' if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('*') => {
                    self.read_block_comment()?;
                }
                '(' | '[' | '{' => {
                    open.push(c);
                    self.pos += 1;
                }
                ')' | ']' | '}' => {
                    let Some(opener) = open.pop() else {
                        if c == '}' {
                            break;
                        }
                        return Err(self.error(&format!("unbalanced '{}'", c)));
                    };
                    if closer_of(opener) != c {
                        return Err(self.error(&format!("unbalanced '{}'", c)));
                    }
                    self.pos += 1;
                }
                ',' if open.is_empty() => break,
                _ => self.pos += 1,
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(self.error_at(start, "expected a value"));
        }
        Ok(text.to_string())
    }
}

fn closer_of(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
