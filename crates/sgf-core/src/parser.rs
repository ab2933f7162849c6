//! Single-pass SGF parser.
//!
//! Grammar (FF[4]):
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Sequence { GameTree } ")"
//! Sequence   = Node { Node }
//! Node       = ";" { Property }
//! Property   = PropIdent PropValue { PropValue }
//! PropValue  = "[" CValueType "]"
//! ```
//!
//! Only the first game tree of a collection is read. Nesting is tracked on an
//! explicit stack so deeply nested variations cannot overflow the call stack.

use thiserror::Error;

use crate::tree::{GameNode, GameTree, Properties};

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Parse SGF text into the tree of its first game record.
pub fn parse(text: &str) -> Result<GameTree, ParseError> {
    let root = Parser::new(text).parse_game()?;
    Ok(GameTree::new(root))
}

/// Resolve the two escape sequences that may occur inside a value: `\]` and `\\`.
/// Any other backslash is kept as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if next == ']' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// One open `(` ... `)` while parsing.
struct Frame {
    open_at: usize,
    nodes: Vec<GameNode>,
    variations: Vec<GameNode>,
}

impl Frame {
    fn new(open_at: usize) -> Self {
        Self {
            open_at,
            nodes: Vec::new(),
            variations: Vec::new(),
        }
    }

    /// Chain the sequence into parent/child links, hanging the variations off the
    /// last node. Returns the first node, or `None` for an empty sequence.
    fn into_node(self) -> Option<GameNode> {
        let mut nodes = self.nodes;
        let mut current = nodes.pop()?;
        current.children = self.variations;
        while let Some(mut previous) = nodes.pop() {
            previous.children.push(current);
            current = previous;
        }
        Some(current)
    }
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn parse_game(&mut self) -> Result<GameNode, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {}
            Some(_) => return Err(self.unexpected()),
            None => return Err(self.error_at(self.pos, "no game record found")),
        }

        let mut stack: Vec<Frame> = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(byte) = self.peek() else {
                return Err(self.error_at(self.pos, "unexpected end of input: missing ')'"));
            };

            match byte {
                b'(' => {
                    if stack.last().is_some_and(|top| top.nodes.is_empty()) {
                        return Err(
                            self.error_at(self.pos, "variation must follow at least one node")
                        );
                    }
                    stack.push(Frame::new(self.pos));
                    self.pos += 1;
                }
                b';' => {
                    let Some(top) = stack.last_mut() else {
                        return Err(self.unexpected());
                    };
                    if !top.variations.is_empty() {
                        return Err(self.error_at(
                            self.pos,
                            "node after a variation: nodes must come before sub-trees",
                        ));
                    }
                    self.pos += 1;
                    let properties = self.parse_properties()?;
                    top.nodes.push(GameNode::new(properties));
                }
                b')' => {
                    let Some(frame) = stack.pop() else {
                        return Err(self.unexpected());
                    };
                    let open_at = frame.open_at;
                    let node = frame.into_node().ok_or_else(|| {
                        self.error_at(open_at, "empty game tree: expected ';' after '('")
                    })?;
                    self.pos += 1;
                    match stack.last_mut() {
                        Some(parent) => parent.variations.push(node),
                        None => return Ok(node),
                    }
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_properties(&mut self) -> Result<Properties, ParseError> {
        let mut properties = Properties::default();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b.is_ascii_alphabetic() => {
                    let (ident, values) = self.parse_property()?;
                    properties.insert(&ident, values);
                }
                _ => return Ok(properties),
            }
        }
    }

    fn parse_property(&mut self) -> Result<(String, Vec<String>), ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let written = &self.src[start..self.pos];

        // Older file formats allowed lowercase letters inside identifiers; only the
        // uppercase ones are significant.
        let ident: String = written.chars().filter(|c| c.is_ascii_uppercase()).collect();
        if ident.is_empty() {
            return Err(self.error_at(
                start,
                format!("property identifier '{written}' has no uppercase letters"),
            ));
        }

        self.skip_whitespace();
        if self.peek() != Some(b'[') {
            return Err(self.error_at(self.pos, format!("property '{ident}' has no value")));
        }

        let mut values = Vec::new();
        while self.peek() == Some(b'[') {
            values.push(self.parse_value(&ident)?);
            self.skip_whitespace();
        }
        Ok((ident, values))
    }

    /// Read one bracketed value, returning it with escapes left in place.
    fn parse_value(&mut self, ident: &str) -> Result<String, ParseError> {
        let open_at = self.pos;
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        open_at,
                        format!("unterminated value for property '{ident}'"),
                    ))
                }
                Some(b'\\') => self.pos += 2,
                Some(b']') => {
                    let value = self.src[start..self.pos].to_string();
                    self.pos += 1;
                    return Ok(value);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> ParseError {
        let found = self.src[self.pos..].chars().next().unwrap_or(' ');
        self.error_at(self.pos, format!("unexpected character '{found}'"))
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let before = self.src.get(..offset).unwrap_or(self.src);
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}
