//! Tokens produced by the lexer and consumed by the parser.

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A `@@` directive marker.
    Block,
    /// A run of whitespace, newline-bearing at line ends.
    Whitespace,
    /// An identifier or a run of passthrough text.
    Ident,
    /// A punctuation symbol like `=`, `,`, `"`, or `#`.
    Symbol,
    /// The contents of a double-quoted string literal.
    Str,
    /// A `---` preamble marker.
    Preamble,
    /// The `for` keyword.
    For,
    /// The `in` keyword.
    In,
    /// The name half of an embedded context reference.
    CtxName,
    /// The resolved value half of an embedded context reference.
    CtxVal,
    /// End of input.
    Eof,
}

/// A single unit of lexed input.
///
/// A token is a kind tag plus an optional literal payload and is immutable
/// once constructed. Structural markers carry no payload; payload-bearing
/// kinds store their literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: Option<String>,
}

impl Token {
    /// Construct a token with no payload.
    pub fn new(kind: TokenKind) -> Self {
        Self { kind, text: None }
    }

    /// Construct a token carrying literal text.
    pub fn with_text(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
        }
    }

    /// The token's kind tag.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The token's literal payload, if it carries one.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns `true` for a whitespace token that ends a line.
    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Whitespace
            && self.text.as_deref().map_or(false, |t| t.contains('\n'))
    }

    /// Returns `true` for a symbol token with exactly the given text.
    pub(crate) fn is_symbol(&self, sym: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text.as_deref() == Some(sym)
    }
}
