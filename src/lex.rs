//! A lexer that chunks document source into tokens so that the parser
//! doesn't have to operate on raw text.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// Lexes document source into the token sequence consumed by
/// [`Parser`][crate::Parser].
///
/// The lexer is line oriented. Each line is classified as a preamble marker
/// (`---`), a directive line (`@@ ...`, or any line between preamble
/// markers), or passthrough text, and is lexed under the matching rules.
///
/// An optional bound context supplies values for `${name}` references;
/// without one, references pass through as literal text so that a later
/// stage can substitute them.
pub struct Lexer<'source, 'ctx> {
    /// The original document source.
    source: &'source str,

    /// Values for embedded context references.
    context: Option<&'ctx BTreeMap<String, String>>,

    /// Whether the cursor is between two preamble markers.
    in_preamble: bool,

    /// The tokens produced so far.
    tokens: Vec<Token>,
}

impl<'source, 'ctx> Lexer<'source, 'ctx> {
    /// Construct a new lexer with no bound context.
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            context: None,
            in_preamble: false,
            tokens: Vec::new(),
        }
    }

    /// Construct a new lexer that resolves `${name}` references against the
    /// given context.
    pub fn with_context(source: &'source str, context: &'ctx BTreeMap<String, String>) -> Self {
        Self {
            source,
            context: Some(context),
            in_preamble: false,
            tokens: Vec::new(),
        }
    }

    /// Lex the entire source into a token sequence terminated by an
    /// end-of-input token.
    pub fn lex(mut self) -> Result<Vec<Token>> {
        let source = self.source;
        let mut cursor = 0;
        while cursor < source.len() {
            let rest = &source[cursor..];
            let (line, next) = match rest.find('\n') {
                Some(i) => (&rest[..i], cursor + i + 1),
                None => (rest, source.len()),
            };
            self.lex_line(line, cursor)?;
            if next > cursor + line.len() {
                self.push(Token::with_text(TokenKind::Whitespace, "\n"));
            }
            cursor = next;
        }
        self.push(Token::new(TokenKind::Eof));
        Ok(self.tokens)
    }

    fn lex_line(&mut self, line: &str, offset: usize) -> Result<()> {
        let trimmed = line.trim();
        if trimmed == "---" {
            self.in_preamble = !self.in_preamble;
            self.push(Token::new(TokenKind::Preamble));
            return Ok(());
        }
        if trimmed.is_empty() {
            return Ok(());
        }
        let start = line.len() - line.trim_start().len();
        if self.in_preamble || trimmed.starts_with("@@") {
            self.lex_directive(line, offset, start)
        } else {
            self.lex_passthrough(line, offset, start)
        }
    }

    /// Lexes a directive line: markers, identifiers, keywords, symbols, and
    /// quoted strings.
    fn lex_directive(&mut self, line: &str, offset: usize, start: usize) -> Result<()> {
        let mut i = start;
        while i < line.len() {
            let rest = &line[i..];
            let c = rest.chars().next().unwrap();
            if rest.starts_with("@@") {
                self.push(Token::new(TokenKind::Block));
                i += 2;
            } else if c == ' ' || c == '\t' {
                let n = rest.len() - rest.trim_start_matches(|c| c == ' ' || c == '\t').len();
                self.push(Token::new(TokenKind::Whitespace));
                i += n;
            } else if c == '=' || c == ',' {
                self.push(Token::with_text(TokenKind::Symbol, c));
                i += 1;
            } else if c == '"' {
                i += self.lex_string(rest, offset + i)?;
            } else if is_ident_start(c) {
                let n = rest.len() - rest.trim_start_matches(is_ident_continue).len();
                match &rest[..n] {
                    "for" => self.push(Token::new(TokenKind::For)),
                    "in" => self.push(Token::new(TokenKind::In)),
                    word => self.push(Token::with_text(TokenKind::Ident, word)),
                }
                i += n;
            } else {
                let at = offset + i;
                return Err(Error::lex(
                    "unexpected character",
                    self.source,
                    at..at + c.len_utf8(),
                ));
            }
        }
        Ok(())
    }

    /// Lexes a quoted string starting at `s` and returns the number of
    /// bytes consumed.
    ///
    /// A string whose contents are exactly one `${name}` reference lexes to
    /// the flattened context form (quote symbol, name, value, quote symbol)
    /// when a context is bound.
    fn lex_string(&mut self, s: &str, at: usize) -> Result<usize> {
        let mut content = String::new();
        let mut iter = s.char_indices().skip(1);
        let end = loop {
            match iter.next() {
                None => {
                    return Err(Error::lex("undelimited string", self.source, at..at + s.len()));
                }
                Some((j, '"')) => break j + 1,
                Some((j, '\\')) => {
                    let c = match iter.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((k, c)) => {
                            return Err(Error::lex(
                                "unknown escape character",
                                self.source,
                                at + j..at + k + c.len_utf8(),
                            ));
                        }
                        None => {
                            return Err(Error::lex(
                                "undelimited string",
                                self.source,
                                at..at + s.len(),
                            ));
                        }
                    };
                    content.push(c);
                }
                Some((_, c)) => content.push(c),
            }
        };

        match self.context {
            Some(ctx) if content.contains("${") => {
                let name = content
                    .strip_prefix("${")
                    .and_then(|c| c.strip_suffix('}'))
                    .filter(|n| !n.contains('}') && !n.contains("${"));
                let name = match name {
                    Some(name) => name,
                    None => {
                        return Err(Error::lex(
                            "context reference must span the whole string",
                            self.source,
                            at..at + end,
                        ));
                    }
                };
                let value = ctx.get(name).ok_or_else(|| {
                    Error::lex(
                        format!("unknown context variable `{name}`"),
                        self.source,
                        at..at + end,
                    )
                })?;
                self.push(Token::with_text(TokenKind::Symbol, "\""));
                self.push(Token::with_text(TokenKind::CtxName, name));
                self.push(Token::with_text(TokenKind::CtxVal, value.as_str()));
                self.push(Token::with_text(TokenKind::Symbol, "\""));
            }
            _ => self.push(Token::with_text(TokenKind::Str, content)),
        }
        Ok(end)
    }

    /// Lexes a passthrough line: a leading heading run and `=`/`"` keep
    /// their own symbol tokens, everything else becomes trimmed text runs.
    fn lex_passthrough(&mut self, line: &str, offset: usize, start: usize) -> Result<()> {
        let mut i = start;
        let rest = &line[i..];
        if rest.starts_with('#') {
            let n = rest.len() - rest.trim_start_matches('#').len();
            self.push(Token::with_text(TokenKind::Symbol, &rest[..n]));
            i += n;
        }
        let mut run = i;
        while i < line.len() {
            let rest = &line[i..];
            let c = rest.chars().next().unwrap();
            if c == '=' || c == '"' {
                self.flush_run(&line[run..i]);
                self.push(Token::with_text(TokenKind::Symbol, c));
                i += 1;
                run = i;
            } else if rest.starts_with("${") && self.context.is_some() {
                self.flush_run(&line[run..i]);
                let close = match rest.find('}') {
                    Some(j) => j,
                    None => {
                        let at = offset + i;
                        return Err(Error::lex(
                            "unclosed context reference",
                            self.source,
                            at..offset + line.len(),
                        ));
                    }
                };
                let name = &rest[2..close];
                let value = self.context.unwrap().get(name).ok_or_else(|| {
                    let at = offset + i;
                    Error::lex(
                        format!("unknown context variable `{name}`"),
                        self.source,
                        at..at + close + 1,
                    )
                })?;
                self.push(Token::with_text(TokenKind::CtxName, name));
                self.push(Token::with_text(TokenKind::CtxVal, value.as_str()));
                i += close + 1;
                run = i;
            } else {
                i += c.len_utf8();
            }
        }
        self.flush_run(&line[run..]);
        Ok(())
    }

    fn flush_run(&mut self, run: &str) {
        let text = run.trim();
        if !text.is_empty() {
            self.push(Token::with_text(TokenKind::Ident, text));
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    matches!(c, '_' | '.' | '-') || unicode_ident::is_xid_continue(c)
}
