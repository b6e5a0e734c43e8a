//! A parser that builds an abstract syntax forest from a token sequence.

use crate::ast::Tree;
use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// A parser that constructs an ordered forest of [`Tree`]s from a token
/// sequence.
///
/// The parser is implemented as a simple hand written state machine over
/// the grammar's modes: passthrough, block, preamble, and for-loop body.
/// It performs a single left-to-right pass with bounded lookahead and no
/// I/O. Nodes produced under a for-loop header attach to the loop tree
/// through an explicit sink instead of the root forest, and composite
/// nodes are only pushed once their child list is complete.
///
/// A parser can be reloaded with [`set_tokens`][Parser::set_tokens] and
/// re-run; each run replaces the previous forest.
#[derive(Debug, Default)]
pub struct Parser {
    /// The active token sequence.
    tokens: Vec<Token>,

    /// Current position in the token sequence.
    pos: usize,

    /// The forest built by the most recent parse.
    trees: Vec<Tree>,
}

/// The grammar mode an assignment is parsed under, used to phrase errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Passthrough,
    Block,
    Preamble,
}

impl Mode {
    fn human(&self) -> &'static str {
        match self {
            Mode::Passthrough => "passthrough text",
            Mode::Block => "a block directive",
            Mode::Preamble => "the preamble",
        }
    }
}

impl Parser {
    /// Construct a new parser with no tokens loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active token sequence and discard any previous forest.
    ///
    /// Does not itself parse.
    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.pos = 0;
        self.trees.clear();
    }

    /// Parse the active token sequence into a forest.
    ///
    /// Consumes the sequence left to right exactly once. On success every
    /// token has been accounted for and the forest is available through
    /// [`trees`][Parser::trees]; on failure the forest is left empty.
    pub fn parse(&mut self) -> Result<()> {
        self.pos = 0;
        self.trees.clear();
        let mut roots = Vec::new();
        while let Some(kind) = self.peek_kind() {
            if kind == TokenKind::Eof {
                self.pos += 1;
                break;
            }
            self.parse_unit(&mut roots)?;
        }
        self.trees = roots;
        Ok(())
    }

    /// The forest built by the most recent successful parse, in the order
    /// the directives were encountered.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Consume the parser and hand ownership of the forest to the caller.
    pub fn into_trees(self) -> Vec<Tree> {
        self.trees
    }

    /// Parses one unit at the cursor, appending produced nodes to `sink`.
    fn parse_unit(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        match self.peek_kind() {
            Some(TokenKind::Whitespace) => {
                self.pos += 1;
                Ok(())
            }
            Some(TokenKind::Block) => self.parse_block(sink),
            Some(TokenKind::Preamble) => self.parse_preamble(sink),
            Some(_) => self.parse_passthrough(sink),
            None => Ok(()),
        }
    }

    /// Parses a `@@` directive: either a for-loop or an assignment list.
    fn parse_block(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        self.pos += 1;
        self.skip_inline_ws();
        match self.peek_kind() {
            Some(TokenKind::For) => self.parse_for(sink),
            Some(TokenKind::Ident) => self.parse_assignments(sink),
            _ => Err(self.err_here("expected an assignment or `for` after block marker")),
        }
    }

    /// Parses one or more comma separated assignments on a block line. The
    /// line is terminated by a newline or end of input.
    fn parse_assignments(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        loop {
            self.parse_assignment(Mode::Block, sink)?;
            self.skip_inline_ws();
            match self.peek() {
                Some(t) if t.is_symbol(",") => {
                    self.pos += 1;
                    self.skip_inline_ws();
                    // a chained assignment may repeat the block marker
                    if self.peek_kind() == Some(TokenKind::Block) {
                        self.pos += 1;
                        self.skip_inline_ws();
                    }
                    if self.peek_kind() != Some(TokenKind::Ident) {
                        return Err(self.err_here("expected an assignment after `,`"));
                    }
                }
                Some(t) if t.is_newline() => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(t) if t.kind() == TokenKind::Eof => {
                    self.pos += 1;
                    return Ok(());
                }
                None => return Ok(()),
                Some(_) => {
                    return Err(self.err_here("expected `,` or end of line after assignment"));
                }
            }
        }
    }

    /// Parses `identifier = value`, where the value is a string literal or
    /// an embedded context sequence.
    ///
    /// A string value produces a single leaf holding the string; the
    /// identifier and the `=` are structural. A context value produces the
    /// flattened sequence described in [`parse_context`][Self::parse_context].
    fn parse_assignment(&mut self, mode: Mode, sink: &mut Vec<Tree>) -> Result<()> {
        let ident = match self.peek() {
            Some(t) if t.kind() == TokenKind::Ident => {
                let text = t.text().unwrap_or("").to_string();
                self.pos += 1;
                text
            }
            _ => {
                return Err(self.err_here(format!("expected an identifier in {}", mode.human())));
            }
        };
        self.skip_inline_ws();
        match self.peek() {
            Some(t) if t.is_symbol("=") => self.pos += 1,
            _ => {
                return Err(
                    self.err_here(format!("expected `=` after identifier in {}", mode.human()))
                );
            }
        }
        self.skip_inline_ws();
        match self.peek() {
            Some(t) if t.kind() == TokenKind::Str => {
                let value = t.text().unwrap_or("").to_string();
                self.pos += 1;
                sink.push(Tree::leaf(value));
                Ok(())
            }
            Some(t) if t.is_symbol("\"") => self.parse_context(ident, sink),
            _ => Err(self.err_here(format!("expected a string value in {}", mode.human()))),
        }
    }

    /// Parses the flattened form of a context reference embedded in a
    /// quoted string and emits it as a visible node sequence: identifier,
    /// opening quote, name, value, closing quote. Keeping the quotes and
    /// the pair as separate siblings lets a later substitution pass locate
    /// them positionally.
    fn parse_context(&mut self, ident: String, sink: &mut Vec<Tree>) -> Result<()> {
        self.pos += 1;
        let name = match self.peek() {
            Some(t) if t.kind() == TokenKind::CtxName => {
                let name = t.text().unwrap_or("").to_string();
                self.pos += 1;
                name
            }
            _ => return Err(self.err_here("expected a context name after `\"`")),
        };
        let value = match self.peek() {
            Some(t) if t.kind() == TokenKind::CtxVal => {
                let value = t.text().unwrap_or("").to_string();
                self.pos += 1;
                value
            }
            _ => return Err(self.err_here("context name without a matching value")),
        };
        match self.peek() {
            Some(t) if t.is_symbol("\"") => self.pos += 1,
            _ => return Err(self.err_here("expected `\"` to close the context reference")),
        }
        sink.push(Tree::leaf(ident));
        sink.push(Tree::leaf("\""));
        sink.push(Tree::leaf(name));
        sink.push(Tree::leaf(value));
        sink.push(Tree::leaf("\""));
        Ok(())
    }

    /// Parses `for <identifier> in <string>` and nests every following
    /// unit into the loop tree.
    ///
    /// The token alphabet has no closing marker, so the body scope extends
    /// to the end of input; a nested for-loop captures the remaining input
    /// as its own body. Children are buffered locally and attached in one
    /// step, so the composite is never observable half built.
    fn parse_for(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        self.pos += 1;
        self.skip_inline_ws();
        let var = match self.peek() {
            Some(t) if t.kind() == TokenKind::Ident => {
                let text = t.text().unwrap_or("").to_string();
                self.pos += 1;
                text
            }
            _ => return Err(self.err_here("expected a loop variable after `for`")),
        };
        self.skip_inline_ws();
        match self.peek_kind() {
            Some(TokenKind::In) => self.pos += 1,
            _ => return Err(self.err_here("expected `in` in the loop header")),
        }
        self.skip_inline_ws();
        let source = match self.peek() {
            Some(t) if t.kind() == TokenKind::Str => {
                let text = t.text().unwrap_or("").to_string();
                self.pos += 1;
                text
            }
            _ => return Err(self.err_here("expected a collection string after `in`")),
        };

        let mut children = vec![Tree::leaf(var.clone()), Tree::leaf(source)];
        while let Some(kind) = self.peek_kind() {
            if kind == TokenKind::Eof {
                self.pos += 1;
                break;
            }
            self.parse_unit(&mut children)?;
        }
        sink.push(Tree::branch(var, children));
        Ok(())
    }

    /// Parses assignments between two preamble markers. A missing closing
    /// marker is not an error: everything collected up to end of input is
    /// emitted.
    fn parse_preamble(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        self.pos += 1;
        loop {
            match self.peek_kind() {
                None => return Ok(()),
                Some(TokenKind::Eof) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(TokenKind::Whitespace) => self.pos += 1,
                Some(TokenKind::Preamble) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(TokenKind::Ident) => self.parse_assignment(Mode::Preamble, sink)?,
                Some(_) => return Err(self.err_here("expected an assignment in the preamble")),
            }
        }
    }

    /// Parses one passthrough unit: a literal leaf per payload token, with
    /// a bounded lookahead for the assignment shape so that embedded
    /// context references flatten instead of reproducing verbatim.
    fn parse_passthrough(&mut self, sink: &mut Vec<Tree>) -> Result<()> {
        match self.peek() {
            Some(t) if t.kind() == TokenKind::Ident && self.at_assignment() => {
                self.parse_assignment(Mode::Passthrough, sink)
            }
            Some(t) if t.kind() == TokenKind::CtxName => {
                let name = t.text().unwrap_or("").to_string();
                self.pos += 1;
                match self.peek() {
                    Some(t) if t.kind() == TokenKind::CtxVal => {
                        let value = t.text().unwrap_or("").to_string();
                        self.pos += 1;
                        sink.push(Tree::leaf(name));
                        sink.push(Tree::leaf(value));
                        Ok(())
                    }
                    _ => Err(self.err_here("context name without a matching value")),
                }
            }
            Some(t) => {
                match t.text() {
                    Some(text) => {
                        let text = text.to_string();
                        self.pos += 1;
                        sink.push(Tree::leaf(text));
                    }
                    // payload-less structural token, nothing to reproduce
                    None => self.pos += 1,
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Returns `true` if the tokens at the cursor start an assignment: an
    /// identifier, `=`, then a string literal or a quoted context name.
    fn at_assignment(&self) -> bool {
        let skip_ws = |mut i: usize| {
            while matches!(
                self.tokens.get(i),
                Some(t) if t.kind() == TokenKind::Whitespace && !t.is_newline()
            ) {
                i += 1;
            }
            i
        };
        let mut i = skip_ws(self.pos + 1);
        match self.tokens.get(i) {
            Some(t) if t.is_symbol("=") => i += 1,
            _ => return false,
        }
        i = skip_ws(i);
        match self.tokens.get(i) {
            Some(t) if t.kind() == TokenKind::Str => true,
            Some(t) if t.is_symbol("\"") => {
                matches!(
                    self.tokens.get(i + 1),
                    Some(t) if t.kind() == TokenKind::CtxName
                )
            }
            _ => false,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    fn skip_inline_ws(&mut self) {
        while matches!(
            self.peek(),
            Some(t) if t.kind() == TokenKind::Whitespace && !t.is_newline()
        ) {
            self.pos += 1;
        }
    }

    fn err_here(&self, msg: impl Into<String>) -> Error {
        Error::parse(msg, self.pos)
    }
}
