//! A small directive language for assembling generated documents.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Passthrough text, reproduced as-is
//! - Assignment directives: `@@ src="page.md"`
//! - Metadata preambles: `---` ... `---`
//! - Loops over collections: `@@ for post in "posts"`
//! - Context references inside strings: `src="${post}.md"`
//!
//! ### Library
//!
//! - A line oriented [`Lexer`] that produces a flat token sequence
//! - A hand written [`Parser`] that builds an ordered forest of [`Tree`]s
//! - A [`Visitor`] contract for traversing nodes without exposing node
//!   kind tags
//! - A [`Renderer`] that expands loops against a [`Config`]'s collections
//!
//! # Getting started
//!
//! Parse a document into its forest with [`parse`]:
//!
//! ```
//! let source = "---\ntitle=\"Home\"\n---\n# Welcome\n";
//! let trees = stitch::parse(source)?;
//!
//! assert_eq!(trees.len(), 3);
//! assert_eq!(trees[0].value(), "Home");
//! # Ok::<(), stitch::Error>(())
//! ```
//!
//! Or assemble output text directly with [`assemble`]:
//!
//! ```
//! let config = stitch::Config::new();
//! let out = stitch::assemble("# Hello world\n", &config)?;
//!
//! assert_eq!(out, "# Hello world");
//! # Ok::<(), stitch::Error>(())
//! ```
//!
//! # Working with the forest
//!
//! Each root in the forest is independently traversable. For-loop nodes
//! are composites whose children are the loop variable, the collection
//! name, and the nested body; the [`ChildrenVisitor`] surfaces them
//! without the parser exposing internal tags:
//!
//! ```
//! use stitch::ChildrenVisitor;
//!
//! let source = "@@ for post in \"posts\"\n@@ src=\"${post}.md\"\n";
//! let trees = stitch::parse(source)?;
//!
//! assert_eq!(trees.len(), 1);
//! let children = trees[0].accept(&mut ChildrenVisitor);
//! assert_eq!(children.len(), 3);
//! assert_eq!(children[1].value(), "posts");
//! # Ok::<(), stitch::Error>(())
//! ```
//!
//! # Supplying tokens directly
//!
//! The parser makes no assumption about how its tokens were produced; any
//! sequence drawn from [`TokenKind`] can be loaded with
//! [`Parser::set_tokens`]:
//!
//! ```
//! use stitch::{Parser, Token, TokenKind};
//!
//! let mut parser = Parser::new();
//! parser.set_tokens(vec![
//!     Token::new(TokenKind::Block),
//!     Token::new(TokenKind::Whitespace),
//!     Token::with_text(TokenKind::Ident, "src"),
//!     Token::with_text(TokenKind::Symbol, "="),
//!     Token::with_text(TokenKind::Str, "test.md"),
//! ]);
//! parser.parse()?;
//!
//! assert_eq!(parser.trees().len(), 1);
//! assert_eq!(parser.trees()[0].value(), "test.md");
//! # Ok::<(), stitch::Error>(())
//! ```

mod ast;
mod error;
mod lex;
mod parse;
mod render;
mod resolve;
mod token;

pub use crate::ast::{ChildrenVisitor, Tree, Visitor};
pub use crate::error::{Error, Result};
pub use crate::lex::Lexer;
pub use crate::parse::Parser;
pub use crate::render::Renderer;
pub use crate::resolve::{Config, Resolver};
pub use crate::token::{Token, TokenKind};

/// Lex and parse a document source into its forest.
pub fn parse(source: &str) -> Result<Vec<Tree>> {
    let tokens = Lexer::new(source).lex()?;
    let mut parser = Parser::new();
    parser.set_tokens(tokens);
    parser.parse()?;
    Ok(parser.into_trees())
}

/// Lex, parse, and render a document against a config.
pub fn assemble(source: &str, config: &Config) -> Result<String> {
    let trees = parse(source)?;
    Renderer::new(config).render(&trees)
}
