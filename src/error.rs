use std::cmp::max;
use std::fmt;
use std::ops::Range;

use unicode_width::UnicodeWidthStr;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while lexing, parsing, or assembling a document.
#[derive(Clone)]
pub struct Error {
    msg: String,
    ctx: Context,
}

#[derive(Clone)]
enum Context {
    None,
    /// A byte span into the original source, reported by the lexer.
    Source { source: String, span: Range<usize> },
    /// An index into the token sequence, reported by the parser.
    Token { index: usize },
}

impl Error {
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ctx: Context::None,
        }
    }

    pub(crate) fn lex(msg: impl Into<String>, source: &str, span: Range<usize>) -> Self {
        Self {
            msg: msg.into(),
            ctx: Context::Source {
                source: source.to_string(),
                span,
            },
        }
    }

    pub(crate) fn parse(msg: impl Into<String>, index: usize) -> Self {
        Self {
            msg: msg.into(),
            ctx: Context::Token { index },
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ctx {
            Context::Source { source, span } => fmt_pretty(&self.msg, source, span, f),
            Context::Token { index } => write!(f, "{} at token {}", self.msg, index),
            Context::None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ctx {
            Context::Source { source, span } => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, span, f)
                } else {
                    write!(
                        f,
                        "{} between bytes {} and {}",
                        self.msg, span.start, span.end
                    )
                }
            }
            Context::Token { index } => write!(f, "{} at token {}", self.msg, index),
            Context::None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: &Range<usize>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<&str> = source.split_terminator('\n').collect();
    let (line, col) = line_col(source, span.start);
    let code = lines
        .get(line)
        .copied()
        .or_else(|| lines.last().copied())
        .unwrap_or("");
    let width = max(
        1,
        source
            .get(span.start..span.end)
            .map_or(1, UnicodeWidthStr::width),
    );

    let num = (line + 1).to_string();
    let pad = num.width();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count();
    let col = before.rsplit('\n').next().unwrap_or("").width();
    (line, col)
}
