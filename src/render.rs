//! Emission of assembled output from a parsed forest.

use std::collections::BTreeMap;
use std::path::Path;

use crate::ast::{ChildrenVisitor, Tree};
use crate::error::{Error, Result};
use crate::resolve::{Config, Resolver};

/// Emits assembled document text from a forest.
///
/// Leaf values are emitted in order and joined with single spaces. The
/// flattened context sequence produced by the parser (quote, name, value,
/// quote) is recognized positionally and collapses to the quoted value. A
/// composite node is a for-loop: its body is emitted once per item of the
/// resolved collection with `${var}` references substituted by the item's
/// file stem.
pub struct Renderer<'config> {
    config: &'config Config,
}

impl<'config> Renderer<'config> {
    /// Construct a renderer over the given config.
    pub fn new(config: &'config Config) -> Self {
        Self { config }
    }

    /// Render a forest to output text.
    pub fn render(&self, trees: &[Tree]) -> Result<String> {
        let mut out = Vec::new();
        self.emit(trees, &BTreeMap::new(), &mut out)?;
        Ok(out.join(" "))
    }

    fn emit(
        &self,
        trees: &[Tree],
        vars: &BTreeMap<String, String>,
        out: &mut Vec<String>,
    ) -> Result<()> {
        let mut i = 0;
        while i < trees.len() {
            let tree = &trees[i];
            if !tree.is_leaf() {
                self.emit_loop(tree, vars, out)?;
                i += 1;
                continue;
            }
            // quote, name, value, quote collapses to the substituted value
            if tree.value() == "\""
                && i + 3 < trees.len()
                && trees[i + 1..i + 4].iter().all(Tree::is_leaf)
                && trees[i + 3].value() == "\""
            {
                out.push(format!("\"{}\"", substitute(trees[i + 2].value(), vars)));
                i += 4;
                continue;
            }
            out.push(substitute(tree.value(), vars));
            i += 1;
        }
        Ok(())
    }

    fn emit_loop(
        &self,
        tree: &Tree,
        vars: &BTreeMap<String, String>,
        out: &mut Vec<String>,
    ) -> Result<()> {
        let children = tree.accept(&mut ChildrenVisitor);
        let (var, source, body) = match children {
            [var, source, body @ ..] => (var.value(), source.value(), body),
            _ => return Err(Error::msg("loop node without a variable and collection")),
        };
        let items = Resolver::new(self.config).resolve(source)?;
        for item in &items {
            let mut scope = vars.clone();
            scope.insert(var.to_string(), file_stem(item));
            self.emit(body, &scope, out)?;
        }
        Ok(())
    }
}

/// Replaces `${name}` references for every binding in scope.
fn substitute(text: &str, vars: &BTreeMap<String, String>) -> String {
    if vars.is_empty() || !text.contains("${") {
        return text.to_string();
    }
    let mut result = text.to_string();
    for (name, value) in vars {
        result = result.replace(&format!("${{{name}}}"), value);
    }
    result
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
