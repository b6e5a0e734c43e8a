use std::collections::BTreeMap;
use std::path::Path;

use stitch::{assemble, Config, Lexer, Parser, Renderer, Resolver};

fn config() -> Config {
    let mut config = Config::new();
    config.set_parent_dir("tests/fixtures");
    config
}

#[test]
fn config_from_file() {
    let config = Config::from_file("tests/fixtures/config.json").unwrap();
    assert_eq!(config.parent_dir(), Path::new("tests/fixtures"));
}

#[test]
fn config_from_file_missing() {
    let err = Config::from_file("tests/fixtures/nope.json").unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn resolver_orders_entries_by_file_name() {
    let config = config();
    let items = Resolver::new(&config).resolve("posts").unwrap();
    let names: Vec<_> = items
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, ["alpha.md", "beta.md", "gamma.md"]);
}

#[test]
fn resolver_missing_collection() {
    let config = config();
    let err = Resolver::new(&config).resolve("drafts").unwrap_err();
    assert!(err.to_string().contains("failed to resolve collection `drafts`"));
}

#[test]
fn render_passthrough() {
    let out = assemble("# Hello world\n", &Config::new()).unwrap();
    assert_eq!(out, "# Hello world");
}

#[test]
fn render_preamble_assignments() {
    let out = assemble("---\na=\"foo\"\nb=\"bar\"\n---\n", &Config::new()).unwrap();
    assert_eq!(out, "foo bar");
}

#[test]
fn render_collapses_context_sequence() {
    let ctx: BTreeMap<String, String> =
        [("foo".to_string(), "bar".to_string())].into_iter().collect();
    let tokens = Lexer::with_context("id=\"${foo}\"", &ctx).lex().unwrap();
    let mut parser = Parser::new();
    parser.set_tokens(tokens);
    parser.parse().unwrap();

    let config = Config::new();
    let out = Renderer::new(&config).render(parser.trees()).unwrap();
    assert_eq!(out, "id \"bar\"");
}

#[test]
fn render_for_loop_expands_collection() {
    let source = "@@ for post in \"posts\"\n@@ src=\"${post}.md\"\n";
    let out = assemble(source, &config()).unwrap();
    assert_eq!(out, "alpha.md beta.md gamma.md");
}

#[test]
fn render_for_loop_after_passthrough() {
    let source = "# Index\n@@ for post in \"posts\"\n@@ src=\"${post}.md\"\n";
    let out = assemble(source, &config()).unwrap();
    assert_eq!(out, "# Index alpha.md beta.md gamma.md");
}

#[test]
fn render_for_loop_missing_collection() {
    let source = "@@ for post in \"drafts\"\n@@ src=\"${post}.md\"\n";
    let err = assemble(source, &config()).unwrap_err();
    assert!(err.to_string().contains("failed to resolve collection `drafts`"));
}
