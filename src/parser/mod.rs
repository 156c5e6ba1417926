pub mod imports;
pub mod languages;

use std::cell::RefCell;

use anyhow::{Context, Result, anyhow};
use tree_sitter::Parser;

use crate::language::Language;

use imports::{RawImport, extract_imports};
use languages::grammar_for;

// Thread-local Parser instances, one per rayon worker thread.
// Each Parser is initialised once per thread with the appropriate grammar.
thread_local! {
    static PARSER_PY: RefCell<Parser> = RefCell::new(new_parser(Language::Python));
    static PARSER_JS: RefCell<Parser> = RefCell::new(new_parser(Language::JavaScript));
    static PARSER_TS: RefCell<Parser> = RefCell::new(new_parser(Language::TypeScript));
    static PARSER_TSX: RefCell<Parser> = RefCell::new(new_parser(Language::Tsx));
}

fn new_parser(language: Language) -> Parser {
    parser_for(language).unwrap_or_else(Parser::new)
}

/// Return a fresh parser configured for `language`, or `None` when no grammar is
/// registered. Files whose language has no parser are skipped, not failed.
pub fn parser_for(language: Language) -> Option<Parser> {
    let grammar = grammar_for(language)?;
    let mut parser = Parser::new();
    parser.set_language(&grammar).ok()?;
    Some(parser)
}

/// Parse `source` and extract its raw imports using a freshly allocated parser.
///
/// Suitable for one-off parses; bulk builds use [`parse_imports_parallel`].
///
/// # Errors
/// Returns an error if no grammar exists for `language` or tree-sitter returns no tree.
pub fn parse_imports(language: Language, source: &[u8]) -> Result<Vec<RawImport>> {
    let mut parser = parser_for(language)
        .with_context(|| format!("no grammar registered for {}", language.display_name()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("tree-sitter returned no tree"))?;
    Ok(extract_imports(&tree, source, language))
}

/// Same as [`parse_imports`] but reuses a per-thread Parser instead of allocating a
/// new one, so it can run on every rayon worker without contention.
///
/// # Errors
/// Returns an error if no grammar exists for `language` or tree-sitter returns no tree.
pub fn parse_imports_parallel(language: Language, source: &[u8]) -> Result<Vec<RawImport>> {
    let tree = match language {
        Language::Python => PARSER_PY.with(|p| p.borrow_mut().parse(source, None)),
        Language::JavaScript => PARSER_JS.with(|p| p.borrow_mut().parse(source, None)),
        Language::TypeScript => PARSER_TS.with(|p| p.borrow_mut().parse(source, None)),
        Language::Tsx => PARSER_TSX.with(|p| p.borrow_mut().parse(source, None)),
        Language::Unknown => return Err(anyhow!("no grammar registered for unknown language")),
    };
    let tree = tree.ok_or_else(|| anyhow!("tree-sitter returned no tree"))?;
    Ok(extract_imports(&tree, source, language))
}
