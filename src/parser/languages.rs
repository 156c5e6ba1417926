use tree_sitter::Language as Grammar;

use crate::language::Language;

/// Return the tree-sitter grammar for a [`Language`], or `None` when no grammar is
/// registered (currently only [`Language::Unknown`]).
///
/// # Grammar selection rules
/// - Python           -> `tree_sitter_python::LANGUAGE`
/// - JavaScript       -> `tree_sitter_javascript::LANGUAGE` (covers JSX)
/// - TypeScript       -> `LANGUAGE_TYPESCRIPT`
/// - Tsx              -> `LANGUAGE_TSX`
pub fn grammar_for(language: Language) -> Option<Grammar> {
    match language {
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        Language::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_parsed_language_has_grammar() {
        for lang in Language::PARSED {
            assert!(grammar_for(lang).is_some(), "{:?} should have a grammar", lang);
        }
        assert!(grammar_for(Language::Unknown).is_none());
    }
}
