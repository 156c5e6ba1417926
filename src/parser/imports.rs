use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

use crate::language::Language;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// The statement shape an import was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Python `import a.b`
    Import,
    /// Python `from a.b import c`
    FromImport,
    /// ESM static import: `import { X } from './module'` or `import './module'`
    EsModule,
    /// `export { X } from './module'` / `export * from './module'`
    ReExport,
    /// CommonJS: `require('./module')`
    Require,
    /// `import('./module')`
    DynamicImport,
}

/// How the module string is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleNotation {
    /// `pkg.sub.mod`, with leading dots for relative imports (Python).
    Dotted,
    /// `./pkg/sub/mod` (JavaScript / TypeScript).
    Path,
}

impl ImportKind {
    pub fn notation(self) -> ModuleNotation {
        match self {
            ImportKind::Import | ImportKind::FromImport => ModuleNotation::Dotted,
            _ => ModuleNotation::Path,
        }
    }
}

/// One module reference as literally written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawImport {
    /// The raw module specifier, e.g. `"./utils"`, `"os.path"`, `"lodash"`.
    pub specifier: String,
    pub kind: ImportKind,
}

impl RawImport {
    pub fn new(specifier: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
        }
    }

    /// Rebuild an import from a cached specifier string. Only the notation matters for
    /// resolution, and that is a property of the importing file's language.
    pub fn from_cached(specifier: impl Into<String>, language: Language) -> Self {
        let kind = if language.uses_dotted_modules() {
            ImportKind::FromImport
        } else {
            ImportKind::EsModule
        };
        Self::new(specifier, kind)
    }

    pub fn notation(&self) -> ModuleNotation {
        self.kind.notation()
    }

    /// Relative imports start with `.` in both notations.
    pub fn is_relative(&self) -> bool {
        self.specifier.starts_with('.')
    }
}

// ---------------------------------------------------------------------------
// Node classification
// ---------------------------------------------------------------------------

/// Python grammar node kinds the extractor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PyNode {
    Import,
    ImportFrom,
    FutureImport,
    /// Subtrees that cannot contain an import statement.
    Opaque,
    Other,
}

impl PyNode {
    fn classify(kind: &str) -> Self {
        match kind {
            "import_statement" => PyNode::Import,
            "import_from_statement" => PyNode::ImportFrom,
            "future_import_statement" => PyNode::FutureImport,
            "expression_statement" | "string" | "concatenated_string" | "comment" => {
                PyNode::Opaque
            }
            _ => PyNode::Other,
        }
    }
}

/// JavaScript / TypeScript grammar node kinds the extractor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsNode {
    Import,
    Export,
    Call,
    Opaque,
    Other,
}

impl JsNode {
    fn classify(kind: &str) -> Self {
        match kind {
            "import_statement" => JsNode::Import,
            "export_statement" => JsNode::Export,
            "call_expression" => JsNode::Call,
            "string" | "template_string" | "comment" | "regex" | "number" => JsNode::Opaque,
            _ => JsNode::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// The unquoted contents of a JS `string` node. Empty strings yield `None`.
fn string_value(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut cursor = node.walk();
    let fragment: String = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "string_fragment")
        .map(|c| node_text(c, source))
        .collect();
    if fragment.is_empty() {
        None
    } else {
        Some(fragment)
    }
}

/// Python module text with any stray whitespace removed (`from . pkg import x`
/// is legal but the reference is `.pkg`).
fn py_module_text(node: Node, source: &[u8]) -> String {
    node_text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// The imported dotted name of an `import` / `from ... import` name entry, ignoring aliases.
fn py_imported_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(py_module_text(node, source)),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| py_module_text(n, source)),
        _ => None,
    }
}

/// Push `node`'s children so they pop in source order.
fn push_children<'t>(node: Node<'t>, stack: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    stack.extend(children.into_iter().rev());
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract every import reference from a parsed syntax tree.
///
/// Depth-first over the whole tree with an explicit stack: every node is popped at most
/// once, matched import nodes are not descended into, and opaque subtrees are skipped.
/// Error nodes produced by tree-sitter's recovery are walked like any other node.
pub fn extract_imports(tree: &Tree, source: &[u8], language: Language) -> Vec<RawImport> {
    match language {
        Language::Python => extract_python(tree, source),
        Language::JavaScript | Language::TypeScript | Language::Tsx => extract_js(tree, source),
        Language::Unknown => Vec::new(),
    }
}

fn extract_python(tree: &Tree, source: &[u8]) -> Vec<RawImport> {
    let mut imports = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        match PyNode::classify(node.kind()) {
            PyNode::Import => {
                // `import a, b.c as d`: one reference per module.
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    if let Some(module) = py_imported_name(name, source)
                        && !module.is_empty()
                    {
                        imports.push(RawImport::new(module, ImportKind::Import));
                    }
                }
            }
            PyNode::ImportFrom => python_from_import(node, source, &mut imports),
            PyNode::FutureImport | PyNode::Opaque => {}
            PyNode::Other => push_children(node, &mut stack),
        }
    }

    imports
}

/// `from m import x` yields `m`. A bare-dots module (`from . import a, b`) names sibling
/// modules, so it yields one reference per imported name (`.a`, `.b`); a wildcard from a
/// bare-dots module refers to the package itself.
fn python_from_import(node: Node, source: &[u8], imports: &mut Vec<RawImport>) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let module = py_module_text(module_node, source);
    if module.is_empty() {
        return;
    }

    if !module.chars().all(|c| c == '.') {
        imports.push(RawImport::new(module, ImportKind::FromImport));
        return;
    }

    let mut cursor = node.walk();
    let names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|n| py_imported_name(n, source))
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        imports.push(RawImport::new(module, ImportKind::FromImport));
    } else {
        for name in names {
            imports.push(RawImport::new(format!("{module}{name}"), ImportKind::FromImport));
        }
    }
}

fn extract_js(tree: &Tree, source: &[u8]) -> Vec<RawImport> {
    let mut imports = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        match JsNode::classify(node.kind()) {
            JsNode::Import => {
                // `import x from 's'`, `import 's'`, and TS `import x = require('s')`.
                let source_node = node.child_by_field_name("source").or_else(|| {
                    let mut cursor = node.walk();
                    node.children(&mut cursor)
                        .find(|c| c.kind() == "import_require_clause")
                        .and_then(|c| c.child_by_field_name("source"))
                });
                if let Some(spec) = source_node.and_then(|s| string_value(s, source)) {
                    imports.push(RawImport::new(spec, ImportKind::EsModule));
                }
            }
            JsNode::Export => match node.child_by_field_name("source") {
                Some(src) => {
                    if let Some(spec) = string_value(src, source) {
                        imports.push(RawImport::new(spec, ImportKind::ReExport));
                    }
                }
                // `export const x = require('./y')`: keep looking inside.
                None => push_children(node, &mut stack),
            },
            JsNode::Call => match js_call_import(node, source) {
                Some(import) => imports.push(import),
                None => push_children(node, &mut stack),
            },
            JsNode::Opaque => {}
            JsNode::Other => push_children(node, &mut stack),
        }
    }

    imports
}

/// `require('s')` or `import('s')` with a literal first argument.
fn js_call_import(call: Node, source: &[u8]) -> Option<RawImport> {
    let function = call.child_by_field_name("function")?;
    let kind = match function.kind() {
        "import" => ImportKind::DynamicImport,
        "identifier" if node_text(function, source) == "require" => ImportKind::Require,
        _ => return None,
    };
    let arguments = call.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    let spec = string_value(first, source)?;
    Some(RawImport::new(spec, kind))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
