//! Import resolution against a known set of repo-relative paths.
//!
//! Resolution is a pure function of `(import, importing file, known paths)`: the only
//! "filesystem" it sees is membership in the provided [`PathSet`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

use crate::parser::imports::{ModuleNotation, RawImport};

/// Source-file extensions tried when an import omits one.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".py"];

/// Directory entry point for JavaScript-style packages (`index.<ext>`).
const INDEX_STEM: &str = "index";

/// Directory entry point for Python packages.
const PYTHON_BARREL: &str = "__init__.py";

/// Membership test over repo-relative POSIX paths.
pub trait PathSet {
    fn contains_path(&self, path: &str) -> bool;
}

impl<S: BuildHasher> PathSet for HashSet<String, S> {
    fn contains_path(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl PathSet for BTreeSet<String> {
    fn contains_path(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl<V, S: BuildHasher> PathSet for HashMap<String, V, S> {
    fn contains_path(&self, path: &str) -> bool {
        self.contains_key(path)
    }
}

/// Resolves raw imports to in-repository files by trying a fixed candidate list.
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Extensions with a leading dot, in trial order.
    extensions: Vec<String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl Resolver {
    /// Build a resolver trying `extensions` in order. A missing leading dot is added.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let extensions = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().trim();
                if e.starts_with('.') {
                    e.to_owned()
                } else {
                    format!(".{e}")
                }
            })
            .filter(|e| e.len() > 1 && seen.insert(e.clone()))
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `import` written in `importing_file` to a member of `known`.
    ///
    /// Returns `None` when no candidate exists (the import is external). Never returns
    /// `importing_file` itself.
    pub fn resolve<P: PathSet + ?Sized>(
        &self,
        import: &RawImport,
        importing_file: &str,
        known: &P,
    ) -> Option<String> {
        let base = module_base(import, importing_file)?;
        let candidates = if base.directory {
            self.barrel_candidates(&base.path)
        } else {
            self.candidates(&base.path)
        };
        candidates
            .into_iter()
            .filter(|candidate| candidate != importing_file)
            .find(|candidate| known.contains_path(candidate))
    }

    /// Candidate files for a module base path, in trial order: the path itself, the path
    /// with each extension, then each barrel file inside the path as a directory.
    pub fn candidates(&self, base: &str) -> Vec<String> {
        let mut out = Vec::with_capacity(self.extensions.len() * 2 + 2);

        if !base.is_empty() {
            out.push(base.to_owned());
            for ext in &self.extensions {
                out.push(format!("{base}{ext}"));
            }
        }

        out.extend(self.barrel_candidates(base));
        out
    }

    /// Barrel files inside `dir`: `index.<ext>` for each extension, then `__init__.py`
    /// when `.py` is configured.
    pub fn barrel_candidates(&self, dir: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .extensions
            .iter()
            .map(|ext| join(dir, &format!("{INDEX_STEM}{ext}")))
            .collect();
        if self.extensions.iter().any(|e| e == ".py") {
            out.push(join(dir, PYTHON_BARREL));
        }
        out
    }
}

/// Repo-relative path an import refers to, before extension trials.
struct ModuleBase {
    path: String,
    /// The specifier can only name a directory (`.`, `..`, `./dir/`), so only its barrel
    /// files are candidates.
    directory: bool,
}

/// Compute the base an import refers to.
///
/// Returns `None` for empty specifiers and for relative imports that climb above the
/// repository root.
fn module_base(import: &RawImport, importing_file: &str) -> Option<ModuleBase> {
    let spec = import.specifier.trim();
    if spec.is_empty() {
        return None;
    }
    let from_dir = parent_dir(importing_file);

    let (path, directory) = match (import.notation(), import.is_relative()) {
        (ModuleNotation::Path, true) => (
            walk_segments(from_dir, spec.split('/'))?,
            names_directory(spec),
        ),
        (ModuleNotation::Dotted, true) => {
            // `.mod` is a sibling, each extra dot climbs one package.
            let dots = spec.chars().take_while(|&c| c == '.').count();
            let rest = &spec[dots..];
            let ups = std::iter::repeat_n("..", dots - 1);
            let downs = rest.split('.').filter(|s| !s.is_empty());
            (walk_segments(from_dir, ups.chain(downs))?, rest.is_empty())
        }
        (ModuleNotation::Dotted, false) => (walk_segments("", spec.split('.'))?, false),
        (ModuleNotation::Path, false) => (
            walk_segments("", spec.trim_start_matches('/').split('/'))?,
            names_directory(spec),
        ),
    };
    Some(ModuleBase { path, directory })
}

/// `.`, `..`, and anything ending in `/`, `/.` or `/..` can only name a directory.
fn names_directory(spec: &str) -> bool {
    spec == "."
        || spec == ".."
        || spec.ends_with('/')
        || spec.ends_with("/.")
        || spec.ends_with("/..")
}

/// Apply `segments` to `start_dir`. `.` and empty segments are no-ops, `..` pops one
/// directory and fails at the repository root.
fn walk_segments<'a, I>(start_dir: &str, segments: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parts: Vec<&str> = start_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Extract the top-level package name from an unresolved module specifier.
///
/// - `react` → `react`
/// - `@org/utils/helpers` → `@org/utils`  (scoped package keeps both parts)
/// - `lodash/merge` → `lodash`
/// - `os.path` (dotted) → `os`
pub fn package_name(import: &RawImport) -> &str {
    let spec = import.specifier.as_str();
    match import.notation() {
        ModuleNotation::Dotted => spec.split('.').next().unwrap_or(spec),
        ModuleNotation::Path if spec.starts_with('@') => {
            let parts: Vec<&str> = spec.splitn(3, '/').collect();
            if parts.len() >= 2 {
                let scope_end = parts[0].len() + 1 + parts[1].len();
                &spec[..scope_end]
            } else {
                spec
            }
        }
        ModuleNotation::Path => match spec.find('/') {
            Some(idx) => &spec[..idx],
            None => spec,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::imports::ImportKind;
    use proptest::prelude::*;

    fn known(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn esm(spec: &str) -> RawImport {
        RawImport::new(spec, ImportKind::EsModule)
    }

    fn py(spec: &str) -> RawImport {
        RawImport::new(spec, ImportKind::FromImport)
    }

    #[test]
    fn test_relative_sibling_with_extension_trial() {
        let r = Resolver::default();
        let files = known(&["a/b.ts", "a/c.ts"]);
        assert_eq!(r.resolve(&esm("./c"), "a/b.ts", &files), Some("a/c.ts".into()));
    }

    #[test]
    fn test_relative_exact_path_wins() {
        let r = Resolver::default();
        let files = known(&["src/main.js", "src/util.js", "src/util.js.ts"]);
        assert_eq!(
            r.resolve(&esm("./util.js"), "src/main.js", &files),
            Some("src/util.js".into())
        );
    }

    #[test]
    fn test_relative_index_file() {
        let r = Resolver::default();
        let files = known(&["app.js", "utils/index.js"]);
        assert_eq!(
            r.resolve(&esm("./utils"), "app.js", &files),
            Some("utils/index.js".into())
        );
    }

    #[test]
    fn test_file_preferred_over_index() {
        let r = Resolver::default();
        let files = known(&["app.js", "utils.js", "utils/index.js"]);
        assert_eq!(
            r.resolve(&esm("./utils"), "app.js", &files),
            Some("utils.js".into())
        );
    }

    #[test]
    fn test_parent_directory_walk() {
        let r = Resolver::default();
        let files = known(&["src/lib/deep/x.ts", "src/shared.ts"]);
        assert_eq!(
            r.resolve(&esm("../../shared"), "src/lib/deep/x.ts", &files),
            Some("src/shared.ts".into())
        );
    }

    #[test]
    fn test_parent_walk_above_root_is_unresolved() {
        let r = Resolver::default();
        let files = known(&["a.ts", "b.ts"]);
        assert_eq!(r.resolve(&esm("../b"), "a.ts", &files), None);
    }

    #[test]
    fn test_never_resolves_to_self() {
        let r = Resolver::default();
        let files = known(&["a/b.ts"]);
        assert_eq!(r.resolve(&esm("./b"), "a/b.ts", &files), None);
        assert_eq!(r.resolve(&esm("./b.ts"), "a/b.ts", &files), None);
    }

    #[test]
    fn test_self_candidate_skipped_for_next_candidate() {
        let r = Resolver::default();
        // `./utils` from utils.ts skips itself and lands on the index barrel.
        let files = known(&["utils.ts", "utils/index.ts"]);
        assert_eq!(
            r.resolve(&esm("./utils"), "utils.ts", &files),
            Some("utils/index.ts".into())
        );
    }

    #[test]
    fn test_bare_package_is_external() {
        let r = Resolver::default();
        let files = known(&["src/app.tsx", "src/index.ts"]);
        assert_eq!(r.resolve(&esm("react"), "src/app.tsx", &files), None);
        assert_eq!(r.resolve(&esm("@org/ui/button"), "src/app.tsx", &files), None);
    }

    #[test]
    fn test_python_absolute_module() {
        let r = Resolver::default();
        let files = known(&["main.py", "utils.py", "pkg/sub/mod.py"]);
        assert_eq!(r.resolve(&py("utils"), "main.py", &files), Some("utils.py".into()));
        assert_eq!(
            r.resolve(&py("pkg.sub.mod"), "main.py", &files),
            Some("pkg/sub/mod.py".into())
        );
    }

    #[test]
    fn test_python_package_init() {
        let r = Resolver::default();
        let files = known(&["main.py", "pkg/__init__.py"]);
        assert_eq!(
            r.resolve(&py("pkg"), "main.py", &files),
            Some("pkg/__init__.py".into())
        );
    }

    #[test]
    fn test_python_relative_dots() {
        let r = Resolver::default();
        let files = known(&[
            "app/api/views.py",
            "app/api/models.py",
            "app/core/db.py",
            "app/api/__init__.py",
        ]);
        assert_eq!(
            r.resolve(&py(".models"), "app/api/views.py", &files),
            Some("app/api/models.py".into())
        );
        assert_eq!(
            r.resolve(&py("..core.db"), "app/api/views.py", &files),
            Some("app/core/db.py".into())
        );
        assert_eq!(
            r.resolve(&py("."), "app/api/views.py", &files),
            Some("app/api/__init__.py".into())
        );
    }

    #[test]
    fn test_python_stdlib_is_external() {
        let r = Resolver::default();
        let files = known(&["main.py"]);
        assert_eq!(r.resolve(&py("os.path"), "main.py", &files), None);
    }

    #[test]
    fn test_root_absolute_path_notation() {
        let r = Resolver::default();
        let files = known(&["src/a.ts", "src/config.ts"]);
        assert_eq!(
            r.resolve(&esm("/src/config"), "src/a.ts", &files),
            Some("src/config.ts".into())
        );
    }

    #[test]
    fn test_custom_extensions_normalised() {
        let r = Resolver::new(["vue", ".ts", "vue"]);
        assert_eq!(r.extensions(), &[".vue".to_string(), ".ts".to_string()]);
        let files = known(&["App.vue", "main.ts"]);
        assert_eq!(r.resolve(&esm("./App"), "main.ts", &files), Some("App.vue".into()));
    }

    #[test]
    fn test_candidate_order() {
        let r = Resolver::new([".ts", ".py"]);
        assert_eq!(
            r.candidates("lib/x"),
            vec![
                "lib/x",
                "lib/x.ts",
                "lib/x.py",
                "lib/x/index.ts",
                "lib/x/index.py",
                "lib/x/__init__.py",
            ]
        );
    }

    #[test]
    fn test_directory_specifiers_only_try_barrels() {
        let r = Resolver::default();
        let files = known(&["src/lib.ts", "src/lib/index.ts", "src/lib/a.ts", "src/main.ts"]);
        let barrel = Some("src/lib/index.ts".to_string());
        assert_eq!(r.resolve(&esm("./lib/"), "src/main.ts", &files), barrel);
        assert_eq!(r.resolve(&esm("."), "src/lib/a.ts", &files), barrel);
        assert_eq!(r.resolve(&esm("./"), "src/lib/a.ts", &files), barrel);
        assert_eq!(r.resolve(&esm("./lib/."), "src/main.ts", &files), barrel);
        assert_eq!(r.resolve(&esm(".."), "src/lib/deep/x.ts", &files), barrel);
        assert_eq!(r.resolve(&esm("../lib/deep/.."), "src/lib/a.ts", &files), barrel);
        assert_eq!(r.resolve(&esm("/src/lib/"), "src/main.ts", &files), barrel);
    }

    #[test]
    fn test_directory_specifier_without_barrel_is_unresolved() {
        let r = Resolver::default();
        let files = known(&["src/lib.ts", "src/lib/a.ts", "src/main.ts"]);
        assert_eq!(r.resolve(&esm("./lib/"), "src/main.ts", &files), None);
        assert_eq!(r.resolve(&esm("."), "src/lib/a.ts", &files), None);
        assert_eq!(r.resolve(&esm(".."), "src/lib/a.ts", &files), None);
    }

    #[test]
    fn test_python_bare_relative_package_skips_sibling_module() {
        let r = Resolver::default();
        let files = known(&["app/api.py", "app/api/__init__.py", "app/api/views.py"]);
        assert_eq!(
            r.resolve(&py("."), "app/api/views.py", &files),
            Some("app/api/__init__.py".into())
        );
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name(&esm("react")), "react");
        assert_eq!(package_name(&esm("@org/utils")), "@org/utils");
        assert_eq!(package_name(&esm("@org/utils/helpers")), "@org/utils");
        assert_eq!(package_name(&esm("lodash/merge")), "lodash");
        assert_eq!(package_name(&py("os.path")), "os");
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(prop::sample::select(vec!["a", "b", "utils", "pkg"]), 0..3),
            prop::sample::select(vec!["index", "mod", "utils", "__init__", "x"]),
            prop::sample::select(vec![".ts", ".js", ".py", ".tsx"]),
        )
            .prop_map(|(dirs, stem, ext)| {
                let mut parts: Vec<String> = dirs.into_iter().map(String::from).collect();
                parts.push(format!("{stem}{ext}"));
                parts.join("/")
            })
    }

    fn spec_strategy() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["", "./", "../", "../../", ".", ".."]),
            prop::collection::vec(prop::sample::select(vec!["a", "b", "utils", "mod", "x"]), 0..3),
            prop::sample::select(vec!["/", "."]),
        )
            .prop_map(|(prefix, segs, sep)| format!("{prefix}{}", segs.join(sep)))
    }

    proptest! {
        #[test]
        fn prop_resolution_is_known_and_never_self(
            files in prop::collection::hash_set(path_strategy(), 1..12),
            spec in spec_strategy(),
            dotted in any::<bool>(),
        ) {
            let r = Resolver::default();
            let from = files.iter().next().unwrap().clone();
            let kind = if dotted { ImportKind::FromImport } else { ImportKind::EsModule };
            let import = RawImport::new(spec, kind);
            if let Some(target) = r.resolve(&import, &from, &files) {
                prop_assert!(files.contains(&target));
                prop_assert_ne!(target, from);
            }
        }

        #[test]
        fn prop_resolution_is_deterministic(
            files in prop::collection::hash_set(path_strategy(), 1..12),
            spec in spec_strategy(),
        ) {
            let r = Resolver::default();
            let from = files.iter().next().unwrap().clone();
            let import = RawImport::new(spec, ImportKind::EsModule);
            let sorted: BTreeSet<String> = files.iter().cloned().collect();
            prop_assert_eq!(r.resolve(&import, &from, &files), r.resolve(&import, &from, &sorted));
        }
    }
}
