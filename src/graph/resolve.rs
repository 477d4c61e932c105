//! Module identifiers and import resolution.
//!
//! A module identifier is derived from a file's path according to its
//! language's naming convention. Import references are resolved against the
//! set of identifiers known for the same convention; anything that does not
//! resolve is an external package.

use std::collections::{BTreeSet, HashMap};

use crate::analysis::{languages, FileAnalysis, ModuleConvention};

/// Outcome of resolving one import reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A module identifier present in the repository.
    Internal(String),
    /// An external package name.
    External(String),
    /// Refers to repository code but to no single module (e.g. a Java
    /// wildcard import of an internal package). Produces no edge.
    Ambiguous,
}

/// Derive the module identifier of a `/`-separated relative path.
pub fn module_id(path: &str, convention: ModuleConvention) -> String {
    let path = path.trim_start_matches("./");
    match convention {
        ModuleConvention::Python => {
            let mut parts = stem_parts(path);
            if parts.len() > 1 && parts.last().map_or(false, |p| p == "__init__") {
                parts.pop();
            }
            parts.join(".")
        }
        ModuleConvention::EcmaScript => {
            let mut parts = stem_parts(path);
            if parts.len() > 1 && parts.last().map_or(false, |p| p == "index") {
                parts.pop();
            }
            parts.join("/")
        }
        ModuleConvention::Rust => rust_module_id(path),
        ModuleConvention::Go => match path.rfind('/') {
            Some(idx) => path[..idx].to_string(),
            None => ".".to_string(),
        },
        ModuleConvention::Java => stem_parts(path).join("."),
        ModuleConvention::CInclude => path.to_string(),
    }
}

/// Path segments with the extension removed from the last one.
fn stem_parts(path: &str) -> Vec<String> {
    let mut parts: Vec<String> = path.split('/').map(str::to_string).collect();
    if let Some(last) = parts.last_mut() {
        if let Some(dot) = last.rfind('.') {
            if dot > 0 {
                last.truncate(dot);
            }
        }
    }
    parts
}

/// `crate::a::b` for `src/a/b.rs`; workspace members use their directory name.
fn rust_module_id(path: &str) -> String {
    let parts = stem_parts(path);
    let dirs = &parts[..parts.len() - 1];

    let (krate, mut rest): (String, Vec<String>) = match dirs.iter().rposition(|p| p == "src") {
        Some(0) => ("crate".to_string(), parts[1..].to_vec()),
        Some(s) => (parts[s - 1].replace('-', "_"), parts[s + 1..].to_vec()),
        None => ("crate".to_string(), parts.clone()),
    };

    if rest.len() == 1 && (rest[0] == "lib" || rest[0] == "main") {
        rest.clear();
    }
    if rest.last().map_or(false, |p| p == "mod") {
        rest.pop();
    }

    std::iter::once(krate)
        .chain(rest)
        .collect::<Vec<_>>()
        .join("::")
}

/// Collapse `.` and `..` segments of a `/`-separated path.
pub fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if out.last().map_or(false, |p| *p != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn join(dir: &str, rel: &str) -> String {
    if dir.is_empty() {
        normalize(rel)
    } else {
        normalize(&format!("{}/{}", dir, rel))
    }
}

/// Separator between segments of a module identifier.
fn separator(convention: ModuleConvention) -> &'static str {
    match convention {
        ModuleConvention::Python | ModuleConvention::Java => ".",
        ModuleConvention::Rust => "::",
        ModuleConvention::EcmaScript | ModuleConvention::Go | ModuleConvention::CInclude => "/",
    }
}

/// `a.b.c` → `a.b.c`, `a.b`, `a`.
fn trailing_drops<'t>(target: &'t str, sep: &str) -> Vec<&'t str> {
    let mut out = vec![target];
    let mut current = target;
    while let Some(idx) = current.rfind(sep) {
        current = &current[..idx];
        if current.is_empty() {
            break;
        }
        out.push(current);
    }
    out
}

/// npm package name of a bare specifier: `@scope/pkg/x` → `@scope/pkg`.
pub fn npm_package_name(specifier: &str) -> String {
    let mut parts = specifier.split('/');
    match parts.next() {
        Some(scope) if scope.starts_with('@') => match parts.next() {
            Some(name) => format!("{}/{}", scope, name),
            None => scope.to_string(),
        },
        Some(first) => first.to_string(),
        None => specifier.to_string(),
    }
}

/// Leading lowercase segments of a dotted Java name: `org.junit.Assert.x` → `org.junit`.
fn java_package(target: &str) -> String {
    let package: Vec<&str> = target
        .split('.')
        .take_while(|s| s.chars().next().map_or(false, |c| c.is_lowercase()) && *s != "*")
        .collect();
    if package.is_empty() {
        target.trim_end_matches(".*").to_string()
    } else {
        package.join(".")
    }
}

const ECMASCRIPT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts"];

/// Known module identifiers grouped by naming convention.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    ids: HashMap<ModuleConvention, BTreeSet<String>>,
    /// Every segment suffix of every identifier → shortest identifier carrying it.
    suffixes: HashMap<ModuleConvention, HashMap<String, String>>,
    /// Java package names and their suffixes.
    java_packages: BTreeSet<String>,
}

impl ModuleIndex {
    /// Index the module identifiers of every file with a known language.
    pub fn from_files(files: &[FileAnalysis]) -> Self {
        let mut ids: HashMap<ModuleConvention, BTreeSet<String>> = HashMap::new();
        for file in files {
            if let Some(convention) = convention_of(file) {
                ids.entry(convention).or_default().insert(file.module.clone());
            }
        }

        let mut suffixes: HashMap<ModuleConvention, HashMap<String, String>> = HashMap::new();
        let mut java_packages = BTreeSet::new();

        for (convention, set) in &ids {
            let sep = separator(*convention);
            let index = suffixes.entry(*convention).or_default();
            for id in set {
                let parts: Vec<&str> = id.split(sep).collect();
                for start in 0..parts.len() {
                    let suffix = parts[start..].join(sep);
                    index
                        .entry(suffix)
                        .and_modify(|current| {
                            if id.len() < current.len() {
                                *current = id.clone();
                            }
                        })
                        .or_insert_with(|| id.clone());
                }
                if *convention == ModuleConvention::Java && parts.len() > 1 {
                    let package = &parts[..parts.len() - 1];
                    for start in 0..package.len() {
                        java_packages.insert(package[start..].join("."));
                    }
                }
            }
        }

        Self {
            ids,
            suffixes,
            java_packages,
        }
    }

    /// Whether `id` is a known module identifier under `convention`.
    pub fn contains(&self, convention: ModuleConvention, id: &str) -> bool {
        self.ids.get(&convention).map_or(false, |set| set.contains(id))
    }

    fn exact(&self, convention: ModuleConvention, id: &str) -> Option<String> {
        self.contains(convention, id).then(|| id.to_string())
    }

    fn by_suffix(&self, convention: ModuleConvention, suffix: &str) -> Option<String> {
        self.suffixes
            .get(&convention)
            .and_then(|index| index.get(suffix))
            .cloned()
    }

    /// Resolve one import reference of `file`.
    pub fn resolve(&self, file: &FileAnalysis, convention: ModuleConvention, target: &str) -> Resolution {
        match convention {
            ModuleConvention::Python => self.resolve_python(file, target),
            ModuleConvention::EcmaScript => self.resolve_ecmascript(file, target),
            ModuleConvention::Rust => self.resolve_rust(file, target),
            ModuleConvention::Go => self.resolve_go(target),
            ModuleConvention::Java => self.resolve_java(target),
            ModuleConvention::CInclude => self.resolve_c(file, target),
        }
    }

    fn resolve_python(&self, file: &FileAnalysis, target: &str) -> Resolution {
        let conv = ModuleConvention::Python;
        let dots = target.chars().take_while(|c| *c == '.').count();
        let rest = &target[dots..];

        if dots > 0 {
            let is_package = file.path.rsplit('/').next().map_or(false, |f| f.starts_with("__init__."));
            let mut base: Vec<&str> = file.module.split('.').collect();
            if !is_package {
                base.pop();
            }
            for _ in 1..dots {
                base.pop();
            }
            if !rest.is_empty() {
                base.push(rest);
            }
            let absolute = base.join(".");
            if absolute.is_empty() {
                return Resolution::External(target.to_string());
            }
            for candidate in trailing_drops(&absolute, ".") {
                if let Some(id) = self.exact(conv, candidate) {
                    return Resolution::Internal(id);
                }
            }
            return Resolution::External(absolute);
        }

        let drops = trailing_drops(rest, ".");
        for candidate in &drops {
            if let Some(id) = self.exact(conv, candidate) {
                return Resolution::Internal(id);
            }
        }
        for candidate in &drops {
            if let Some(id) = self.by_suffix(conv, candidate) {
                return Resolution::Internal(id);
            }
        }
        Resolution::External(rest.split('.').next().unwrap_or(rest).to_string())
    }

    fn resolve_ecmascript(&self, file: &FileAnalysis, target: &str) -> Resolution {
        let conv = ModuleConvention::EcmaScript;

        if target.starts_with("./") || target.starts_with("../") || target == "." || target == ".." {
            let joined = join(directory_of(&file.path), target);
            let stripped = ECMASCRIPT_EXTENSIONS
                .iter()
                .find_map(|ext| joined.strip_suffix(ext))
                .unwrap_or(&joined);
            let base = stripped.strip_suffix("/index").unwrap_or(stripped);
            if let Some(id) = self.exact(conv, base) {
                return Resolution::Internal(id);
            }
            return Resolution::External(joined);
        }

        if let Some(id) = self.exact(conv, target) {
            return Resolution::Internal(id);
        }
        Resolution::External(npm_package_name(target))
    }

    fn resolve_rust(&self, file: &FileAnalysis, target: &str) -> Resolution {
        let conv = ModuleConvention::Rust;
        let source: Vec<&str> = file.module.split("::").collect();
        let segs: Vec<&str> = target.split("::").filter(|s| !s.is_empty()).collect();
        let Some(&head) = segs.first() else {
            return Resolution::External(target.to_string());
        };

        let anchored: Option<Vec<&str>> = match head {
            "crate" => Some(source[..1].iter().chain(&segs[1..]).copied().collect()),
            "self" => Some(source.iter().chain(&segs[1..]).copied().collect()),
            "super" => {
                let supers = segs.iter().take_while(|s| **s == "super").count();
                let keep = source.len().saturating_sub(supers).max(1);
                Some(source[..keep].iter().chain(&segs[supers..]).copied().collect())
            }
            _ => None,
        };

        let longest = |path: &[&str], min: usize| -> Option<String> {
            (min.max(1)..=path.len())
                .rev()
                .map(|n| path[..n].join("::"))
                .find(|candidate| self.contains(conv, candidate))
        };

        if let Some(path) = anchored {
            return match longest(&path, 1) {
                Some(id) => Resolution::Internal(id),
                None => Resolution::External(path[0].to_string()),
            };
        }

        // A child module named without `self::`, then another workspace crate.
        let relative: Vec<&str> = source.iter().chain(&segs).copied().collect();
        if let Some(id) = longest(&relative, source.len() + 1) {
            return Resolution::Internal(id);
        }
        if let Some(id) = longest(&segs, 1) {
            return Resolution::Internal(id);
        }
        Resolution::External(head.to_string())
    }

    fn resolve_go(&self, target: &str) -> Resolution {
        let conv = ModuleConvention::Go;
        if let Some(id) = self.exact(conv, target) {
            return Resolution::Internal(id);
        }

        // Standard library paths have no domain in their first segment.
        let first = target.split('/').next().unwrap_or(target);
        if first.contains('.') {
            let parts: Vec<&str> = target.split('/').collect();
            for start in 1..parts.len() {
                let suffix = parts[start..].join("/");
                if let Some(id) = self.exact(conv, &suffix) {
                    return Resolution::Internal(id);
                }
            }
        }
        Resolution::External(target.to_string())
    }

    fn resolve_java(&self, target: &str) -> Resolution {
        let conv = ModuleConvention::Java;

        if let Some(package) = target.strip_suffix(".*") {
            if self.java_packages.contains(package) {
                return Resolution::Ambiguous;
            }
            return Resolution::External(package.to_string());
        }

        let drops = trailing_drops(target, ".");
        for candidate in &drops {
            if let Some(id) = self.exact(conv, candidate) {
                return Resolution::Internal(id);
            }
        }
        // Static imports name a member; allow dropping it but never the package.
        for candidate in drops.iter().take(2) {
            if candidate.contains('.') {
                if let Some(id) = self.by_suffix(conv, candidate) {
                    return Resolution::Internal(id);
                }
            }
        }
        Resolution::External(java_package(target))
    }

    fn resolve_c(&self, file: &FileAnalysis, target: &str) -> Resolution {
        let conv = ModuleConvention::CInclude;

        if let Some(system) = target.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Resolution::External(system.to_string());
        }

        let beside = join(directory_of(&file.path), target);
        if let Some(id) = self.exact(conv, &beside) {
            return Resolution::Internal(id);
        }
        let normalized = normalize(target);
        if let Some(id) = self.exact(conv, &normalized) {
            return Resolution::Internal(id);
        }
        if let Some(id) = self.by_suffix(conv, &normalized) {
            return Resolution::Internal(id);
        }
        Resolution::External(normalized)
    }
}

/// Naming convention of a file's language, if the language has an analyzer.
pub fn convention_of(file: &FileAnalysis) -> Option<ModuleConvention> {
    languages::for_language(&file.language).map(|a| a.profile().module_convention)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, language: &str) -> FileAnalysis {
        let analyzer = languages::for_language(language).expect("language");
        let module = module_id(path, analyzer.profile().module_convention);
        FileAnalysis::unscannable(path, analyzer.language_id(), &module)
    }

    fn index(files: &[FileAnalysis]) -> ModuleIndex {
        ModuleIndex::from_files(files)
    }

    #[test]
    fn test_module_id_python() {
        assert_eq!(module_id("pkg/sub/mod.py", ModuleConvention::Python), "pkg.sub.mod");
        assert_eq!(module_id("pkg/__init__.py", ModuleConvention::Python), "pkg");
        assert_eq!(module_id("main.py", ModuleConvention::Python), "main");
    }

    #[test]
    fn test_module_id_rust() {
        assert_eq!(module_id("src/lib.rs", ModuleConvention::Rust), "crate");
        assert_eq!(module_id("src/main.rs", ModuleConvention::Rust), "crate");
        assert_eq!(module_id("src/graph/mod.rs", ModuleConvention::Rust), "crate::graph");
        assert_eq!(module_id("src/graph/cycles.rs", ModuleConvention::Rust), "crate::graph::cycles");
        assert_eq!(
            module_id("crates/my-core/src/lib.rs", ModuleConvention::Rust),
            "my_core"
        );
        assert_eq!(
            module_id("crates/my-core/src/net/tcp.rs", ModuleConvention::Rust),
            "my_core::net::tcp"
        );
    }

    #[test]
    fn test_module_id_other_conventions() {
        assert_eq!(module_id("src/lib/index.ts", ModuleConvention::EcmaScript), "src/lib");
        assert_eq!(module_id("src/app.jsx", ModuleConvention::EcmaScript), "src/app");
        assert_eq!(module_id("internal/db/conn.go", ModuleConvention::Go), "internal/db");
        assert_eq!(module_id("main.go", ModuleConvention::Go), ".");
        assert_eq!(
            module_id("src/main/java/com/ex/Foo.java", ModuleConvention::Java),
            "src.main.java.com.ex.Foo"
        );
        assert_eq!(module_id("src/util.h", ModuleConvention::CInclude), "src/util.h");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("src/a/../b/./c"), "src/b/c");
        assert_eq!(normalize("../x"), "../x");
        assert_eq!(normalize("./a//b"), "a/b");
    }

    #[test]
    fn test_npm_package_name() {
        assert_eq!(npm_package_name("lodash/fp"), "lodash");
        assert_eq!(npm_package_name("@types/node/fs"), "@types/node");
        assert_eq!(npm_package_name("react"), "react");
    }

    #[test]
    fn test_resolve_python() {
        let files = vec![
            file("app/__init__.py", "python"),
            file("app/models.py", "python"),
            file("app/views.py", "python"),
            file("src/lib/helpers.py", "python"),
        ];
        let idx = index(&files);
        let views = &files[2];

        assert_eq!(idx.resolve(views, ModuleConvention::Python, ".models"), Resolution::Internal("app.models".into()));
        assert_eq!(idx.resolve(views, ModuleConvention::Python, ".models.User"), Resolution::Internal("app.models".into()));
        assert_eq!(idx.resolve(views, ModuleConvention::Python, ".helper_fn"), Resolution::Internal("app".into()));
        assert_eq!(idx.resolve(views, ModuleConvention::Python, "app.models"), Resolution::Internal("app.models".into()));
        assert_eq!(idx.resolve(views, ModuleConvention::Python, "lib.helpers.run"), Resolution::Internal("src.lib.helpers".into()));
        assert_eq!(idx.resolve(views, ModuleConvention::Python, "requests.adapters"), Resolution::External("requests".into()));

        let init = &files[0];
        assert_eq!(idx.resolve(init, ModuleConvention::Python, ".views"), Resolution::Internal("app.views".into()));
    }

    #[test]
    fn test_resolve_ecmascript() {
        let files = vec![
            file("src/index.ts", "typescript"),
            file("src/lib/util.ts", "typescript"),
            file("src/components/index.jsx", "javascript"),
        ];
        let idx = index(&files);
        let util = &files[1];

        assert_eq!(idx.resolve(util, ModuleConvention::EcmaScript, "../components"), Resolution::Internal("src/components".into()));
        assert_eq!(idx.resolve(util, ModuleConvention::EcmaScript, "../index.js"), Resolution::Internal("src".into()));
        assert_eq!(idx.resolve(&files[0], ModuleConvention::EcmaScript, "./lib/util"), Resolution::Internal("src/lib/util".into()));
        assert_eq!(idx.resolve(util, ModuleConvention::EcmaScript, "@scope/pkg/deep"), Resolution::External("@scope/pkg".into()));
        assert_eq!(idx.resolve(util, ModuleConvention::EcmaScript, "./styles.css"), Resolution::External("src/lib/styles.css".into()));
    }

    #[test]
    fn test_resolve_rust() {
        let files = vec![
            file("src/lib.rs", "rust"),
            file("src/graph/mod.rs", "rust"),
            file("src/graph/cycles.rs", "rust"),
            file("src/config.rs", "rust"),
        ];
        let idx = index(&files);
        let cycles = &files[2];
        let graph = &files[1];
        let lib = &files[0];

        assert_eq!(idx.resolve(cycles, ModuleConvention::Rust, "crate::config::Config"), Resolution::Internal("crate::config".into()));
        assert_eq!(idx.resolve(cycles, ModuleConvention::Rust, "super"), Resolution::Internal("crate::graph".into()));
        assert_eq!(idx.resolve(graph, ModuleConvention::Rust, "self::cycles"), Resolution::Internal("crate::graph::cycles".into()));
        assert_eq!(idx.resolve(lib, ModuleConvention::Rust, "graph::cycles::find"), Resolution::Internal("crate::graph::cycles".into()));
        assert_eq!(idx.resolve(graph, ModuleConvention::Rust, "std::collections::HashMap"), Resolution::External("std".into()));
    }

    #[test]
    fn test_resolve_go() {
        let files = vec![file("main.go", "go"), file("internal/db/conn.go", "go")];
        let idx = index(&files);
        let main = &files[0];

        assert_eq!(idx.resolve(main, ModuleConvention::Go, "example.com/app/internal/db"), Resolution::Internal("internal/db".into()));
        assert_eq!(idx.resolve(main, ModuleConvention::Go, "fmt"), Resolution::External("fmt".into()));
        assert_eq!(idx.resolve(main, ModuleConvention::Go, "github.com/x/y"), Resolution::External("github.com/x/y".into()));
    }

    #[test]
    fn test_resolve_java() {
        let files = vec![
            file("src/main/java/com/ex/model/User.java", "java"),
            file("src/main/java/com/ex/App.java", "java"),
        ];
        let idx = index(&files);
        let app = &files[1];

        assert_eq!(idx.resolve(app, ModuleConvention::Java, "com.ex.model.User"), Resolution::Internal("src.main.java.com.ex.model.User".into()));
        assert_eq!(idx.resolve(app, ModuleConvention::Java, "com.ex.model.User.create"), Resolution::Internal("src.main.java.com.ex.model.User".into()));
        assert_eq!(idx.resolve(app, ModuleConvention::Java, "com.ex.model.*"), Resolution::Ambiguous);
        assert_eq!(idx.resolve(app, ModuleConvention::Java, "java.util.List"), Resolution::External("java.util".into()));
        assert_eq!(idx.resolve(app, ModuleConvention::Java, "org.junit.*"), Resolution::External("org.junit".into()));
    }

    #[test]
    fn test_resolve_c() {
        let files = vec![
            file("src/main.c", "c"),
            file("src/util/strings.h", "c"),
            file("include/api.h", "c"),
        ];
        let idx = index(&files);
        let main = &files[0];

        assert_eq!(idx.resolve(main, ModuleConvention::CInclude, "util/strings.h"), Resolution::Internal("src/util/strings.h".into()));
        assert_eq!(idx.resolve(main, ModuleConvention::CInclude, "api.h"), Resolution::Internal("include/api.h".into()));
        assert_eq!(idx.resolve(main, ModuleConvention::CInclude, "<stdio.h>"), Resolution::External("stdio.h".into()));
        assert_eq!(idx.resolve(main, ModuleConvention::CInclude, "missing.h"), Resolution::External("missing.h".into()));
    }
}
