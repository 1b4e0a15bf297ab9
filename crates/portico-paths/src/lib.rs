//! Resource namespace and path resolution for Portico.
//!
//! Every other component addresses the filesystem through a [`Namespace`]
//! built once from the process root. Leaf paths are computed by joining
//! segments onto that root — never hand-written per call site — so a single
//! root change moves the whole layout consistently.
//!
//! The namespace is a two-level tree: a category (`frontend`, `backend`,
//! `shared`) maps to a set of named subtrees (`pages`, `routes`, ...), and
//! the special `root` category maps directly to the process root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A category entry: either a direct path or a named subtree mapping.
#[derive(Debug, Clone)]
enum CategoryNode {
    /// Category resolves to a single path (e.g. `root`).
    Direct(PathBuf),
    /// Category resolves to a root plus named subtrees.
    Tree {
        root: PathBuf,
        subtrees: HashMap<&'static str, PathBuf>,
    },
}

/// Immutable mapping from logical categories to base directories.
///
/// Built once at startup; read-only afterwards, so it is freely shareable
/// across request handlers.
#[derive(Debug, Clone)]
pub struct Namespace {
    root: PathBuf,
    categories: HashMap<&'static str, CategoryNode>,
}

impl Namespace {
    /// Build the namespace from a process root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let frontend = root.join("frontend");
        let frontend_src = frontend.join("src");
        let backend = root.join("backend");
        let shared = root.join("shared");

        let mut categories = HashMap::new();
        categories.insert("root", CategoryNode::Direct(root.clone()));
        categories.insert(
            "frontend",
            CategoryNode::Tree {
                root: frontend.clone(),
                subtrees: HashMap::from([
                    ("root", frontend),
                    ("src", frontend_src.clone()),
                    ("pages", frontend_src.join("pages")),
                    ("components", frontend_src.join("components")),
                    ("services", frontend_src.join("services")),
                    ("assets", frontend_src.join("assets")),
                    ("cls", frontend_src.join("cls")),
                ]),
            },
        );
        categories.insert(
            "backend",
            CategoryNode::Tree {
                root: backend.clone(),
                subtrees: HashMap::from([
                    ("root", backend.clone()),
                    ("config", backend.join("config")),
                    ("models", backend.join("models")),
                    ("routes", backend.join("routes")),
                ]),
            },
        );
        categories.insert(
            "shared",
            CategoryNode::Tree {
                root: shared.clone(),
                subtrees: HashMap::from([
                    ("root", shared.clone()),
                    ("constants", shared.join("constants")),
                    ("utils", shared.join("utils")),
                ]),
            },
        );

        Self { root, categories }
    }

    /// The process root this namespace was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a category plus optional subpath segments to a concrete path.
    ///
    /// Returns `None` for an unknown category — callers must treat that as a
    /// hard failure, not a fallback trigger. For tree categories the first
    /// segment is tried as a subtree name; if it is not one, all segments
    /// join onto the category root instead. This lets callers address either
    /// a named subtree (`resolve("backend", &["routes", "admin"])`) or fall
    /// through to the category root without a branch per access pattern.
    #[must_use]
    pub fn resolve(&self, category: &str, segments: &[&str]) -> Option<PathBuf> {
        let node = self.categories.get(category)?;

        let path = match node {
            CategoryNode::Direct(path) => join_all(path, segments),
            CategoryNode::Tree { root, subtrees } => match segments.split_first() {
                None => root.clone(),
                Some((first, rest)) => subtrees
                    .get(first)
                    .map_or_else(|| join_all(root, segments), |sub| join_all(sub, rest)),
            },
        };

        Some(path)
    }

    /// Resolve within the `frontend` category.
    #[must_use]
    pub fn frontend(&self, segments: &[&str]) -> PathBuf {
        self.resolve_known("frontend", segments)
    }

    /// Resolve within the `backend` category.
    #[must_use]
    pub fn backend(&self, segments: &[&str]) -> PathBuf {
        self.resolve_known("backend", segments)
    }

    /// Resolve within the `shared` category.
    #[must_use]
    pub fn shared(&self, segments: &[&str]) -> PathBuf {
        self.resolve_known("shared", segments)
    }

    /// Resolve a relative path against the process root.
    ///
    /// Absolute paths pass through unchanged.
    #[must_use]
    pub fn resolve_relative(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Resolution for categories constructed in `new` and known to exist.
    fn resolve_known(&self, category: &'static str, segments: &[&str]) -> PathBuf {
        match self.resolve(category, segments) {
            Some(path) => path,
            // Unreachable for built-in categories; fall back to the root
            // rather than panicking in a path helper.
            None => join_all(&self.root, segments),
        }
    }
}

/// Join segments onto a base path.
fn join_all(base: &Path, segments: &[&str]) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn namespace() -> Namespace {
        Namespace::new("/srv/app")
    }

    #[test]
    fn test_known_categories_resolve() {
        let ns = namespace();
        for category in ["root", "frontend", "backend", "shared"] {
            assert!(ns.resolve(category, &[]).is_some(), "category {category}");
        }
    }

    #[test]
    fn test_unknown_category_is_none() {
        assert_eq!(namespace().resolve("database", &[]), None);
        assert_eq!(namespace().resolve("", &["x"]), None);
    }

    #[test]
    fn test_root_is_direct_path() {
        let ns = namespace();
        assert_eq!(ns.resolve("root", &[]), Some(PathBuf::from("/srv/app")));
        assert_eq!(
            ns.resolve("root", &["manifest.webmanifest"]),
            Some(PathBuf::from("/srv/app/manifest.webmanifest"))
        );
    }

    #[test]
    fn test_subtree_lookup() {
        let ns = namespace();
        assert_eq!(
            ns.resolve("backend", &["routes", "contact.rs"]),
            Some(PathBuf::from("/srv/app/backend/routes/contact.rs"))
        );
        assert_eq!(
            ns.resolve("frontend", &["pages", "about.html"]),
            Some(PathBuf::from("/srv/app/frontend/src/pages/about.html"))
        );
    }

    #[test]
    fn test_unknown_subkey_falls_back_to_category_root() {
        let ns = namespace();
        // "dist" is not a frontend subtree, so segments join onto frontend/.
        assert_eq!(
            ns.resolve("frontend", &["dist", "app.js"]),
            Some(PathBuf::from("/srv/app/frontend/dist/app.js"))
        );
    }

    #[test]
    fn test_no_segments_returns_category_root() {
        let ns = namespace();
        assert_eq!(
            ns.resolve("backend", &[]),
            Some(PathBuf::from("/srv/app/backend"))
        );
    }

    #[test]
    fn test_convenience_accessors() {
        let ns = namespace();
        assert_eq!(
            ns.frontend(&["src", "index.html"]),
            PathBuf::from("/srv/app/frontend/src/index.html")
        );
        assert_eq!(ns.backend(&["routes"]), PathBuf::from("/srv/app/backend/routes"));
        assert_eq!(
            ns.shared(&["utils", "endpoints.json"]),
            PathBuf::from("/srv/app/shared/utils/endpoints.json")
        );
    }

    #[test]
    fn test_resolve_relative() {
        let ns = namespace();
        assert_eq!(
            ns.resolve_relative(Path::new("manifest.webmanifest")),
            PathBuf::from("/srv/app/manifest.webmanifest")
        );
        assert_eq!(
            ns.resolve_relative(Path::new("/etc/other")),
            PathBuf::from("/etc/other")
        );
    }

    #[test]
    fn test_explicit_root_subkey_matches_category_root() {
        let ns = namespace();
        assert_eq!(ns.resolve("frontend", &["root"]), ns.resolve("frontend", &[]));
    }
}
