//! Static file resolution and serving.
//!
//! Resolution is a pure function of the namespace and filesystem existence:
//! the request path is classified as asset or page, probed against the two
//! frontend trees in the order that classification dictates, and finally
//! against the process root. The first existing regular file wins; a
//! directory hit is a miss, not an error.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use portico_paths::Namespace;

use crate::state::AppState;

/// Path prefixes that mark a request as a static asset rather than a page.
const ASSET_PREFIXES: [&str; 4] = ["services/", "components/", "assets/", "cls/"];

/// Resolve a request path to an existing regular file, or `None`.
///
/// Asset paths probe the source tree before the page tree. Page paths probe
/// the page tree first, then the page tree with `.html` appended, then the
/// source tree. Asset and page trees can both contain same-named files, so
/// the order decides which copy is served. A final probe joins the path
/// directly onto the process root, covering files outside both trees such
/// as a manifest.
pub(crate) fn resolve_static_file(namespace: &Namespace, request_path: &str) -> Option<PathBuf> {
    let clean = request_path.split('?').next().unwrap_or(request_path);
    let relative = clean.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    // Every probe joins the request path onto a root-derived tree, so a
    // parent-directory segment would escape the namespace entirely.
    if Path::new(relative)
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return None;
    }

    // Page documents live under the page tree regardless of URL shape.
    let relative = relative.strip_prefix("pages/").unwrap_or(relative);

    let is_asset = ASSET_PREFIXES
        .iter()
        .any(|prefix| relative.starts_with(prefix));

    let with_html = format!("{relative}.html");
    let mut candidates: Vec<PathBuf> = if is_asset {
        vec![
            namespace.frontend(&["src", relative]),
            namespace.frontend(&["pages", relative]),
        ]
    } else {
        vec![
            namespace.frontend(&["pages", relative]),
            namespace.frontend(&["pages", &with_html]),
            namespace.frontend(&["src", relative]),
        ]
    };
    candidates.push(namespace.resolve_relative(Path::new(relative)));

    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Serve the fixed entry document for the root path.
///
/// The entry document bypasses the probe order so it stays reachable even
/// when the page-tree search would miss it.
pub(crate) async fn serve_entry(State(state): State<Arc<AppState>>) -> Response {
    let index = state.namespace.frontend(&["src", "index.html"]);

    match tokio::fs::read(&index).await {
        Ok(data) => Html(data).into_response(),
        Err(err) => {
            tracing::warn!(path = %index.display(), error = %err, "Entry document missing");
            (
                StatusCode::NOT_FOUND,
                Html(
                    "<!DOCTYPE html><html><head><title>404</title></head>\
                     <body><h1>404 - Homepage Not Found</h1></body></html>"
                        .to_owned(),
                ),
            )
                .into_response()
        }
    }
}

/// Fallback handler: resolve and serve a static file, or 404.
pub(crate) async fn serve_static(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let pathname = uri.path();

    let Some(file_path) = resolve_static_file(&state.namespace, pathname) else {
        tracing::debug!(path = %pathname, "Static resolution miss");
        return not_found(pathname);
    };

    match tokio::fs::read(&file_path).await {
        Ok(data) => {
            let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(data))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(err) => {
            // Resolution raced a deletion; report the same miss the
            // resolver would have.
            tracing::warn!(path = %file_path.display(), error = %err, "Failed to read resolved file");
            not_found(pathname)
        }
    }
}

/// Catch-all 404 page echoing the requested path.
fn not_found(pathname: &str) -> Response {
    let escaped = pathname
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    (
        StatusCode::NOT_FOUND,
        Html(format!(
            "<!DOCTYPE html><html><head><title>404</title></head>\
             <body><h1>404 - Not Found</h1><p>{escaped}</p>\
             <p><a href=\"/\">Home</a></p></body></html>"
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    /// Lay out a frontend tree under a temp root and return it.
    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"content").unwrap();
        }
        dir
    }

    #[test]
    fn test_asset_prefers_source_tree_over_page_tree() {
        let dir = tree(&[
            "frontend/src/assets/x.css",
            "frontend/src/pages/assets/x.css",
        ]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/assets/x.css").unwrap();
        assert_eq!(resolved, dir.path().join("frontend/src/assets/x.css"));
    }

    #[test]
    fn test_asset_falls_back_to_page_tree() {
        let dir = tree(&["frontend/src/pages/components/nav.html"]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/components/nav.html").unwrap();
        assert_eq!(
            resolved,
            dir.path().join("frontend/src/pages/components/nav.html")
        );
    }

    #[test]
    fn test_page_without_extension_gets_html_suffix() {
        let dir = tree(&["frontend/src/pages/about.html"]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/about").unwrap();
        assert_eq!(resolved, dir.path().join("frontend/src/pages/about.html"));
    }

    #[test]
    fn test_page_prefers_page_tree_over_source_tree() {
        let dir = tree(&["frontend/src/pages/about.html", "frontend/src/about.html"]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/about.html").unwrap();
        assert_eq!(resolved, dir.path().join("frontend/src/pages/about.html"));
    }

    #[test]
    fn test_pages_prefix_is_stripped() {
        let dir = tree(&["frontend/src/pages/about.html"]);
        let ns = Namespace::new(dir.path());

        assert_eq!(
            resolve_static_file(&ns, "/pages/about.html"),
            resolve_static_file(&ns, "/about.html")
        );
    }

    #[test]
    fn test_root_fallback_for_files_outside_both_trees() {
        let dir = tree(&["manifest.webmanifest"]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/manifest.webmanifest").unwrap();
        assert_eq!(resolved, dir.path().join("manifest.webmanifest"));
    }

    #[test]
    fn test_directory_is_a_miss() {
        let dir = tree(&["frontend/src/assets/css/main.css"]);
        let ns = Namespace::new(dir.path());

        assert_eq!(resolve_static_file(&ns, "/assets/css"), None);
    }

    #[test]
    fn test_root_path_is_rejected() {
        let dir = tree(&[]);
        let ns = Namespace::new(dir.path());

        assert_eq!(resolve_static_file(&ns, "/"), None);
        assert_eq!(resolve_static_file(&ns, ""), None);
    }

    #[test]
    fn test_query_string_is_stripped() {
        let dir = tree(&["frontend/src/assets/x.css"]);
        let ns = Namespace::new(dir.path());

        let resolved = resolve_static_file(&ns, "/assets/x.css?v=3").unwrap();
        assert_eq!(resolved, dir.path().join("frontend/src/assets/x.css"));
    }

    #[test]
    fn test_parent_segments_never_escape_the_root() {
        let dir = tree(&["site/frontend/src/assets/x.css"]);
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, b"secret").unwrap();
        let ns = Namespace::new(dir.path().join("site"));

        // The joined candidates would point at an existing regular file
        // outside the namespace root; resolution must refuse them.
        assert!(secret.is_file());
        assert_eq!(
            resolve_static_file(&ns, "/assets/../../../../secret.txt"),
            None
        );
        assert_eq!(resolve_static_file(&ns, "/../secret.txt"), None);
        assert_eq!(
            resolve_static_file(&ns, "/assets/../../../../../../../../etc/passwd"),
            None
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tree(&[]);
        let ns = Namespace::new(dir.path());

        assert_eq!(resolve_static_file(&ns, "/nope.css"), None);
    }
}
