//! Static endpoint table.
//!
//! Mirrors the server's route families: entries are either literal paths or
//! single-argument functions producing a path from an identifier, matching
//! the dispatcher's "family handler takes an identifier" pattern.

/// One endpoint entry.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    /// Fixed path.
    Path(&'static str),
    /// Path built from an identifier.
    WithId(fn(&str) -> String),
}

impl Endpoint {
    /// Render the endpoint to a concrete path.
    ///
    /// Returns `None` when an identifier-taking entry is rendered without
    /// an identifier — a caller bug that must not silently produce a
    /// malformed path.
    #[must_use]
    pub fn render(&self, id: Option<&str>) -> Option<String> {
        match self {
            Self::Path(path) => Some((*path).to_owned()),
            Self::WithId(build) => id.map(|id| build(id)),
        }
    }
}

fn user(id: &str) -> String {
    format!("/api/users/{id}")
}

fn project(id: &str) -> String {
    format!("/api/projects/{id}")
}

fn service(id: &str) -> String {
    format!("/api/services/{id}")
}

fn file(id: &str) -> String {
    format!("/api/files/{id}")
}

/// category -> endpoint name -> entry. Read-only after construction.
const TABLE: &[(&str, &[(&str, Endpoint)])] = &[
    (
        "auth",
        &[
            ("login", Endpoint::Path("/api/auth/login")),
            ("logout", Endpoint::Path("/api/auth/logout")),
            ("register", Endpoint::Path("/api/auth/register")),
            ("refresh", Endpoint::Path("/api/auth/refresh")),
            ("verify", Endpoint::Path("/api/auth/verify")),
        ],
    ),
    (
        "users",
        &[
            ("list", Endpoint::Path("/api/users")),
            ("get", Endpoint::WithId(user)),
            ("create", Endpoint::Path("/api/users")),
            ("update", Endpoint::WithId(user)),
            ("delete", Endpoint::WithId(user)),
            ("profile", Endpoint::Path("/api/users/profile")),
        ],
    ),
    (
        "projects",
        &[
            ("list", Endpoint::Path("/api/projects")),
            ("get", Endpoint::WithId(project)),
            ("create", Endpoint::Path("/api/projects")),
            ("update", Endpoint::WithId(project)),
            ("delete", Endpoint::WithId(project)),
            ("search", Endpoint::Path("/api/projects/search")),
        ],
    ),
    (
        "services",
        &[
            ("list", Endpoint::Path("/api/services")),
            ("get", Endpoint::WithId(service)),
            ("categories", Endpoint::Path("/api/services/categories")),
        ],
    ),
    (
        "contact",
        &[
            ("send", Endpoint::Path("/api/contact")),
            ("inquiry", Endpoint::Path("/api/contact/inquiry")),
        ],
    ),
    (
        "analytics",
        &[
            ("stats", Endpoint::Path("/api/analytics/stats")),
            ("reports", Endpoint::Path("/api/analytics/reports")),
        ],
    ),
    (
        "files",
        &[
            ("list", Endpoint::Path("/api/files")),
            ("upload", Endpoint::Path("/api/files/upload")),
            ("download", Endpoint::WithId(file)),
            ("delete", Endpoint::WithId(file)),
        ],
    ),
];

/// Look up an endpoint entry.
#[must_use]
pub fn lookup(category: &str, endpoint: &str) -> Option<&'static Endpoint> {
    let (_, entries) = TABLE.iter().find(|(name, _)| *name == category)?;
    entries
        .iter()
        .find(|(name, _)| *name == endpoint)
        .map(|(_, entry)| entry)
}

/// All known category names.
#[must_use]
pub fn categories() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_literal_endpoint_renders_without_id() {
        let entry = lookup("auth", "login").unwrap();
        assert_eq!(entry.render(None).unwrap(), "/api/auth/login");
    }

    #[test]
    fn test_id_endpoint_renders_with_id() {
        let entry = lookup("users", "get").unwrap();
        assert_eq!(entry.render(Some("42")).unwrap(), "/api/users/42");
    }

    #[test]
    fn test_id_endpoint_without_id_is_none() {
        let entry = lookup("files", "download").unwrap();
        assert_eq!(entry.render(None), None);
    }

    #[test]
    fn test_unknown_category_or_endpoint_is_none() {
        assert!(lookup("payments", "send").is_none());
        assert!(lookup("auth", "impersonate").is_none());
    }

    #[test]
    fn test_every_category_has_entries() {
        for category in categories() {
            let (_, entries) = TABLE
                .iter()
                .find(|(name, _)| *name == category)
                .unwrap();
            assert!(!entries.is_empty(), "category {category}");
        }
    }
}
