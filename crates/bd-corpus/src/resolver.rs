//! Link resolution.
//!
//! Maps outbound link targets, as authored, to canonical slugs so that plain
//! string equality decides whether a link points at an existing document.
//!
//! | Source slug    | Target             | Resolved         |
//! |----------------|--------------------|------------------|
//! | `/notes/rust`  | `/notes/go`        | `/notes/go`      |
//! | `/notes/rust`  | `/c#`              | `/c#`            |
//! | `/notes/rust`  | `go.md`            | `/notes/go`      |
//! | `/notes/rust`  | `../index.md#top`  | `/index`         |
//! | `/notes/rust`  | `lang/c%20sharp`   | `/notes/lang/c sharp` |
//! | `/notes/rust`  | `https://x.org`    | unresolvable     |
//! | `/notes/rust`  | `#section`         | unresolvable     |
//! | `/rust`        | `../../escape`     | unresolvable     |
//!
//! A target is canonical when it is already a slug: a leading `/` and no
//! empty, `.` or `..` segments. Canonical targets are kept verbatim, so slugs
//! such as `/c#` or `/notes.md` (from `c#.md` and `notes.md.md`) still match.
//! Fragment, query and suffix stripping only apply to other targets, and
//! their result is always canonical.
//!
//! Unresolvable targets are dropped. They never fail the pipeline.

use percent_encoding::percent_decode_str;

use crate::document::{ConvertedDocument, ResolvedDocument};

/// Resolves link targets against the slug namespace.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// Source file suffix stripped from targets (e.g., ".md").
    suffix: String,
}

impl Resolver {
    /// Create a resolver for documents with the given source suffix.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Resolve one link target found in the document `source_slug`.
    ///
    /// Canonical slugs are returned unchanged and every result is canonical,
    /// so resolving twice yields the same result as resolving once.
    #[must_use]
    pub fn resolve(&self, source_slug: &str, target: &str) -> Option<String> {
        if is_canonical(target) {
            return Some(target.to_owned());
        }
        let target = target.trim();
        if target.is_empty() || target.starts_with("//") || has_scheme(target) {
            return None;
        }

        let path = target.split(['#', '?']).next().unwrap_or_default();
        if path.is_empty() {
            return None;
        }
        let path = percent_decode_str(path).decode_utf8().ok()?;
        let path = path.strip_suffix(self.suffix.as_str()).unwrap_or(&path);

        let mut segments: Vec<&str> = Vec::new();
        if !path.starts_with('/') {
            segments.extend(parent_segments(source_slug));
        }
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                name => segments.push(name),
            }
        }

        if segments.is_empty() {
            return None;
        }
        Some(format!("/{}", segments.join("/")))
    }

    /// Produce the resolved form of a converted document.
    ///
    /// Duplicate targets collapse; unresolvable targets are dropped.
    #[must_use]
    pub fn resolve_document(&self, document: ConvertedDocument) -> ResolvedDocument {
        let ConvertedDocument {
            slug,
            content,
            links,
            tags,
        } = document;

        let outbound_links = links
            .iter()
            .filter_map(|target| {
                let resolved = self.resolve(&slug, target);
                if resolved.is_none() {
                    tracing::debug!(slug = %slug, target = %target, "Dropping unresolvable link");
                }
                resolved
            })
            .collect();

        ResolvedDocument {
            slug,
            content,
            outbound_links,
            tags,
        }
    }
}

/// True if `target` is already a slug: `/` followed by one or more segments,
/// none of them empty, `.` or `..`.
fn is_canonical(target: &str) -> bool {
    target.strip_prefix('/').is_some_and(|rest| {
        rest.split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
    })
}

/// Directory segments of a slug (`/notes/lang/rust` -> `["notes", "lang"]`).
fn parent_segments(slug: &str) -> impl Iterator<Item = &str> {
    let dir = slug.rsplit_once('/').map_or("", |(dir, _)| dir);
    dir.split('/').filter(|s| !s.is_empty())
}

/// True if `target` starts with a URL scheme (`https:`, `mailto:`, ...).
fn has_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use bd_convert::{Content, Tags};
    use bd_storage::slug_for;
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolve(source: &str, target: &str) -> Option<String> {
        Resolver::new(".md").resolve(source, target)
    }

    #[test]
    fn test_canonical_passes_through() {
        assert_eq!(resolve("/a", "/b"), Some("/b".to_owned()));
        assert_eq!(
            resolve("/x/y", "/notes/rust"),
            Some("/notes/rust".to_owned())
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = Resolver::new(".md");
        for target in [
            "/b",
            "c.md",
            "../d/e.md#x",
            "lang/c%20sharp",
            "./f/",
            "c%23x",
            "c%3Fy",
            "100%25",
            "a/%20",
            "/c#",
            "/notes.md",
        ] {
            let once = resolver.resolve("/notes/rust", target).unwrap();
            let twice = resolver.resolve("/notes/rust", &once).unwrap();
            assert_eq!(once, twice, "target {target}");
        }
    }

    #[test]
    fn test_scanned_slugs_pass_through() {
        let resolver = Resolver::new(".md");
        for file in ["c#.md", "notes.md.md", "100%.md", "q?.md", "dir/a b.md"] {
            let slug = slug_for(Path::new(file), ".md").unwrap();

            assert_eq!(
                resolver.resolve("/x/y", &slug),
                Some(slug.clone()),
                "file {file}"
            );
        }
    }

    #[test]
    fn test_decoded_reserved_characters_are_kept() {
        assert_eq!(resolve("/notes/rust", "c%23x"), Some("/notes/c#x".to_owned()));
        assert_eq!(resolve("/a", "100%25.md"), Some("/100%".to_owned()));
    }

    #[test]
    fn test_relative_to_source_directory() {
        assert_eq!(
            resolve("/notes/rust", "go.md"),
            Some("/notes/go".to_owned())
        );
        assert_eq!(resolve("/rust", "go"), Some("/go".to_owned()));
        assert_eq!(
            resolve("/notes/rust", "./lang/c.md"),
            Some("/notes/lang/c".to_owned())
        );
    }

    #[test]
    fn test_parent_segments() {
        assert_eq!(
            resolve("/notes/rust", "../index.md"),
            Some("/index".to_owned())
        );
        assert_eq!(
            resolve("/a/b/c", "../../d.md"),
            Some("/d".to_owned())
        );
    }

    #[test]
    fn test_escaping_root_is_unresolvable() {
        assert_eq!(resolve("/rust", "../../escape"), None);
    }

    #[test]
    fn test_absolute_slug_kept_verbatim() {
        assert_eq!(resolve("/x", "/notes/go.md"), Some("/notes/go.md".to_owned()));
        assert_eq!(resolve("/x", "/c#"), Some("/c#".to_owned()));
    }

    #[test]
    fn test_absolute_non_canonical_is_normalized() {
        assert_eq!(resolve("/x", "/notes/./go.md"), Some("/notes/go".to_owned()));
        assert_eq!(resolve("/x", "/notes/../go"), Some("/go".to_owned()));
        assert_eq!(resolve("/x", "/notes//go/"), Some("/notes/go".to_owned()));
    }

    #[test]
    fn test_strips_fragment_and_query() {
        assert_eq!(resolve("/a", "b.md#intro"), Some("/b".to_owned()));
        assert_eq!(resolve("/a", "b?view=raw"), Some("/b".to_owned()));
    }

    #[test]
    fn test_trailing_slash() {
        assert_eq!(resolve("/a", "notes/"), Some("/notes".to_owned()));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            resolve("/notes/rust", "lang/c%20sharp"),
            Some("/notes/lang/c sharp".to_owned())
        );
    }

    #[test]
    fn test_external_targets_unresolvable() {
        assert_eq!(resolve("/a", "https://example.com/b"), None);
        assert_eq!(resolve("/a", "mailto:me@example.com"), None);
        assert_eq!(resolve("/a", "//cdn.example.com/x"), None);
    }

    #[test]
    fn test_fragment_only_and_empty_unresolvable() {
        assert_eq!(resolve("/a", "#section"), None);
        assert_eq!(resolve("/a", ""), None);
        assert_eq!(resolve("/a", "   "), None);
        assert_eq!(resolve("/a", "/"), None);
    }

    #[test]
    fn test_custom_suffix() {
        let resolver = Resolver::new(".org");

        assert_eq!(resolver.resolve("/a", "b.org"), Some("/b".to_owned()));
        assert_eq!(resolver.resolve("/a", "b.md"), Some("/b.md".to_owned()));
    }

    #[test]
    fn test_resolve_document_collapses_duplicates() {
        let document = ConvertedDocument {
            slug: "/notes/rust".to_owned(),
            content: Content::default(),
            links: vec![
                "go.md".to_owned(),
                "/notes/go".to_owned(),
                "go.md#syntax".to_owned(),
                "https://rust-lang.org".to_owned(),
                "/missing".to_owned(),
            ],
            tags: Tags::new(),
        };

        let resolved = Resolver::new(".md").resolve_document(document);

        assert_eq!(
            resolved.outbound_links.into_iter().collect::<Vec<_>>(),
            vec!["/missing".to_owned(), "/notes/go".to_owned()]
        );
        assert_eq!(resolved.slug, "/notes/rust");
    }
}
