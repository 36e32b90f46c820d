//! Slug generation
//!
//! Shared by every entity with a URL slug. `generate_slug` normalizes a
//! title; `unique_slug` appends a numeric suffix (-2, -3, ...) until the
//! caller's existence check passes.

use anyhow::Result;
use std::future::Future;

/// Derive a URL-friendly slug from a title.
///
/// ASCII alphanumerics are kept, separators and other ASCII punctuation
/// collapse to single hyphens, and non-ASCII characters pass through so
/// non-English titles still produce a usable slug.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

/// Find a free slug, starting from `base` and trying `base-2`, `base-3`,
/// and so on. `taken` reports whether a candidate is already in use.
pub async fn unique_slug<F, Fut>(base: &str, taken: F) -> Result<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let base = if base.is_empty() { "untitled" } else { base };

    if !taken(base.to_string()).await? {
        return Ok(base.to_string());
    }

    for n in 2.. {
        let candidate = format!("{}-{}", base, n);
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    unreachable!("suffix loop is unbounded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_basic() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("  Spaces  Everywhere  "), "spaces-everywhere");
        assert_eq!(generate_slug("Already-Hyphenated"), "already-hyphenated");
    }

    #[test]
    fn test_generate_slug_punctuation() {
        assert_eq!(generate_slug("What's New in 2026?"), "what-s-new-in-2026");
        assert_eq!(generate_slug("C++ & Rust!"), "c-rust");
    }

    #[test]
    fn test_generate_slug_empty() {
        assert_eq!(generate_slug(""), "");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[tokio::test]
    async fn test_unique_slug_no_conflict() {
        let slug = unique_slug("hello", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "hello");
    }

    #[tokio::test]
    async fn test_unique_slug_suffixes() {
        let taken: HashSet<&str> = ["hello", "hello-2", "hello-3"].into();
        let slug = unique_slug("hello", |candidate| {
            let hit = taken.contains(candidate.as_str());
            async move { Ok(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "hello-4");
    }

    #[tokio::test]
    async fn test_unique_slug_empty_base() {
        let slug = unique_slug("", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "untitled");
    }
}
