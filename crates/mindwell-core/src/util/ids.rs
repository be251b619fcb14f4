//! Slug utilities.
//!
//! Provides functions for turning titles into stable, URL-safe identifiers
//! in lowercase kebab-case. Used for blog post slugs.

/// Turn a title into a lowercase kebab-case slug.
///
/// Performs the following transformations:
/// 1. Lowercases ASCII letters
/// 2. Keeps ASCII letters and digits
/// 3. Treats every other character as a separator
/// 4. Collapses runs of separators into single hyphens, trimming both ends
///
/// # Examples
///
/// ```
/// use mindwell_core::util::ids::slugify;
///
/// assert_eq!(slugify("Sleep & Mood"), "sleep-mood");
/// assert_eq!(slugify("panic_attack_basics"), "panic-attack-basics");
/// assert_eq!(slugify("  Mixed   Case  "), "mixed-case");
/// assert_eq!(slugify("5 Tips: Anxiety!"), "5-tips-anxiety");
/// ```
pub fn slugify(title: &str) -> String {
    title
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// Slug for `title` that `taken` reports as free.
///
/// Tries the plain slug first, then appends `-2`, `-3`, ... Titles without
/// any ASCII alphanumerics fall back to `"post"`.
///
/// # Examples
///
/// ```
/// use mindwell_core::util::ids::unique_slug;
///
/// let existing = ["sleep", "sleep-2"];
/// assert_eq!(unique_slug("Sleep", |s| existing.contains(&s)), "sleep-3");
/// assert_eq!(unique_slug("Mood", |s| existing.contains(&s)), "mood");
/// ```
pub fn unique_slug<F>(title: &str, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut base = slugify(title);
    if base.is_empty() {
        base = "post".to_string();
    }
    if !taken(&base) {
        return base;
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}
