use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug-shaped fields
    /// Must be lowercase alphanumeric with single hyphens between runs
    /// - Valid: "general", "test-category", "hr-2024"
    /// - Invalid: "-hr", "hr-", "hr--ops", "HR", "hr_ops"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Runs of characters that are not allowed inside a slug
    static ref NON_SLUG_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a kebab-case slug from a display name.
///
/// Trims, lowercases, collapses every run outside `[a-z0-9]` into one hyphen
/// and strips leading/trailing hyphens. Returns an empty string when nothing
/// slug-worthy is left (e.g. `"!!!"`).
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Basic shape check for a MongoDB connection string
pub fn is_mongo_uri(uri: &str) -> bool {
    uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")
}
