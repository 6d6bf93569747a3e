//! URL slugs for categories and products.
//!
//! ```text
//! "Men's T-Shirts & Tops"  ──►  "men-s-t-shirts-tops"
//! ```
//! Lowercase ASCII letters and digits are kept. Every other run of
//! characters collapses into a single hyphen, and hyphens at either end are
//! dropped.

/// Builds a slug from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Uses the caller's slug when one was given, otherwise derives it.
///
/// A supplied slug is normalized too, so `"Red Hats"` and `"red-hats"`
/// collide as they should.
pub fn resolve_slug(provided: Option<&str>, name: &str) -> String {
    match provided.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    }
}
