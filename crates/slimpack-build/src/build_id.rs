use std::fmt;

/// Slug used when a function name has no alphanumeric characters.
const FALLBACK_SLUG: &str = "function";

/// Unique identifier of one build: `<unix timestamp>_<slug>_<random hex>`.
///
/// Names both the workspace directory and the output archive, so two builds
/// never share either, even for the same function within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId {
    pub fn generate(function_name: &str) -> Self {
        let timestamp = chrono::Utc::now().timestamp();
        let token = uuid::Uuid::new_v4().simple();
        Self(format!("{timestamp}_{}_{token}", slugify(function_name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archive produced by this build.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.0)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase ASCII alphanumerics, other runs collapsed to a single `-`.
///
/// ```
/// use slimpack_build::build_id::slugify;
///
/// assert_eq!(slugify("Image Resizer (v2)"), "image-resizer-v2");
/// assert_eq!(slugify("***"), "function");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generate_has_three_parts() {
        let id = BuildId::generate("My Function");
        let parts: Vec<&str> = id.as_str().splitn(2, '_').collect();
        assert!(parts[0].parse::<i64>().is_ok());

        let rest = parts[1];
        let (slug, token) = rest.rsplit_once('_').unwrap();
        assert_eq!(slug, "my-function");
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_name_same_second_differs() {
        let a = BuildId::generate("resize");
        let b = BuildId::generate("resize");
        assert_ne!(a, b);
        assert_ne!(a.archive_name(), b.archive_name());
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  hello__world  "), "hello-world");
        assert_eq!(slugify("ABC"), "abc");
        assert_eq!(slugify("a.b/c"), "a-b-c");
    }

    proptest! {
        #[test]
        fn slug_is_always_url_safe(name in ".*") {
            let slug = slugify(&name);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
