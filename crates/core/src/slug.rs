//! Portfolio slug generation.
//!
//! A slug is built from `"{first_name} {last_name} {title}"`, transliterated
//! to ASCII lowercase by the `slug` crate. Collisions are resolved with `-1`,
//! `-2`, ... suffixes.

/// Maximum slug length (matches the `portfolios.slug` column).
pub const MAX_SLUG_LENGTH: usize = 200;

/// Slug used when nothing sluggable remains.
pub const FALLBACK_SLUG: &str = "portfolio";

/// Turn arbitrary text into a URL slug of at most [`MAX_SLUG_LENGTH`] bytes.
pub fn slugify(text: &str) -> String {
    let mut slug = ::slug::slugify(text);
    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Base slug for a portfolio, before de-duplication.
pub fn portfolio_base_slug(first_name: &str, last_name: &str, title: &str) -> String {
    let slug = slugify(&format!("{first_name} {last_name} {title}"));
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Pick the first of `base`, `base-1`, `base-2`, ... not in `taken`.
///
/// `taken` is the set of existing slugs sharing `base` as a prefix. Suffixed
/// candidates keep within [`MAX_SLUG_LENGTH`] by shortening the base.
pub fn dedupe_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    let mut counter: u32 = 1;
    loop {
        let suffix = format!("-{counter}");
        let keep = MAX_SLUG_LENGTH.saturating_sub(suffix.len()).min(base.len());
        let candidate = format!("{}{suffix}", base[..keep].trim_end_matches('-'));
        if !taken.iter().any(|s| *s == candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Jean Dupont Développeur Web"), "jean-dupont-developpeur-web");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("  Rust -- & Go!! "), "rust-go");
        assert_eq!(slugify("C'est l'été"), "c-est-l-ete");
    }

    #[test]
    fn slugify_transliterates_central_european_names() {
        assert_eq!(slugify("Dvořák Šimon"), "dvorak-simon");
        assert_eq!(slugify("Ștefan Țiriac"), "stefan-tiriac");
        assert_eq!(slugify("Łukasz Wałęsa"), "lukasz-walesa");
        assert_eq!(
            portfolio_base_slug("Zoë", "Kowalczyk", "Inżynier"),
            "zoe-kowalczyk-inzynier"
        );
    }

    #[test]
    fn slugify_of_punctuation_is_empty() {
        assert_eq!(slugify("!!! ---"), "");
    }

    #[test]
    fn base_slug_falls_back() {
        assert_eq!(portfolio_base_slug("", "", "!!!"), FALLBACK_SLUG);
        assert_eq!(portfolio_base_slug("Ana", "Lima", "Data"), "ana-lima-data");
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "a".repeat(500);
        let slug = portfolio_base_slug("x", "y", &title);
        assert_eq!(slug.len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn dedupe_picks_next_free_counter() {
        let taken = vec!["ana-lima".to_string(), "ana-lima-1".to_string()];
        assert_eq!(dedupe_slug("ana-lima", &taken), "ana-lima-2");
        assert_eq!(dedupe_slug("bob", &taken), "bob");
    }

    #[test]
    fn dedupe_respects_max_length() {
        let base = "b".repeat(MAX_SLUG_LENGTH);
        let slug = dedupe_slug(&base, &[base.clone()]);
        assert_eq!(slug.len(), MAX_SLUG_LENGTH);
        assert!(slug.ends_with("-1"));
    }
}
