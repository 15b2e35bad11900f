//! Slug helpers for city URLs.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Turn a display name into a URL slug.
///
/// Diacritics are stripped (`São João` → `sao-joao`), everything that is
/// not an ASCII letter or digit collapses into a single `-`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Base slug for a city: the slugified name followed by the state abbreviation.
#[must_use]
pub fn city_slug(name: &str, state_abbreviation: &str) -> String {
    let name = slugify(name);
    let state = slugify(state_abbreviation);
    match (name.is_empty(), state.is_empty()) {
        (true, _) => state,
        (false, true) => name,
        (false, false) => format!("{name}-{state}"),
    }
}

/// Pick the first free slug, appending `-2`, `-3`, ... while `is_taken` says so.
pub fn dedupe_slug<F>(base: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }

    let mut counter = 2u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(slugify("São Paulo"), "sao-paulo");
        assert_eq!(slugify("Ribeirão Preto"), "ribeirao-preto");
        assert_eq!(slugify("Itaú de Minas"), "itau-de-minas");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Santa   Bárbara d'Oeste "), "santa-barbara-d-oeste");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_city_slug_appends_state() {
        assert_eq!(city_slug("Belo Horizonte", "MG"), "belo-horizonte-mg");
    }

    #[test]
    fn test_dedupe_slug_counter() {
        let taken: HashSet<&str> = ["bom-jesus-pi", "bom-jesus-pi-2"].into_iter().collect();
        assert_eq!(
            dedupe_slug("bom-jesus-pi", |s| taken.contains(s)),
            "bom-jesus-pi-3"
        );
        assert_eq!(dedupe_slug("bom-jesus-go", |s| taken.contains(s)), "bom-jesus-go");
    }
}
