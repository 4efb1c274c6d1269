//! URL slug derivation.

/// Derives a slug: lowercase, alphanumeric runs kept (any script), every
/// other run collapsed to a single `-`, no leading or trailing `-`.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_joins_with_dashes() {
        assert_eq!(slugify("The Legend of Zelda"), "the-legend-of-zelda");
    }

    #[test]
    fn collapses_punctuation_runs_and_trims() {
        assert_eq!(slugify("  Hollow Knight: Silksong!  "), "hollow-knight-silksong");
        assert_eq!(slugify("a---b"), "a-b");
    }

    #[test]
    fn keeps_non_latin_letters() {
        assert_eq!(slugify("مراجعة لعبة"), "مراجعة-لعبة");
    }

    #[test]
    fn empty_and_symbol_only_inputs_yield_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
