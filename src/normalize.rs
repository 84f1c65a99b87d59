/// Lowercases `raw` and strips the 32 ASCII punctuation characters.
///
/// Whitespace, digits and non-ASCII letters are kept as they are. Typographic
/// quotes and other non-ASCII symbols are not part of the stripped set.
///
/// # Example
/// ```
/// use corpus_stats::normalize;
/// assert_eq!(normalize("Le Chat, mange!"), "le chat mange");
/// assert_eq!(normalize("C'était l'été."), "cétait lété");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_ascii_punctuation_char() {
        let punct = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
        assert_eq!(normalize(punct), "");
        assert_eq!(normalize(&format!("a{punct}b")), "ab");
    }

    #[test]
    fn keeps_whitespace_digits_and_unicode_letters() {
        assert_eq!(normalize("Ça  VA\n2024\tÉTÉ"), "ça  va\n2024\tété");
    }

    #[test]
    fn keeps_typographic_punctuation() {
        assert_eq!(normalize("«Oui»… l’homme"), "«oui»… l’homme");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
    }
}
