/// Lowercases, trims, and folds Spanish diacritics so "Garrafón" and
/// "garrafon" compare equal. Keyword tables store unaccented forms.
pub(crate) fn sanitize(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.trim().chars() {
        for lowered in character.to_lowercase() {
            sanitized.push(fold_diacritic(lowered));
        }
    }
    sanitized
}

fn fold_diacritic(character: char) -> char {
    match character {
        'á' | 'à' | 'ä' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ö' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

/// Splits on anything that is not alphanumeric, dropping empty tokens.
/// A leading digit run glued to letters ("2garrafones") is split into
/// its own token so quantity scans see the same pair as "2 garrafones".
pub(crate) fn tokenize(sanitized_text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in sanitized_text.split(|character: char| !character.is_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let digit_end =
            raw.find(|character: char| !character.is_ascii_digit()).unwrap_or(raw.len());
        if digit_end > 0 && digit_end < raw.len() {
            tokens.push(raw[..digit_end].to_string());
            tokens.push(raw[digit_end..].to_string());
        } else {
            tokens.push(raw.to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::{sanitize, tokenize};

    #[test]
    fn sanitize_lowercases_trims_and_folds_accents() {
        assert_eq!(sanitize("  Quiero 2 Garrafónes  "), "quiero 2 garrafones");
        assert_eq!(sanitize("SÍ"), "si");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn tokenize_splits_on_punctuation_and_whitespace() {
        assert_eq!(tokenize("2 garrafones, 3 botellas!"), vec!["2", "garrafones", "3", "botellas"]);
    }

    #[test]
    fn tokenize_splits_digit_glued_tokens() {
        assert_eq!(tokenize("2garrafones"), vec!["2", "garrafones"]);
        assert_eq!(tokenize("quiero 2garrafones"), vec!["quiero", "2", "garrafones"]);
        assert_eq!(tokenize("garrafon20"), vec!["garrafon20"]);
    }
}
