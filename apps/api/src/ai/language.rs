//! Script-based language detection for prompt and label selection.
//! Cyrillic-majority input is treated as Russian, everything else as
//! English.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedLanguage {
    Ru,
    En,
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

pub fn detect_language<'a, I>(texts: I) -> SupportedLanguage
where
    I: IntoIterator<Item = &'a str>,
{
    let mut cyrillic = 0usize;
    let mut latin = 0usize;
    for text in texts {
        for c in text.chars() {
            if is_cyrillic(c) {
                cyrillic += 1;
            } else if c.is_ascii_alphabetic() {
                latin += 1;
            }
        }
    }

    if cyrillic > 0 && cyrillic >= latin {
        SupportedLanguage::Ru
    } else {
        SupportedLanguage::En
    }
}

pub fn language_instruction(language: SupportedLanguage) -> &'static str {
    match language {
        SupportedLanguage::Ru => "Весь итоговый текст должен быть написан на русском языке.",
        SupportedLanguage::En => "Write the final response in English.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_russian_majority() {
        assert_eq!(
            detect_language(["Разработчик интерфейсов", "React"]),
            SupportedLanguage::Ru
        );
    }

    #[test]
    fn test_detects_english() {
        assert_eq!(
            detect_language(["Frontend Developer", "builds UIs"]),
            SupportedLanguage::En
        );
    }

    #[test]
    fn test_empty_input_defaults_to_english() {
        assert_eq!(detect_language(["", "  "]), SupportedLanguage::En);
    }

    #[test]
    fn test_latin_majority_wins() {
        assert_eq!(
            detect_language(["ok да", "plenty of latin text here"]),
            SupportedLanguage::En
        );
    }
}
