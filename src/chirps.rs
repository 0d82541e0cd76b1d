/// Chirp body rules: length limit and profanity masking

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::error::ValidationError;

pub const MAX_CHIRP_LENGTH: usize = 140;

const CENSORED: &str = "****";

lazy_static! {
    static ref PROFANE_WORDS: HashSet<&'static str> =
        ["kerfuffle", "sharbert", "fornax"].into_iter().collect();
}

/// Check a chirp body and return it with profanity masked
pub fn clean_chirp(body: &str) -> Result<String, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("chirp".to_string()));
    }

    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH));
    }

    Ok(censor_profanity(body))
}

/// Replace whole profane words with `****`.
///
/// Words are split on single spaces, so `Sharbert!` survives.
pub fn censor_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_body_is_untouched() {
        let body = "I had something interesting for breakfast";
        assert_eq!(clean_chirp(body).unwrap(), body);
    }

    #[test]
    fn test_profanity_is_masked_case_insensitively() {
        assert_eq!(
            censor_profanity("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(censor_profanity("What a Kerfuffle FORNAX"), "What a **** ****");
    }

    #[test]
    fn test_punctuation_protects_word() {
        assert_eq!(censor_profanity("Sharbert!"), "Sharbert!");
    }

    #[test]
    fn test_spacing_is_preserved() {
        assert_eq!(censor_profanity("a  fornax  b"), "a  ****  b");
    }

    #[test]
    fn test_length_limit() {
        let at_limit = "a".repeat(MAX_CHIRP_LENGTH);
        assert!(clean_chirp(&at_limit).is_ok());

        let too_long = "a".repeat(MAX_CHIRP_LENGTH + 1);
        assert_eq!(
            clean_chirp(&too_long),
            Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH))
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let accented = "é".repeat(MAX_CHIRP_LENGTH);
        assert!(clean_chirp(&accented).is_ok());
    }

    #[test]
    fn test_empty_chirp() {
        assert!(clean_chirp("   ").is_err());
    }
}
