use axum::{Json, extract::rejection::JsonRejection};

use chirpy_types::api::{ValidateChirpRequest, ValidateChirpResponse};

use crate::error::ApiError;

const PROFANE: &[&str] = &["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Mask the banned words in their lowercase and uppercase spellings.
/// Mixed-case spellings pass through untouched.
pub fn clean_body(body: &str) -> String {
    PROFANE.iter().fold(body.to_string(), |text, word| {
        text.replace(word, MASK).replace(&word.to_uppercase(), MASK)
    })
}

pub async fn validate_chirp(
    payload: Result<Json<ValidateChirpRequest>, JsonRejection>,
) -> Result<Json<ValidateChirpResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(ValidateChirpResponse {
        cleaned_body: clean_body(&req.body),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_lower_and_upper_case() {
        assert_eq!(
            clean_body("what a kerfuffle, SHARBERT and fornax"),
            "what a ****, **** and ****"
        );
    }

    #[test]
    fn leaves_clean_and_mixed_case_text_alone() {
        assert_eq!(clean_body("hello world"), "hello world");
        assert_eq!(clean_body("Kerfuffle"), "Kerfuffle");
    }
}
