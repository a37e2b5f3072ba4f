//! Field validators
//!
//! Pure functions, no side effects. The transition function calls these
//! synchronously and turns failures into a re-prompt of the same stage.

use bigdecimal::BigDecimal;
use std::str::FromStr;
use thiserror::Error;

/// A user input that does not fit the field being collected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("not a number: {input:?}")]
    MalformedAmount { input: String },
    #[error("description is empty")]
    EmptyDescription,
    #[error("{input:?} is not one of the allowed choices")]
    InvalidChoice { input: String },
}

/// Parse a finite decimal amount. Sign, magnitude and precision are not
/// restricted; plain and scientific notation are both accepted. Surrounding
/// whitespace is ignored.
pub fn validate_amount(text: &str) -> Result<BigDecimal, ValidationError> {
    let malformed = || ValidationError::MalformedAmount {
        input: text.to_string(),
    };
    let trimmed = text.trim();

    // Exponent must fit i32 or the scale computation can overflow
    if let Some((_, exponent)) = trimmed.split_once(|c: char| c == 'e' || c == 'E') {
        exponent.parse::<i32>().map_err(|_| malformed())?;
    }
    BigDecimal::from_str(trimmed).map_err(|_| malformed())
}

/// Any non-empty text is a valid description, kept verbatim
pub fn validate_description(text: &str) -> Result<&str, ValidationError> {
    if text.is_empty() {
        Err(ValidationError::EmptyDescription)
    } else {
        Ok(text)
    }
}

/// Exact, case-sensitive, whole-string membership in `allowed`
pub fn validate_choice<'a>(text: &str, allowed: &'a [String]) -> Result<&'a str, ValidationError> {
    allowed
        .iter()
        .find(|label| label.as_str() == text)
        .map(String::as_str)
        .ok_or_else(|| ValidationError::InvalidChoice {
            input: text.to_string(),
        })
}
