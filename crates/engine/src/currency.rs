use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like three-letter currency code attached to an account (`USD`, `EUR`,
/// ...).
///
/// The engine does not convert between currencies; the code is metadata
/// validated once at the boundary and carried verbatim. Amounts are stored as
/// an `i64` number of **minor units** regardless of the code (see
/// [`MoneyCents`]).
///
/// [`MoneyCents`]: crate::MoneyCents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub const USD: CurrencyCode = CurrencyCode(*b"USD");

    /// Canonical uppercase code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Always valid: the constructor only accepts ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(EngineError::InvalidCurrency(format!(
                "expected a three-letter code, got \"{trimmed}\""
            )));
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(CurrencyCode(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::try_from(value.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_uppercases_three_letter_codes() {
        assert_eq!(
            CurrencyCode::try_from("usd").map(|c| c.to_string()).ok(),
            Some("USD".to_string())
        );
        assert_eq!(
            CurrencyCode::try_from(" EUR ").map(|c| c.to_string()).ok(),
            Some("EUR".to_string())
        );
    }

    #[test]
    fn rejects_wrong_length_or_non_letters() {
        assert!(CurrencyCode::try_from("US").is_err());
        assert!(CurrencyCode::try_from("DOLLAR").is_err());
        assert!(CurrencyCode::try_from("U5D").is_err());
        assert!(CurrencyCode::try_from("").is_err());
    }

    #[test]
    fn default_is_usd() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::USD);
    }
}
