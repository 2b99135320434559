//! Card details and masking.

use serde::Deserialize;

/// Card input supplied with a payment request.
///
/// Never persisted as-is. The full number exists only for the duration of
/// the charge; only the masked form leaves this struct. `Debug` redacts
/// the number and CVV so the PAN cannot leak through logs.
#[derive(Clone, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: Option<String>,
    pub expiry: Option<String>,
    pub cvv: String,
}

impl CardDetails {
    /// Returns the masked form of the card number, or `None` when the
    /// input is too short to mask meaningfully.
    pub fn masked_number(&self) -> Option<String> {
        mask_card_number(&self.number)
    }

    /// Minimal sanity gate applied before calling the gateway: a card
    /// number of at least 13 characters and a 3-character CVV.
    pub fn passes_basic_checks(&self) -> bool {
        self.number.len() >= 13 && self.cvv.len() == 3
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.masked_number().unwrap_or_default())
            .field("holder_name", &self.holder_name)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Masks a card number down to its last four characters.
///
/// Returns `None` for inputs shorter than four characters.
pub fn mask_card_number(number: &str) -> Option<String> {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() < 4 {
        return None;
    }
    let last4: String = chars[chars.len() - 4..].iter().collect();
    Some(format!("**** **** **** {last4}"))
}
