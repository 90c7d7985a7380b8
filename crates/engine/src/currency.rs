use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency of every amount handled by the marketplace.
///
/// The marketplace is mono-currency (`RUB`). Payment notifications still carry a currency code
/// and are checked against it, so the type exists to make that check explicit.
///
/// ## Minor units
///
/// Amounts are stored as an `i64` number of **minor units** (see `MoneyCents`).
/// Example: RUB has 2 minor units, so `900.00 RUB` ⇄ `90000`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Rub,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Rub => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
