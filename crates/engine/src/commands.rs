//! Command structs for engine operations.
//!
//! These types group parameters for write operations (inventory setup,
//! quoting, reservations, payment callbacks), keeping call sites readable and
//! avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Currency, Discount, MoneyCents, PaymentMethod, UnitRef, Window};

/// Price a window on a unit.
#[derive(Clone, Debug)]
pub struct QuoteCmd {
    pub unit: UnitRef,
    pub window: Window,
    pub quantity: i64,
    pub coupon: Option<String>,
}

impl QuoteCmd {
    #[must_use]
    pub fn new(unit: UnitRef, window: Window, quantity: i64) -> Self {
        Self {
            unit,
            window,
            quantity,
            coupon: None,
        }
    }

    #[must_use]
    pub fn coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon = Some(code.into());
        self
    }
}

/// Reserve a window on a unit for a customer.
#[derive(Clone, Debug)]
pub struct ReserveCmd {
    pub user_id: i64,
    pub payment_method: PaymentMethod,
    pub quote: QuoteCmd,
}

impl ReserveCmd {
    #[must_use]
    pub fn new(
        user_id: i64,
        unit: UnitRef,
        window: Window,
        quantity: i64,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            user_id,
            payment_method,
            quote: QuoteCmd::new(unit, window, quantity),
        }
    }

    #[must_use]
    pub fn coupon(mut self, code: impl Into<String>) -> Self {
        self.quote.coupon = Some(code.into());
        self
    }
}

/// Provider notification about a booking payment.
#[derive(Clone, Debug)]
pub struct PaymentResultCmd {
    pub booking_id: Uuid,
    pub provider_ref: String,
    pub succeeded: bool,
    pub amount: MoneyCents,
    pub currency: Currency,
}

impl PaymentResultCmd {
    #[must_use]
    pub fn succeeded(
        booking_id: Uuid,
        provider_ref: impl Into<String>,
        amount: MoneyCents,
        currency: Currency,
    ) -> Self {
        Self {
            booking_id,
            provider_ref: provider_ref.into(),
            succeeded: true,
            amount,
            currency,
        }
    }

    #[must_use]
    pub fn failed(
        booking_id: Uuid,
        provider_ref: impl Into<String>,
        amount: MoneyCents,
        currency: Currency,
    ) -> Self {
        Self {
            succeeded: false,
            ..Self::succeeded(booking_id, provider_ref, amount, currency)
        }
    }
}

/// Create an hourly board.
#[derive(Clone, Debug)]
pub struct NewBoardCmd {
    pub partner_id: Uuid,
    pub name: String,
    pub capacity: i64,
    pub hourly_price: MoneyCents,
    pub location_id: Option<String>,
}

impl NewBoardCmd {
    #[must_use]
    pub fn new(
        partner_id: Uuid,
        name: impl Into<String>,
        capacity: i64,
        hourly_price: MoneyCents,
    ) -> Self {
        Self {
            partner_id,
            name: name.into(),
            capacity,
            hourly_price,
            location_id: None,
        }
    }

    #[must_use]
    pub fn location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }
}

/// Create a daily offer.
#[derive(Clone, Debug)]
pub struct NewDailyOfferCmd {
    pub partner_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub daily_price: MoneyCents,
    pub address: Option<String>,
}

impl NewDailyOfferCmd {
    #[must_use]
    pub fn new(
        partner_id: Uuid,
        name: impl Into<String>,
        quantity: i64,
        daily_price: MoneyCents,
    ) -> Self {
        Self {
            partner_id,
            name: name.into(),
            quantity,
            daily_price,
            address: None,
        }
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Create a coupon.
#[derive(Clone, Debug)]
pub struct NewCouponCmd {
    pub code: String,
    pub discount: Discount,
    pub max_uses: Option<i64>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl NewCouponCmd {
    #[must_use]
    pub fn new(code: impl Into<String>, discount: Discount) -> Self {
        Self {
            code: code.into(),
            discount,
            max_uses: None,
            valid_from: None,
            valid_to: None,
        }
    }

    #[must_use]
    pub fn max_uses(mut self, max_uses: i64) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    #[must_use]
    pub fn valid_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }
}
