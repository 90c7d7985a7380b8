//! Reservation and ledger engine for a time-sliced equipment rental marketplace.
//!
//! The [`Engine`] owns the database handle and exposes every operation the
//! presentation layers need: inventory lookups, quoting, atomic reservations,
//! the booking lifecycle, the partner/staff wallet ledger and withdrawals.
//! [`Reconciler`] drives the periodic sweep that completes overdue bookings.

pub use bookings::Booking;
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{
    NewBoardCmd, NewCouponCmd, NewDailyOfferCmd, PaymentResultCmd, QuoteCmd, ReserveCmd,
};
pub use coupons::{Coupon, Discount};
pub use currency::Currency;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Completion, Engine, EngineBuilder, Slot};
pub use partners::Partner;
pub use percent::Percent;
pub use pricing::Quote;
pub use reconciler::{Reconciler, SweepReport};
pub use settings::EngineSettings;
pub use staff::StaffMember;
pub use state::{Actor, BookingAction, BookingStatus, PaymentMethod, PaymentStatus};
pub use units::{Unit, UnitFilter, UnitKind, UnitRef};
pub use wallet_ops::{OpKind, WalletOp, WalletOwner, source};
pub use window::Window;
pub use withdrawals::{WithdrawFilter, WithdrawRequest, WithdrawStatus};

mod boards;
mod bookings;
mod clock;
mod commands;
mod coupons;
mod currency;
mod daily_offers;
mod error;
mod money;
mod ops;
mod partners;
mod payments;
mod percent;
mod platform_settings;
mod pricing;
mod reconciler;
mod settings;
mod staff;
mod state;
mod units;
mod util;
mod wallet_ops;
mod window;
mod withdrawals;

pub type ResultEngine<T> = Result<T, EngineError>;
