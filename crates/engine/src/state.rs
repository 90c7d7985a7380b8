//! Booking lifecycle.
//!
//! Statuses, payment states and payment methods, plus the pure transition
//! table. Persistence applies a returned transition with a compare-and-set on
//! the previous status, so two racing actors cannot both win.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, UnitKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    WaitingPartner,
    WaitingCard,
    WaitingCash,
    WaitingDaily,
    Active,
    Completed,
    Canceled,
    Failed,
}

impl BookingStatus {
    /// Entry states, chosen at creation time.
    pub const WAITING: [BookingStatus; 4] = [
        Self::WaitingPartner,
        Self::WaitingCard,
        Self::WaitingCash,
        Self::WaitingDaily,
    ];

    /// Statuses whose quantity counts against unit capacity.
    pub const OCCUPYING: [BookingStatus; 5] = [
        Self::WaitingPartner,
        Self::WaitingCard,
        Self::WaitingCash,
        Self::WaitingDaily,
        Self::Active,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingPartner => "waiting_partner",
            Self::WaitingCard => "waiting_card",
            Self::WaitingCash => "waiting_cash",
            Self::WaitingDaily => "waiting_daily",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_waiting(self) -> bool {
        Self::WAITING.contains(&self)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }

    /// `'a','b',...` for embedding a status set in SQL.
    pub(crate) fn sql_list(statuses: &[BookingStatus]) -> String {
        statuses
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "waiting_partner" => Ok(Self::WaitingPartner),
            "waiting_card" => Ok(Self::WaitingCard),
            "waiting_cash" => Ok(Self::WaitingCash),
            "waiting_daily" => Ok(Self::WaitingDaily),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidId(format!(
                "invalid booking status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unpaid" => Ok(Self::Unpaid),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(EngineError::InvalidId(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

/// How the customer pays. Each method decides its own entry state and what
/// confirmation and payment success imply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid through the payment provider; funds are collected instantly.
    Online,
    /// Bank card transfer checked by the partner.
    CardTransfer,
    /// Cash handed over on site.
    Cash,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::CardTransfer => "card_transfer",
            Self::Cash => "cash",
        }
    }

    #[must_use]
    pub fn entry_status(self, unit: UnitKind) -> BookingStatus {
        match (unit, self) {
            (UnitKind::Daily, _) => BookingStatus::WaitingDaily,
            (UnitKind::Board, Self::Online) => BookingStatus::WaitingPartner,
            (UnitKind::Board, Self::CardTransfer) => BookingStatus::WaitingCard,
            (UnitKind::Board, Self::Cash) => BookingStatus::WaitingCash,
        }
    }

    #[must_use]
    pub fn initial_payment_status(self) -> PaymentStatus {
        match self {
            Self::Online => PaymentStatus::Pending,
            Self::CardTransfer | Self::Cash => PaymentStatus::Unpaid,
        }
    }

    /// Partner is credited as soon as the provider reports success.
    #[must_use]
    pub fn credits_on_payment(self) -> bool {
        matches!(self, Self::Online)
    }

    /// Partner confirmation doubles as acknowledgement that money was received.
    #[must_use]
    pub fn confirmation_collects_payment(self) -> bool {
        matches!(self, Self::CardTransfer | Self::Cash)
    }

    /// Unpaid bookings with this method expire after the payment timeout.
    #[must_use]
    pub fn has_payment_deadline(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "online" => Ok(Self::Online),
            "card_transfer" => Ok(Self::CardTransfer),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::InvalidId(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Who performs a booking action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actor", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// The customer, by chat id.
    Owner(i64),
    Partner(Uuid),
    Staff(Uuid),
    Admin,
    /// Background processes (reconciler sweeps).
    System,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
    Complete,
}

impl BookingAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }

    fn allows(self, actor: &Actor) -> bool {
        match self {
            Self::Confirm => matches!(actor, Actor::Partner(_) | Actor::Staff(_) | Actor::Admin),
            Self::Cancel => matches!(
                actor,
                Actor::Owner(_) | Actor::Partner(_) | Actor::Admin | Actor::System
            ),
            Self::Complete => matches!(
                actor,
                Actor::Partner(_) | Actor::Staff(_) | Actor::Admin | Actor::System
            ),
        }
    }
}

/// Computes the status reached by `action`.
///
/// Terminal statuses reject everything with `IllegalTransition`. A role that
/// may never perform the action gets `Forbidden`.
pub fn transition(
    current: BookingStatus,
    payment: PaymentStatus,
    action: BookingAction,
    actor: &Actor,
) -> ResultEngine<BookingStatus> {
    let illegal = || {
        EngineError::IllegalTransition(format!(
            "cannot {} a {} booking",
            action.as_str(),
            current.as_str()
        ))
    };

    if current.is_terminal() {
        return Err(illegal());
    }
    if !action.allows(actor) {
        return Err(EngineError::Forbidden(format!(
            "{actor:?} cannot {} bookings",
            action.as_str()
        )));
    }

    match action {
        BookingAction::Confirm if current.is_waiting() => Ok(BookingStatus::Active),
        BookingAction::Cancel if current.is_waiting() => {
            if payment == PaymentStatus::Paid {
                return Err(EngineError::IllegalTransition(
                    "cannot cancel a paid booking".to_string(),
                ));
            }
            Ok(BookingStatus::Canceled)
        }
        BookingAction::Complete if current == BookingStatus::Active => Ok(BookingStatus::Completed),
        _ => Err(illegal()),
    }
}
