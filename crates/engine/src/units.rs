//! Unified view over the two kinds of rentable inventory.
//!
//! Boards are booked by the hour, daily offers by the day. Both have a fixed
//! capacity and a base price; availability is always derived from bookings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, boards, daily_offers, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Board,
    Daily,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Daily => "daily",
        }
    }
}

impl TryFrom<&str> for UnitKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "board" => Ok(Self::Board),
            "daily" => Ok(Self::Daily),
            other => Err(EngineError::InvalidId(format!("invalid unit kind: {other}"))),
        }
    }
}

/// Reference to a single rentable unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum UnitRef {
    Board { board_id: Uuid },
    Daily { offer_id: Uuid },
}

impl UnitRef {
    #[must_use]
    pub fn kind(self) -> UnitKind {
        match self {
            Self::Board { .. } => UnitKind::Board,
            Self::Daily { .. } => UnitKind::Daily,
        }
    }

    #[must_use]
    pub fn id(self) -> Uuid {
        match self {
            Self::Board { board_id } => board_id,
            Self::Daily { offer_id } => offer_id,
        }
    }

    /// Column of `bookings` that points at this kind of unit.
    pub(crate) fn booking_column(self) -> &'static str {
        match self {
            Self::Board { .. } => "board_id",
            Self::Daily { .. } => "daily_offer_id",
        }
    }

    /// Scalar subquery yielding the capacity of an active unit (bound by id).
    pub(crate) fn capacity_subquery(self) -> &'static str {
        match self {
            Self::Board { .. } => "SELECT capacity FROM boards WHERE id = ? AND active = 1",
            Self::Daily { .. } => "SELECT quantity FROM daily_offers WHERE id = ? AND active = 1",
        }
    }
}

impl std::fmt::Display for UnitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub unit: UnitRef,
    pub partner_id: Uuid,
    pub name: String,
    /// Number of physical items. Fixed at creation.
    pub capacity: i64,
    /// Per hour for boards, per day for daily offers.
    pub price: MoneyCents,
    pub location_id: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl TryFrom<boards::Model> for Unit {
    type Error = EngineError;

    fn try_from(model: boards::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            unit: UnitRef::Board {
                board_id: parse_uuid(&model.id, "board")?,
            },
            partner_id: parse_uuid(&model.partner_id, "partner")?,
            name: model.name,
            capacity: i64::from(model.capacity),
            price: MoneyCents::new(model.price_minor),
            location_id: model.location_id,
            address: None,
            active: model.active,
        })
    }
}

impl TryFrom<daily_offers::Model> for Unit {
    type Error = EngineError;

    fn try_from(model: daily_offers::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            unit: UnitRef::Daily {
                offer_id: parse_uuid(&model.id, "daily offer")?,
            },
            partner_id: parse_uuid(&model.partner_id, "partner")?,
            name: model.name,
            capacity: i64::from(model.quantity),
            price: MoneyCents::new(model.price_minor),
            location_id: None,
            address: model.address,
            active: model.active,
        })
    }
}

/// Narrows [`Engine::list_active_units`](crate::Engine::list_active_units).
#[derive(Clone, Debug, Default)]
pub struct UnitFilter {
    pub partner_id: Option<Uuid>,
    pub location_id: Option<String>,
    pub kind: Option<UnitKind>,
}

impl UnitFilter {
    #[must_use]
    pub fn partner(mut self, partner_id: Uuid) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    #[must_use]
    pub fn location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: UnitKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub(crate) fn includes(&self, kind: UnitKind) -> bool {
        self.kind.is_none_or(|k| k == kind)
    }
}
