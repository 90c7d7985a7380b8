use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{Clock, EngineError, EngineSettings, ResultEngine, SystemClock};

mod access;
mod bookings;
mod inventory;
mod ledger;
mod pricing;
mod reservation;
mod withdrawals;

pub use bookings::Completion;
pub use inventory::Slot;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The block must only touch the database through `$tx`: SQLite pools hold a
/// single connection, so reaching for `self.database` inside would wait forever.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current wall time in the marketplace zone, comparable with booking windows.
    pub(crate) fn local_now(&self) -> NaiveDateTime {
        self.clock
            .now()
            .with_timezone(&self.settings.timezone)
            .naive_local()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Option<Arc<dyn Clock>>,
    settings: EngineSettings,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the wall clock (tests pin time with `FixedClock`).
    pub fn clock(mut self, clock: impl Clock + 'static) -> EngineBuilder {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> EngineBuilder {
        self.settings = settings;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        self.settings.validate()?;
        Ok(Engine {
            database: self.database,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            settings: self.settings,
        })
    }
}
