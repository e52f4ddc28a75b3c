//! Tracked items: a user's goal or habit with a decaying progress value.
//!
//! An item accumulates `current_value` through explicit logs and loses a
//! fraction of it for every `frequency`-day period that passes without one.
//! Decay is lazy: nothing runs in the background, it is applied whenever the
//! item is read or written (see [`Item::apply_decay`]).

mod decay;
mod snapshot;

pub use snapshot::ItemSnapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ledger::NewLogEntry;

/// Default cadence between actions, in days.
pub const DEFAULT_FREQUENCY: f64 = 1.0;
/// Default increment per log.
pub const DEFAULT_ALPHA: f64 = 1.0;
/// Default fraction lost per missed period.
pub const DEFAULT_DECAY_RATE: f64 = 0.05;
/// Default value representing 100% completion.
pub const DEFAULT_TARGET: f64 = 100.0;

/// Numeric parameters that drive an item's decay and accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemParams {
    /// Expected cadence between actions, in days.
    pub frequency: f64,
    /// Increment applied per log when no amount is given.
    pub alpha: f64,
    /// Fraction of `current_value` lost per missed period.
    pub decay_rate: f64,
    /// Value representing 100% completion.
    pub target: f64,
}

impl Default for ItemParams {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            alpha: DEFAULT_ALPHA,
            decay_rate: DEFAULT_DECAY_RATE,
            target: DEFAULT_TARGET,
        }
    }
}

impl ItemParams {
    /// Check every parameter is usable by the decay math.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("frequency", self.frequency),
            ("alpha", self.alpha),
            ("decay_rate", self.decay_rate),
            ("target", self.target),
        ] {
            ensure_finite(field, value)?;
        }
        if self.frequency <= 0.0 {
            return Err(ValidationError::out_of_range(
                "frequency",
                "must be greater than 0",
            ));
        }
        if !(0.0..1.0).contains(&self.decay_rate) {
            return Err(ValidationError::out_of_range(
                "decay_rate",
                "must be at least 0 and below 1",
            ));
        }
        if self.alpha < 0.0 {
            return Err(ValidationError::out_of_range("alpha", "must not be negative"));
        }
        if self.target < 0.0 {
            return Err(ValidationError::out_of_range("target", "must not be negative"));
        }
        Ok(())
    }
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            field: field.to_string(),
        })
    }
}

/// Input for creating an item. Unset parameters fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub decay_rate: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve unset parameters against `defaults` and validate the result.
    ///
    /// # Errors
    /// Returns a validation error for an empty name or bad parameters.
    pub fn resolve(&self, defaults: &ItemParams) -> Result<ItemParams, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("name".into()));
        }
        let params = ItemParams {
            frequency: self.frequency.unwrap_or(defaults.frequency),
            alpha: self.alpha.unwrap_or(defaults.alpha),
            decay_rate: self.decay_rate.unwrap_or(defaults.decay_rate),
            target: self.target.unwrap_or(defaults.target),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Partial edit of an item's descriptive fields and parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub decay_rate: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.frequency.is_none()
            && self.alpha.is_none()
            && self.decay_rate.is_none()
            && self.target.is_none()
    }
}

/// A tracked goal/habit owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub frequency: f64,
    pub alpha: f64,
    pub decay_rate: f64,
    pub target: f64,
    /// Live accumulated progress, kept within `[0, target]`.
    pub current_value: f64,
    pub streak: u32,
    pub created_at: DateTime<Utc>,
    /// Last time decay or a log was applied.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a fresh, not yet persisted item (`id` is 0 until stored).
    pub fn new(
        user_id: i64,
        name: impl Into<String>,
        description: impl Into<String>,
        params: ItemParams,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            name: name.into(),
            description: description.into(),
            frequency: params.frequency,
            alpha: params.alpha,
            decay_rate: params.decay_rate,
            target: params.target,
            current_value: 0.0,
            streak: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn params(&self) -> ItemParams {
        ItemParams {
            frequency: self.frequency,
            alpha: self.alpha,
            decay_rate: self.decay_rate,
            target: self.target,
        }
    }

    /// Normalized progress toward the target, in `[0, 1]`.
    ///
    /// A non-positive target counts as already complete.
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.current_value / self.target).clamp(0.0, 1.0)
    }

    /// Record one log: decay first, then add `amount` (or `alpha`).
    ///
    /// The returned entry carries the requested increment, not the clamped
    /// delta actually applied to `current_value`.
    ///
    /// # Errors
    /// A non-finite `amount` is rejected and the item is left untouched.
    pub fn log(
        &mut self,
        amount: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<NewLogEntry, ValidationError> {
        if let Some(amount) = amount {
            ensure_finite("amount", amount)?;
        }

        self.apply_decay(now);
        let increment = amount.unwrap_or(self.alpha);
        self.current_value = clamp_value(self.current_value + increment, self.target);
        self.streak = self.streak.saturating_add(1);
        self.updated_at = now;

        Ok(NewLogEntry {
            item_id: self.id,
            amount: increment,
            logged_at: now,
        })
    }

    /// Apply an edit. The whole patch is validated before anything changes.
    ///
    /// # Errors
    /// Returns a validation error for an empty name or bad parameters.
    pub fn apply_update(&mut self, update: &ItemUpdate) -> Result<(), ValidationError> {
        let name = match &update.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ValidationError::Empty("name".into()))
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let current = self.params();
        let params = ItemParams {
            frequency: update.frequency.unwrap_or(current.frequency),
            alpha: update.alpha.unwrap_or(current.alpha),
            decay_rate: update.decay_rate.unwrap_or(current.decay_rate),
            target: update.target.unwrap_or(current.target),
        };
        params.validate()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        self.frequency = params.frequency;
        self.alpha = params.alpha;
        self.decay_rate = params.decay_rate;
        self.target = params.target;
        self.current_value = clamp_value(self.current_value, self.target);
        Ok(())
    }
}

/// Keep a value within `[0, target]`.
fn clamp_value(value: f64, target: f64) -> f64 {
    value.min(target).max(0.0)
}
