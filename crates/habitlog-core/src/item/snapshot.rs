//! Presentation snapshot of an item.
//!
//! This is the only external representation of an item. Field names and
//! rounding (2 decimals for `current_value`, 4 for `progress`) are what
//! front ends read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub frequency: f64,
    pub alpha: f64,
    pub decay_rate: f64,
    pub target: f64,
    pub current_value: f64,
    pub progress: f64,
    pub streak: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

impl Item {
    /// Apply decay at `now`, then describe the item.
    ///
    /// The decay is kept on `self`; the caller is expected to persist it.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> ItemSnapshot {
        self.apply_decay(now);
        self.describe()
    }

    /// Describe the item as it would look at `now` without changing it.
    pub fn peek(&self, now: DateTime<Utc>) -> ItemSnapshot {
        let mut copy = self.clone();
        copy.snapshot(now)
    }

    fn describe(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            frequency: self.frequency,
            alpha: self.alpha,
            decay_rate: self.decay_rate,
            target: self.target,
            current_value: round_to(self.current_value, 2),
            progress: round_to(self.progress(), 4),
            streak: self.streak,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemParams;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn snapshot_rounds_for_display() {
        let mut item = Item::new(3, "Piano", "scales", ItemParams::default(), t0());
        item.current_value = 33.33333;
        let snap = item.snapshot(t0());
        assert_eq!(snap.current_value, 33.33);
        assert_eq!(snap.progress, 0.3333);
    }

    #[test]
    fn snapshot_persists_decay_on_item() {
        let mut item = Item::new(3, "Piano", "", ItemParams::default(), t0());
        item.current_value = 50.0;
        let now = t0() + Duration::days(2);
        let snap = item.snapshot(now);
        assert_eq!(item.updated_at, now);
        assert_eq!(snap.updated_at, now);
        assert!(item.current_value < 50.0);
    }

    #[test]
    fn peek_leaves_item_unchanged() {
        let mut item = Item::new(3, "Piano", "", ItemParams::default(), t0());
        item.current_value = 50.0;
        item.streak = 4;
        let before = item.clone();

        let snap = item.peek(t0() + Duration::days(3));

        assert_eq!(item, before);
        assert_eq!(snap.streak, 0);
        assert!(snap.current_value < 50.0);
    }

    #[test]
    fn serialized_field_names_match_presentation_contract() {
        let mut item = Item::new(3, "Piano", "", ItemParams::default(), t0());
        let json = serde_json::to_value(item.snapshot(t0())).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "id",
            "name",
            "description",
            "frequency",
            "alpha",
            "decay_rate",
            "target",
            "current_value",
            "progress",
            "streak",
            "created_at",
            "updated_at",
        ] {
            assert!(obj.contains_key(key), "missing field {key}");
        }
        assert_eq!(obj.len(), 12);
        assert_eq!(json["created_at"], "2024-03-01T08:00:00Z");
    }
}
