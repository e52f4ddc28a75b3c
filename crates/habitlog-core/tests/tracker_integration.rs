//! Integration tests for the access layer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use habitlog_core::{
    Accounts, Config, CoreError, Database, ItemUpdate, NewItem, Tracker, ValidationError,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

fn setup() -> (Database, i64, i64) {
    let db = Database::open_memory().unwrap();
    // Hashing is covered by the accounts tests; a placeholder hash keeps these fast.
    let ada = db.insert_user("ada", "$argon2id$placeholder", t0()).unwrap();
    let bob = db.insert_user("bob", "$argon2id$placeholder", t0()).unwrap();
    (db, ada.id, bob.id)
}

fn daily(name: &str, decay_rate: f64) -> NewItem {
    NewItem {
        name: name.into(),
        frequency: Some(1.0),
        decay_rate: Some(decay_rate),
        ..NewItem::default()
    }
}

#[test]
fn create_uses_defaults() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);

    let item = tracker.create_item(ada, &NewItem::named("Meditate"), t0()).unwrap();

    assert_eq!(item.frequency, 1.0);
    assert_eq!(item.alpha, 1.0);
    assert_eq!(item.decay_rate, 0.05);
    assert_eq!(item.target, 100.0);
    assert_eq!(item.current_value, 0.0);
    assert_eq!(item.progress, 0.0);
    assert_eq!(item.streak, 0);
    assert_eq!(item.created_at, t0());
}

#[test]
fn create_uses_configured_defaults() {
    let (db, ada, _) = setup();
    let mut config = Config::default();
    config.set("defaults.target", "10").unwrap();
    let tracker = Tracker::with_config(&db, &config);

    let item = tracker.create_item(ada, &NewItem::named("Pages"), t0()).unwrap();
    assert_eq!(item.target, 10.0);
}

#[test]
fn create_rejects_zero_frequency() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let bad = NewItem {
        frequency: Some(0.0),
        ..NewItem::named("Broken")
    };

    let err = tracker.create_item(ada, &bad, t0()).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "frequency"
    ));
    assert!(tracker.list_items(ada, t0()).unwrap().is_empty());
}

#[test]
fn decay_is_persisted_on_read() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("Run", 0.1), t0()).unwrap();
    tracker.log(ada, created.id, Some(100.0), t0()).unwrap();

    let later = t0() + Duration::hours(50);
    let item = tracker.get_item(ada, created.id, later).unwrap();
    assert_eq!(item.current_value, 81.0);
    assert_eq!(item.streak, 0);
    assert_eq!(item.updated_at, later);

    // Same instant again: already settled.
    let again = tracker.get_item(ada, created.id, later).unwrap();
    assert_eq!(again, item);
}

#[test]
fn log_after_long_gap_restarts_streak() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("Run", 0.1), t0()).unwrap();
    tracker.log(ada, created.id, Some(100.0), t0()).unwrap();
    tracker
        .log(ada, created.id, Some(0.0), t0() + Duration::hours(1))
        .unwrap();

    let outcome = tracker
        .log(ada, created.id, None, t0() + Duration::hours(51))
        .unwrap();

    assert_eq!(outcome.item.streak, 1);
    assert_eq!(outcome.item.current_value, 82.0);
    assert_eq!(outcome.entry.amount, 1.0);
}

#[test]
fn no_decay_under_one_period() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let weekly = NewItem {
        frequency: Some(7.0),
        ..NewItem::named("Call home")
    };
    let created = tracker.create_item(ada, &weekly, t0()).unwrap();
    tracker.log(ada, created.id, Some(40.0), t0()).unwrap();

    let item = tracker
        .get_item(ada, created.id, t0() + Duration::hours(1))
        .unwrap();

    assert_eq!(item.current_value, 40.0);
    assert_eq!(item.updated_at, t0());
}

#[test]
fn clamped_log_records_requested_amount() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Water"), t0()).unwrap();
    tracker.log(ada, created.id, Some(95.0), t0()).unwrap();

    let outcome = tracker.log(ada, created.id, Some(10.0), t0()).unwrap();

    assert_eq!(outcome.item.current_value, 100.0);
    assert_eq!(outcome.item.progress, 1.0);
    assert_eq!(outcome.entry.amount, 10.0);
    let logs = tracker.recent_logs(ada, created.id, 10).unwrap();
    assert_eq!(logs[0].amount, 10.0);
    assert_eq!(logs[1].amount, 95.0);
}

#[test]
fn invalid_amount_changes_nothing() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("Run", 0.1), t0()).unwrap();
    tracker.log(ada, created.id, Some(50.0), t0()).unwrap();

    let later = t0() + Duration::days(3);
    let err = tracker.log(ada, created.id, Some(f64::NAN), later).unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    let peeked = tracker.peek_item(ada, created.id, t0()).unwrap();
    assert_eq!(peeked.current_value, 50.0);
    assert_eq!(peeked.streak, 1);
    assert_eq!(tracker.recent_logs(ada, created.id, 10).unwrap().len(), 1);
}

#[test]
fn zero_target_reports_full_progress() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let item = NewItem {
        target: Some(0.0),
        ..NewItem::named("Done already")
    };
    let created = tracker.create_item(ada, &item, t0()).unwrap();
    assert_eq!(created.progress, 1.0);

    let outcome = tracker.log(ada, created.id, Some(5.0), t0()).unwrap();
    assert_eq!(outcome.item.current_value, 0.0);
    assert_eq!(outcome.item.progress, 1.0);
}

#[test]
fn other_users_items_are_not_found() {
    let (db, ada, bob) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Secret"), t0()).unwrap();

    let missing_id = created.id + 1000;
    let foreign = tracker.get_item(bob, created.id, t0()).unwrap_err();
    let missing = tracker.get_item(bob, missing_id, t0()).unwrap_err();
    assert!(matches!(foreign, CoreError::NotFound { entity: "item", .. }));
    assert!(matches!(missing, CoreError::NotFound { entity: "item", .. }));

    assert!(matches!(
        tracker.log(bob, created.id, None, t0()),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        tracker.update_item(bob, created.id, &ItemUpdate::default(), t0()),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        tracker.delete_item(bob, created.id),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        tracker.recent_logs(bob, created.id, 5),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        tracker.peek_item(bob, created.id, t0()),
        Err(CoreError::NotFound { .. })
    ));
    assert!(tracker.list_items(bob, t0()).unwrap().is_empty());

    // Ada's item is untouched.
    assert_eq!(tracker.get_item(ada, created.id, t0()).unwrap().name, "Secret");
}

#[test]
fn list_items_newest_first_and_decayed() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let first = tracker.create_item(ada, &daily("first", 0.5), t0()).unwrap();
    let second = tracker
        .create_item(ada, &daily("second", 0.5), t0() + Duration::minutes(5))
        .unwrap();
    tracker.log(ada, first.id, Some(80.0), t0() + Duration::minutes(5)).unwrap();

    let later = t0() + Duration::hours(30);
    let items = tracker.list_items(ada, later).unwrap();

    assert_eq!(
        items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert_eq!(items[1].current_value, 40.0);
    assert_eq!(items[1].updated_at, later);
}

#[test]
fn peek_never_writes() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("Run", 0.5), t0()).unwrap();
    tracker.log(ada, created.id, Some(80.0), t0()).unwrap();

    let later = t0() + Duration::hours(30);
    let peeked = tracker.peek_items(ada, later).unwrap();
    assert_eq!(peeked[0].current_value, 40.0);

    // The stored state still has the pre-decay timestamp.
    let stored = tracker.peek_item(ada, created.id, t0()).unwrap();
    assert_eq!(stored.current_value, 80.0);
    assert_eq!(stored.updated_at, t0());
}

#[test]
fn item_detail_lists_recent_logs_newest_first() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Pushups"), t0()).unwrap();
    for i in 1..=5 {
        tracker
            .log(ada, created.id, Some(i as f64), t0() + Duration::minutes(i))
            .unwrap();
    }

    let detail = tracker
        .item_detail(ada, created.id, 3, t0() + Duration::minutes(10))
        .unwrap();

    assert_eq!(detail.item.current_value, 15.0);
    assert_eq!(detail.item.streak, 5);
    let amounts: Vec<f64> = detail.logs.iter().map(|l| l.amount).collect();
    assert_eq!(amounts, vec![5.0, 4.0, 3.0]);
}

#[test]
fn update_settles_decay_then_applies_changes() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("Run", 0.5), t0()).unwrap();
    tracker.log(ada, created.id, Some(80.0), t0()).unwrap();

    let later = t0() + Duration::hours(30);
    let update = ItemUpdate {
        name: Some("Jog".into()),
        target: Some(30.0),
        ..ItemUpdate::default()
    };
    let item = tracker.update_item(ada, created.id, &update, later).unwrap();

    assert_eq!(item.name, "Jog");
    assert_eq!(item.target, 30.0);
    assert_eq!(item.current_value, 30.0);
    assert_eq!(item.updated_at, later);
    assert_eq!(item.created_at, t0());
}

#[test]
fn update_stores_trimmed_name_like_create() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &daily("  Run  ", 0.05), t0()).unwrap();
    assert_eq!(created.name, "Run");

    let update = ItemUpdate {
        name: Some("  Jog  ".into()),
        ..ItemUpdate::default()
    };
    tracker.update_item(ada, created.id, &update, t0()).unwrap();
    let stored = tracker.get_item(ada, created.id, t0()).unwrap();
    assert_eq!(stored.name, "Jog");
}

#[test]
fn invalid_update_is_rejected_without_changes() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Run"), t0()).unwrap();

    let update = ItemUpdate {
        name: Some("Jog".into()),
        decay_rate: Some(2.0),
        ..ItemUpdate::default()
    };
    assert!(matches!(
        tracker.update_item(ada, created.id, &update, t0()),
        Err(CoreError::Validation(_))
    ));
    assert_eq!(tracker.get_item(ada, created.id, t0()).unwrap().name, "Run");
}

#[test]
fn deleting_item_removes_its_logs() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Run"), t0()).unwrap();
    tracker.log(ada, created.id, None, t0()).unwrap();

    tracker.delete_item(ada, created.id).unwrap();

    assert!(matches!(
        tracker.get_item(ada, created.id, t0()),
        Err(CoreError::NotFound { .. })
    ));
    assert_eq!(db.count_logs(created.id).unwrap(), 0);
}

#[test]
fn deleting_user_removes_everything() {
    let (db, ada, _) = setup();
    let tracker = Tracker::new(&db);
    let created = tracker.create_item(ada, &NewItem::named("Run"), t0()).unwrap();
    tracker.log(ada, created.id, None, t0()).unwrap();

    Accounts::new(&db).delete_user(ada).unwrap();

    assert!(tracker.list_items(ada, t0()).unwrap().is_empty());
    assert_eq!(db.count_logs(created.id).unwrap(), 0);
    assert!(matches!(
        tracker.create_item(ada, &NewItem::named("Ghost"), t0()),
        Err(CoreError::NotFound { entity: "user", .. })
    ));
}
