//! State store and value-formatting tests

use mixlink_core::{parse_bool_loose, OscArg, SavedGains, StateStore, StoreUpdate};

#[test]
fn test_display_formatting_matches_device_parity() {
    assert_eq!(OscArg::Bool(true).format(), "1");
    assert_eq!(OscArg::Float(0.0).format(), "0");
    assert_eq!(OscArg::Float(1.0).format(), "1");
    assert_eq!(OscArg::Float(-3.456).format(), "-3.5");
    assert_eq!(OscArg::Float(-120.0).format(), "-120.0");
    assert_eq!(OscArg::Str("Stage left".to_string()).format(), "Stage left");
}

#[test]
fn test_store_first_seen_registration() {
    let mut store = StateStore::new();
    assert_eq!(
        store.insert("gain_input_1_1", "-2.0".into()),
        StoreUpdate::Registered
    );
    assert_eq!(
        store.insert("mute_input_1", "0".into()),
        StoreUpdate::Registered
    );
    assert_eq!(
        store.insert("gain_input_1_1", "-5.0".into()),
        StoreUpdate::Changed
    );

    let snapshot = store.snapshot();
    assert_eq!(snapshot[0].0, "gain_input_1_1");
    assert_eq!(snapshot[0].1, "-5.0");
    assert_eq!(snapshot[1].0, "mute_input_1");
}

#[test]
fn test_clear_resets_everything() {
    let mut store = StateStore::new();
    store.insert("a", "1".into());
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.get("a"), None);
    // re-registration starts a fresh order
    assert_eq!(store.insert("a", "2".into()), StoreUpdate::Registered);
}

#[test]
fn test_truthiness_variants() {
    // the shapes different write paths historically produced
    for muted in ["1", "1.0", "true", "TRUE"] {
        assert!(parse_bool_loose(muted), "{muted:?}");
    }
    for unmuted in ["0", "0.0", "false", "no", ""] {
        assert!(!parse_bool_loose(unmuted), "{unmuted:?}");
    }
}

#[test]
fn test_saved_gain_lifecycle() {
    let mut saved = SavedGains::new();
    assert_eq!(saved.take(1, 1), None);
    saved.save(1, 1, -2.0);
    saved.save(2, 5, -40.0);
    assert_eq!(saved.take(1, 1), Some(-2.0));
    assert!(!saved.contains(1, 1));
    assert!(saved.contains(2, 5));
    saved.clear();
    assert!(!saved.contains(2, 5));
}
