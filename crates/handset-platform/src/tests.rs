//! Tests for platform services and the in-memory collaborators.

use std::collections::BTreeMap;

use handset_types::error::HandsetError;
use serde_json::json;

use super::*;
use crate::services::{days_in_month, days_to_ymd, is_leap, weekday};

// ---- Device services ----

#[test]
fn desktop_without_battery() {
    let platform = DesktopPlatform::new();
    let info = platform.power_info().unwrap();
    assert_eq!(info.state, BatteryState::NoBattery);
    assert!(info.battery_percent.is_none());
}

#[test]
fn desktop_simulated_battery() {
    let platform = DesktopPlatform::new().with_battery(85);
    let info = platform.power_info().unwrap();
    assert_eq!(info.battery_percent, Some(85));
    assert_eq!(info.state, BatteryState::Discharging);
}

#[test]
fn desktop_full_battery() {
    let info = DesktopPlatform::new().with_battery(150).power_info().unwrap();
    assert_eq!(info.battery_percent, Some(100));
    assert_eq!(info.state, BatteryState::Full);
}

#[test]
fn desktop_time_now() {
    let t = DesktopPlatform::new().now().unwrap();
    assert!(t.year >= 2024);
    assert!((1..=12).contains(&t.month));
    assert!((1..=31).contains(&t.day));
    assert!(t.weekday < 7);
}

#[test]
fn from_unix_epoch() {
    let t = SystemTime::from_unix(0);
    assert_eq!((t.year, t.month, t.day), (1970, 1, 1));
    assert_eq!(t.weekday, 4); // Thursday
}

#[test]
fn from_unix_known_date() {
    // 2026-10-18 13:45:10 UTC, a Sunday.
    let t = SystemTime::from_unix(1_792_331_110);
    assert_eq!(t.to_string(), "2026-10-18T13:45:10Z");
    assert_eq!(t.weekday, 0);
}

#[test]
fn leap_years() {
    assert!(is_leap(2024));
    assert!(is_leap(2000));
    assert!(!is_leap(1900));
    assert!(!is_leap(2026));
}

#[test]
fn month_lengths() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2026, 2), 28);
    assert_eq!(days_in_month(2026, 4), 30);
    assert_eq!(days_in_month(2026, 12), 31);
    assert_eq!(days_in_month(2026, 13), 0);
}

#[test]
fn weekday_matches_from_unix() {
    for days in [0u64, 59, 365, 10_000, 20_744] {
        let t = SystemTime::from_unix(days * 86400);
        assert_eq!(weekday(t.year, t.month, t.day), t.weekday, "day {days}");
    }
}

#[test]
fn days_to_ymd_year_end() {
    assert_eq!(days_to_ymd(364), (1970, 12, 31));
    assert_eq!(days_to_ymd(365), (1971, 1, 1));
}

#[test]
fn camera_denied() {
    let mut platform = DesktopPlatform::new().with_media_permission(false);
    assert!(matches!(
        platform.request_camera(),
        Err(HandsetError::PermissionDenied(_))
    ));
    assert!(matches!(
        platform.request_microphone(),
        Err(HandsetError::PermissionDenied(_))
    ));
    assert!(platform.capture_frame().is_err());
}

#[test]
fn camera_capture_after_grant() {
    let mut platform = DesktopPlatform::new();
    assert!(platform.capture_frame().is_err());
    platform.request_camera().unwrap();
    let frame = platform.capture_frame().unwrap();
    assert_eq!(&frame[..2], &[0xFF, 0xD8]);
}

// ---- Local storage ----

#[test]
fn memory_storage_round_trip() {
    let mut storage = MemoryStorage::new();
    assert_eq!(storage.read("k").unwrap(), None);
    storage.write("k", "v").unwrap();
    assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn read_only_storage_rejects_writes() {
    let mut storage = MemoryStorage::read_only();
    assert!(matches!(
        storage.write("k", "v"),
        Err(HandsetError::Storage(_))
    ));
    assert_eq!(storage.read("k").unwrap(), None);
}

// ---- Key-value store ----

#[test]
fn kv_set_get_delete() {
    let mut kv = MemoryKvStore::new();
    kv.set("contacts", "Ada", "555-0100").unwrap();
    kv.set("contacts", "Bob", "555-0101").unwrap();
    kv.delete("contacts", "Ada").unwrap();
    let all = kv.get_all("contacts").unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.get("Bob").map(String::as_str), Some("555-0101"));
}

#[test]
fn kv_unknown_collection_is_empty() {
    let kv = MemoryKvStore::new();
    assert!(kv.get_all("nothing").unwrap().is_empty());
}

#[test]
fn kv_offline_fails() {
    let mut kv = MemoryKvStore::new();
    kv.set_offline(true);
    assert!(matches!(kv.get_all("c"), Err(HandsetError::Service(_))));
    assert!(kv.set("c", "k", "v").is_err());
    assert!(kv.delete("c", "k").is_err());
}

// ---- Object storage ----

#[test]
fn object_upload_and_list() {
    let mut objects = MemoryObjectStorage::new("mem://store/");
    let url = objects.upload("photos", "a.jpg", &[1, 2, 3]).unwrap();
    assert_eq!(url, "mem://store/photos/a.jpg");
    objects.upload("photos", "b.jpg", &[4]).unwrap();
    let listed = objects.list("photos").unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[1].updated_at > listed[0].updated_at);
    assert_eq!(objects.bytes("photos", "a.jpg"), Some(&[1u8, 2, 3][..]));
}

#[test]
fn object_empty_name_rejected() {
    let mut objects = MemoryObjectStorage::new("mem://");
    assert!(objects.upload("photos", "", &[]).is_err());
}

// ---- Realtime channel ----

#[test]
fn channel_insert_assigns_id_and_fans_out() {
    let mut channel = MemoryChannel::new();
    let sub = channel.subscribe("messages").unwrap();
    let other = channel.subscribe("other").unwrap();
    channel
        .publish("messages", json!({"content": "hi", "likes": 0}))
        .unwrap();
    let events = channel.poll(sub).unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ChannelEvent::Insert(record) => assert_eq!(record["id"], 1),
        e => panic!("expected insert, got {e:?}"),
    }
    assert!(channel.poll(other).unwrap().is_empty());
    assert!(channel.poll(sub).unwrap().is_empty());
}

#[test]
fn channel_publish_existing_id_updates() {
    let mut channel = MemoryChannel::new();
    channel.publish("messages", json!({"content": "hi", "likes": 0})).unwrap();
    let sub = channel.subscribe("messages").unwrap();
    channel
        .publish("messages", json!({"id": 1, "content": "hi", "likes": 1}))
        .unwrap();
    assert_eq!(
        channel.poll(sub).unwrap(),
        vec![ChannelEvent::Update(json!({"id": 1, "content": "hi", "likes": 1}))]
    );
    let history = channel.history("messages").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["likes"], 1);
}

#[test]
fn channel_rejects_non_objects() {
    let mut channel = MemoryChannel::new();
    assert!(channel.publish("messages", json!("text")).is_err());
}

#[test]
fn channel_unsubscribe_stops_delivery() {
    let mut channel = MemoryChannel::new();
    let sub = channel.subscribe("messages").unwrap();
    assert_eq!(channel.subscriber_count(), 1);
    channel.unsubscribe(sub);
    assert_eq!(channel.subscriber_count(), 0);
    assert!(channel.poll(sub).is_err());
}

// ---- Identity / drive / forms ----

#[test]
fn identity_sign_in_out() {
    let mut identity = MemoryIdentity::new();
    assert!(identity.current_session().is_none());
    let session = identity.sign_in("google").unwrap();
    assert_eq!(identity.current_session(), Some(session));
    identity.sign_out();
    assert!(identity.current_session().is_none());
}

#[test]
fn drive_requires_token() {
    let mut drive = MemoryDrive::new();
    let request = UploadRequest {
        access_token: String::new(),
        file_name: "a.txt".into(),
        mime_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    assert!(drive.upload(request).is_err());
    assert!(drive.list("").is_err());
}

#[test]
fn drive_upload_then_list() {
    let mut drive = MemoryDrive::new();
    let id = drive
        .upload(UploadRequest {
            access_token: "t".into(),
            file_name: "a.txt".into(),
            mime_type: "text/plain".into(),
            bytes: b"hello".to_vec(),
        })
        .unwrap();
    let files = drive.list("t").unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, id);
    assert_eq!(files[0].name, "a.txt");
}

#[test]
fn form_relay_records_submissions() {
    let mut forms = MemoryFormRelay::new();
    let mut fields = BTreeMap::new();
    fields.insert("email".to_string(), "a@b.co".to_string());
    forms.submit(&fields).unwrap();
    assert_eq!(forms.submissions().len(), 1);
    forms.set_offline(true);
    assert!(forms.submit(&fields).is_err());
    assert_eq!(forms.submissions().len(), 1);
}

mod prop {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn from_unix_fields_in_range(secs in 0u64..4_102_444_800) {
            let t = SystemTime::from_unix(secs);
            prop_assert!((1..=12).contains(&t.month));
            prop_assert!(t.day >= 1 && t.day <= days_in_month(t.year, t.month));
            prop_assert!(t.hour < 24 && t.minute < 60 && t.second < 60);
            prop_assert_eq!(weekday(t.year, t.month, t.day), t.weekday);
        }

        #[test]
        fn kv_last_write_wins(values in proptest::collection::vec("[a-z0-9]{0,8}", 1..10)) {
            let mut kv = MemoryKvStore::new();
            for v in &values {
                kv.set("c", "key", v).unwrap();
            }
            let all = kv.get_all("c").unwrap();
            prop_assert_eq!(all.get("key"), values.last());
        }
    }
}
