use vcard_core::{Element, SqliteStore, StoreError, VCardStore, VCARD_NAMESPACE};

fn sample_vcard(nickname: &str) -> Element {
    let mut vcard = Element::with_namespace("vCard", VCARD_NAMESPACE)
        .with_child(Element::new("FN").with_text("Miguel Ángel"))
        .with_child(Element::new("NICKNAME").with_text(nickname));
    vcard.set_attribute("prodid", "-//HandGen//NONSGML vGen v1.0//EN");
    vcard
}

#[test]
fn fetch_never_written_vcard_is_absent_every_time() {
    let store = SqliteStore::open_in_memory().unwrap();
    for _ in 0..3 {
        assert_eq!(store.fetch_vcard("ortuman").unwrap(), None);
    }
}

#[test]
fn upsert_then_fetch_returns_exact_record() {
    let store = SqliteStore::open_in_memory().unwrap();
    let vcard = sample_vcard("ortuman");

    store.upsert_vcard(&vcard, "ortuman").unwrap();

    assert_eq!(store.fetch_vcard("ortuman").unwrap(), Some(vcard));
    assert_eq!(store.fetch_vcard("romeo").unwrap(), None);
}

#[test]
fn upsert_fully_replaces_previous_record() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.upsert_vcard(&sample_vcard("first"), "ortuman").unwrap();

    let replacement = Element::with_namespace("vCard", VCARD_NAMESPACE)
        .with_child(Element::new("EMAIL").with_text("ortuman@jackal.im"));
    store.upsert_vcard(&replacement, "ortuman").unwrap();

    let loaded = store.fetch_vcard("ortuman").unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert!(loaded.child_named("NICKNAME").is_none());
}

#[test]
fn server_vcard_uses_empty_node_key() {
    let store = SqliteStore::open_in_memory().unwrap();
    let vcard = sample_vcard("jackal");
    store.upsert_vcard(&vcard, "").unwrap();

    assert_eq!(store.fetch_vcard("").unwrap(), Some(vcard));
}

#[test]
fn corrupted_payload_is_reported_as_serialization_error() {
    let conn = vcard_core::db::open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO vcards (username, vcard) VALUES ('ortuman', 'not json');",
        [],
    )
    .unwrap();
    let store = SqliteStore::new(conn);

    let err = store.fetch_vcard("ortuman").unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

#[test]
fn payload_with_empty_name_is_invalid_data() {
    let conn = vcard_core::db::open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO vcards (username, vcard) VALUES ('ortuman', '{\"name\":\"\"}');",
        [],
    )
    .unwrap();
    let store = SqliteStore::new(conn);

    let err = store.fetch_vcard("ortuman").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
