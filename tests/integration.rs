//! End-to-end tests against a live Oracle instance.
//!
//! These are ignored by default; run them with `cargo test -- --ignored` once a test database
//! is reachable (see `common.rs` for the connection settings).

mod common;

use std::mem;

use test_case::test_case;

use common::{connect, env, profile, setup_empty_table};
use oci_api::{
    BindDirection, Date, Error, ExecMode, LobKind, LobSeekMode, Number, SeekOrigin, StatementType,
};

#[test]
#[ignore = "requires a reachable Oracle database"]
fn scalar_select() {
    let conn = connect();
    let mut statement = conn.prepare("SELECT 1 FROM DUAL").unwrap();
    assert_eq!(StatementType::Select, statement.statement_type());
    statement.execute(1).unwrap();

    let mut rows = statement.result_set().unwrap().unwrap();
    assert!(rows.fetch_next().unwrap());
    assert_eq!(Some(1), rows.get_i32(1).unwrap());
    assert!(!rows.fetch_next().unwrap());
    assert!(rows.is_eof());
    drop(rows);

    statement.close().unwrap();
    conn.close().unwrap();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn array_insert_with_partial_failure() {
    let conn = connect();
    setup_empty_table(
        &conn,
        "oci_api_batch",
        &["id NUMBER(10)", "name VARCHAR2(50) NOT NULL"],
    )
    .unwrap();

    let mut statement = conn
        .prepare("INSERT INTO oci_api_batch (id, name) VALUES (:1, :2)")
        .unwrap();
    statement.set_batch_errors(true);
    statement
        .bind_array(1u32, &[Some(1i32), Some(2), Some(3), Some(4)])
        .unwrap();
    statement
        .bind_text_array(2u32, &[Some("a"), Some("b"), None, Some("d")], 50)
        .unwrap();
    statement.execute(4).unwrap();

    let errors = statement.batch_errors();
    assert_eq!(1, errors.len());
    assert_eq!(2, errors[0].row_offset);
    // ORA-01400: cannot insert NULL
    assert_eq!(1400, errors[0].code);
    assert_eq!(3, statement.row_count().unwrap());

    conn.commit().unwrap();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn clob_round_trip() {
    let conn = connect();
    let mut lob = oci_api::Lob::create_temporary(&conn, LobKind::Clob).unwrap();

    // Five characters, six bytes in UTF-8.
    let written = lob.write_text("héllo").unwrap();
    assert_eq!(5, written);
    assert_eq!(5, lob.length().unwrap());

    lob.seek(0, LobSeekMode::Set).unwrap();
    assert_eq!(0, lob.offset());
    assert_eq!("héllo", lob.read_text(5).unwrap());

    lob.truncate(3).unwrap();
    assert_eq!(3, lob.length().unwrap());

    lob.free().unwrap();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn lob_seek_clamps() {
    let conn = connect();
    let mut lob = oci_api::Lob::create_temporary(&conn, LobKind::Clob).unwrap();
    lob.write_text("0123456789").unwrap();
    let len = lob.length().unwrap();

    lob.seek(0, LobSeekMode::Set).unwrap();
    assert_eq!(0, lob.offset());

    // Seeking exactly to the end parks the position one past the last character.
    lob.seek(len, LobSeekMode::Set).unwrap();
    assert_eq!(len, lob.offset());
    assert!(lob.read_text(1).unwrap().is_empty());

    assert!(matches!(
        lob.seek(len + 1, LobSeekMode::Set),
        Err(Error::OutOfRange { .. })
    ));

    // Reading more than remains yields exactly the remainder.
    lob.seek(7, LobSeekMode::Set).unwrap();
    assert_eq!("789", lob.read_text(100).unwrap());
    assert_eq!(len, lob.offset());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn scrollable_fetch() {
    let conn = connect();
    let mut statement = conn
        .prepare("SELECT level FROM DUAL CONNECT BY level <= 10")
        .unwrap();
    statement.set_exec_mode(ExecMode::ScrollableReadOnly).unwrap();
    statement.execute(1).unwrap();

    let mut rows = statement.result_set().unwrap().unwrap();
    assert!(rows.fetch_last().unwrap());
    assert_eq!(10, rows.row_number());
    assert!(rows.fetch_prev().unwrap());
    assert_eq!(9, rows.row_number());
    assert!(rows.fetch_first().unwrap());
    assert_eq!(1, rows.row_number());
    assert!(rows.fetch_seek(5, SeekOrigin::Start).unwrap());
    assert_eq!(5, rows.row_number());
    assert_eq!(Some(5), rows.get_i32(1).unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn closing_a_connection_disposes_descendants() {
    let conn = connect();
    setup_empty_table(&conn, "oci_api_leak", &["doc CLOB"]).unwrap();
    conn.execute_immediate("INSERT INTO oci_api_leak (doc) VALUES ('payload')")
        .unwrap();
    conn.commit().unwrap();

    let mut statement = conn.prepare("SELECT doc FROM oci_api_leak").unwrap();
    statement.execute(1).unwrap();
    {
        let mut rows = statement.result_set().unwrap().unwrap();
        assert!(rows.fetch_next().unwrap());
        let mut lob = rows.get_lob(1).unwrap().unwrap();
        assert_eq!(7, lob.length().unwrap());
        assert_eq!("payload", lob.read_text(7).unwrap());
    }
    // Simulate an application leaking the statement: its vendor handle is still disposed by
    // the connection, as the usage counters confirm after close.
    mem::forget(statement);
    conn.close().unwrap();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn internal_binds_refuse_external_rebinding() {
    let conn = connect();
    let mut statement = conn
        .prepare("SELECT :v FROM DUAL")
        .unwrap();
    statement.bind(":v", Some(42i32)).unwrap();

    let mut value = 43i32;
    let result = unsafe {
        statement.bind_external(
            ":v",
            &mut value as *mut i32 as *mut std::ffi::c_void,
            std::mem::size_of::<i32>(),
            oci_api::oci::constants::SQLT_INT,
            BindDirection::In,
            1,
        )
    };
    assert!(matches!(
        result,
        Err(Error::ExternalBindingNotAllowed { .. })
    ));

    // Rebinding internally with the same layout stays legal.
    statement.bind(":v", Some(44i32)).unwrap();
    statement.execute(1).unwrap();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn plsql_out_binds_are_populated() {
    let conn = connect();
    let mut statement = conn
        .prepare("BEGIN :doubled := :input * 2; END;")
        .unwrap();
    statement.register_out::<i32>(":doubled").unwrap();
    statement.bind(":input", Some(21i32)).unwrap();
    statement.execute(1).unwrap();
    assert_eq!(Some(42), statement.out_value::<i32>(":doubled").unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn date_round_trips_through_text() {
    let conn = connect();
    let date = Date::new(&conn, 2024, 2, 29, 13, 37, 5).unwrap();
    let text = date.to_text().unwrap();
    let back = Date::from_text(&conn, &text, None).unwrap();
    assert_eq!(std::cmp::Ordering::Equal, date.compare(&back).unwrap());
}

#[test_case(0i64; "zero")]
#[test_case(42i64; "small")]
#[test_case(-1234567890123i64; "negative")]
#[test_case(i64::MAX; "max")]
#[ignore = "requires a reachable Oracle database"]
fn numbers_round_trip_through_oracle_number(value: i64) {
    let conn = connect();
    let number = Number::from_i64(&conn, value).unwrap();
    assert_eq!(value, number.to_i64().unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn infinities_round_trip_through_sentinel_strings() {
    let conn = connect();
    let infinity = Number::from_text(&conn, "~", None).unwrap();
    assert!(infinity.is_infinite());
    assert_eq!("~", infinity.to_text().unwrap());
    assert_eq!(f64::INFINITY, infinity.to_f64().unwrap());

    let negative = Number::from_f64(&conn, f64::NEG_INFINITY).unwrap();
    assert_eq!("-~", negative.to_text().unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn long_columns_stream_piecewise() {
    let conn = connect();
    setup_empty_table(&conn, "oci_api_long", &["content LONG"]).unwrap();
    let payload = "x".repeat(100_000);
    let mut insert = conn
        .prepare("INSERT INTO oci_api_long (content) VALUES (:1)")
        .unwrap();
    insert
        .bind_long(1u32, payload.as_bytes(), oci_api::LongKind::Text)
        .unwrap();
    insert.execute(1).unwrap();
    conn.commit().unwrap();

    let mut select = conn.prepare("SELECT content FROM oci_api_long").unwrap();
    select.set_long_max_size(200_000);
    select.execute(1).unwrap();
    let mut rows = select.result_set().unwrap().unwrap();
    assert!(rows.fetch_next().unwrap());
    let long = rows.get_long(1).unwrap();
    assert_eq!(100_000, long.size());
    assert_eq!(&payload[..10], long.read_text(10).unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn zero_iteration_execute_is_a_no_op() {
    let conn = connect();
    setup_empty_table(&conn, "oci_api_noop", &["id NUMBER(10)"]).unwrap();
    let mut statement = conn
        .prepare("INSERT INTO oci_api_noop (id) VALUES (:1)")
        .unwrap();
    statement.bind(1u32, Some(1i32)).unwrap();
    statement.execute(0).unwrap();
    assert_eq!(0, statement.row_count().unwrap());
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn server_version_parses_to_a_triple() {
    let conn = connect();
    let banner = conn.server_version().unwrap();
    assert!(banner.contains("Oracle"));
    let version = conn.server_version_number().unwrap();
    assert!(version.major >= 11);
    let _ = env().runtime_version();
    let _ = profile();
}

#[test]
#[ignore = "requires a reachable Oracle database"]
fn interrupted_calls_report_as_such() {
    let conn = connect();
    // A break with nothing in flight still round trips; reset restores the protocol state.
    conn.break_execution().unwrap();
    conn.reset().unwrap();
    conn.ping().unwrap();
}
