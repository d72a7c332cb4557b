//! Tests which run without an Oracle client library or database.

use oci_api::{oci::Version, BindSpec, Environment, Error};

#[test]
fn loading_a_missing_client_library_reports_the_path() {
    let result = Environment::builder()
        .library_path("/definitely/not/there/libclntsh.so")
        .build();
    match result {
        Err(Error::LoadingSharedLib { path, .. }) => {
            assert!(path.contains("definitely"));
        }
        Err(other) => panic!("expected LoadingSharedLib, got {other}"),
        Ok(_) => panic!("loading from a missing path must not succeed"),
    }
}

#[test]
fn default_library_name_matches_platform() {
    let name = oci_api::oci::default_library_name();
    if cfg!(target_os = "windows") {
        assert_eq!("oci.dll", name);
    } else if cfg!(target_os = "macos") {
        assert_eq!("libclntsh.dylib", name);
    } else {
        assert_eq!("libclntsh.so", name);
    }
}

#[test]
fn version_tiers_order_like_releases() {
    assert!(Version::V9_2 < Version::V10_1);
    assert!(Version::V18_3 < Version::V19_3);
    assert_eq!("23.4.0", Version::V23_4.to_string());
}

#[test]
fn error_messages_carry_oracle_codes() {
    let error = Error::Oracle {
        code: 942,
        message: "table or view does not exist".to_string(),
        function: "OCIStmtExecute",
    };
    let text = error.to_string();
    assert!(text.contains("ORA-00942"));
    assert!(text.contains("OCIStmtExecute"));
}

#[test]
fn queue_timeout_is_its_own_kind() {
    assert!(matches!(
        Error::QueueTimeout,
        Error::QueueTimeout
    ));
    assert_eq!(0, Error::QueueTimeout.oracle_code());
}

#[test]
fn bind_specs_build_from_names_and_positions() {
    assert!(matches!(BindSpec::from(":name"), BindSpec::Named(_)));
    assert!(matches!(BindSpec::from(2u32), BindSpec::Positional(2)));
}

#[test]
fn no_error_is_recorded_before_any_operation() {
    oci_api::clear_last_error();
    assert!(oci_api::last_error().is_none());
}
