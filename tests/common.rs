use std::{env, sync::OnceLock};

use oci_api::{Connection, Environment};

/// Connection settings of the test instance, overridable through `OCI_API_TEST_DB`,
/// `OCI_API_TEST_USER` and `OCI_API_TEST_PASSWORD`.
pub struct Profile {
    pub db: String,
    pub user: String,
    pub password: String,
}

impl Profile {
    fn from_env() -> Self {
        Profile {
            db: env::var("OCI_API_TEST_DB").unwrap_or_else(|_| "//localhost/XEPDB1".to_string()),
            user: env::var("OCI_API_TEST_USER").unwrap_or_else(|_| "oci_api_test".to_string()),
            password: env::var("OCI_API_TEST_PASSWORD")
                .unwrap_or_else(|_| "oci_api_test".to_string()),
        }
    }
}

// Rust by default executes tests in parallel; loading the client once is enough for all of
// them.
pub fn env() -> &'static Environment {
    static ENV: OnceLock<Environment> = OnceLock::new();
    ENV.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();
        Environment::new().expect("Oracle client library must be loadable")
    })
}

pub fn profile() -> &'static Profile {
    static PROFILE: OnceLock<Profile> = OnceLock::new();
    PROFILE.get_or_init(Profile::from_env)
}

pub fn connect() -> Connection<'static> {
    let profile = profile();
    env()
        .connect(&profile.db, &profile.user, &profile.password)
        .expect("test database must be reachable")
}

/// Drops and recreates a table. Column definitions are passed verbatim.
pub fn setup_empty_table(
    conn: &Connection<'_>,
    table_name: &str,
    columns: &[&str],
) -> Result<(), oci_api::Error> {
    let drop_table = format!(
        "BEGIN \
            EXECUTE IMMEDIATE 'DROP TABLE {table_name}'; \
        EXCEPTION WHEN OTHERS THEN \
            IF SQLCODE != -942 THEN RAISE; END IF; \
        END;"
    );
    conn.execute_immediate(&drop_table)?;
    let create_table = format!("CREATE TABLE {table_name} ({})", columns.join(", "));
    conn.execute_immediate(&create_table)?;
    Ok(())
}
