use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn normalizes_bare_host_to_http_url() {
    assert_eq!(normalize_backend_host("ledger.local:8085"), "http://ledger.local:8085");
}

#[test]
fn keeps_scheme_and_strips_trailing_slash() {
    assert_eq!(
        normalize_backend_host(" https://ledger.bank.test/api/ "),
        "https://ledger.bank.test/api"
    );
}

#[test]
fn blank_host_falls_back_to_default() {
    assert_eq!(normalize_backend_host("  "), Settings::default().backend_host);
}

#[test]
fn file_values_accept_strings_integers_and_booleans() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
backend_host = "http://ledger.test:9000"
page_size = 10
request_timeout_secs = "3"
confirm_mutations = true
unknown_key = "ignored"
"#,
    )
    .expect("apply");

    assert_eq!(
        settings,
        Settings {
            backend_host: "http://ledger.test:9000".into(),
            page_size: 10,
            request_timeout_secs: 3,
            confirm_mutations: true,
        }
    );
}

#[test]
fn invalid_file_value_is_an_error() {
    let mut settings = Settings::default();
    let err = apply_file(&mut settings, "page_size = \"many\"").expect_err("must fail");
    assert!(err.to_string().contains("page_size"), "unexpected error: {err}");
}

#[test]
fn app_prefixed_env_overrides_plain_env() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("LEDGER_BACKEND_HOST", "http://plain:1"),
            ("APP__BACKEND_HOST", "http://app:2"),
            ("APP__PAGE_SIZE", "7"),
            ("APP__CONFIRM_MUTATIONS", "true"),
        ]),
    )
    .expect("env");

    assert_eq!(settings.backend_host, "http://app:2");
    assert_eq!(settings.page_size, 7);
    assert!(settings.confirm_mutations);
    assert_eq!(settings.request_timeout_secs, 10);
}

#[test]
fn normalized_clamps_zero_page_size_and_timeout() {
    let settings = Settings {
        backend_host: "ledger:8085/".into(),
        page_size: 0,
        request_timeout_secs: 0,
        confirm_mutations: false,
    }
    .normalized();

    assert_eq!(settings.backend_host, "http://ledger:8085");
    assert_eq!(settings.page_size, 1);
    assert_eq!(settings.request_timeout_secs, 1);
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("teller_config_test_{suffix}.toml"));
    fs::write(&path, "backend_host = \"http://from-file:8085\"\npage_size = 8\n").expect("write");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.page_size, 8);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let path = env::temp_dir().join("teller_config_test_does_not_exist.toml");
    let err = load_settings(Some(&path)).expect_err("must fail");
    assert!(err.to_string().contains("failed to read config file"));
}
