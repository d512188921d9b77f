use super::*;
use std::collections::HashMap;

fn config_from(vars: &[(&str, &str)]) -> Result<Config, Error> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn when_nothing_is_set_it_should_use_the_defaults() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.api_url, "https://api.github.com");
    assert_eq!(config.data_dir, PathBuf::from("./data"));
    assert_eq!(config.port, 3000);
    assert_eq!(config.listen_addr(), "0.0.0.0:3000");
}

#[test]
fn when_variables_are_set_it_should_use_them() {
    let config = config_from(&[
        (API_URL_VAR, "http://127.0.0.1:9000"),
        (DATA_DIR_VAR, "/var/lib/explorer"),
        (PORT_VAR, "8080"),
    ])
    .unwrap();

    assert_eq!(config.api_url, "http://127.0.0.1:9000");
    assert_eq!(config.data_dir, PathBuf::from("/var/lib/explorer"));
    assert_eq!(config.listen_addr(), "0.0.0.0:8080");
}

#[test]
fn when_port_is_not_a_number_it_should_error() {
    let err = config_from(&[(PORT_VAR, "eighty")]).unwrap_err();

    assert!(err.to_string().contains("PORT"));
}
