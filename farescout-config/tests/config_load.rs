use farescout_config::FarescoutSettingsLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_settings_from_file() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
webdriver:
  endpoint: "http://chromedriver:9515"
  headless: false
  interaction_timeout_secs: 20
store:
  redis_url: "redis://${FARESCOUT_TEST_REDIS_HOST}:6379"
sink:
  mongo_uri: "mongodb://mongo:27017"
  database: "fares"
  collection: "latam"
"#;
    let p = write_yaml(&tmp, "farescout.yaml", file_yaml);

    temp_env::with_var("FARESCOUT_TEST_REDIS_HOST", Some("cache-1"), || {
        let settings = FarescoutSettingsLoader::new()
            .with_file(&p)
            .load()
            .expect("load settings");

        assert_eq!(settings.version.as_deref(), Some("0.1"));
        assert_eq!(settings.webdriver.endpoint, "http://chromedriver:9515");
        assert!(!settings.webdriver.headless);
        assert_eq!(settings.webdriver.interaction_timeout_secs, 20);
        assert_eq!(settings.store.redis_url, "redis://cache-1:6379");
        assert_eq!(settings.sink.database, "fares");
        assert_eq!(settings.sink.collection, "latam");
    });
}

#[test]
#[serial]
fn partial_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "farescout.yaml", "version: \"0.1\"\nwebdriver:\n  headless: false\n");

    let settings = FarescoutSettingsLoader::new()
        .with_file(&p)
        .load()
        .expect("load settings");

    assert!(!settings.webdriver.headless);
    assert_eq!(settings.webdriver.endpoint, "http://localhost:9515");
    assert_eq!(settings.sink.mongo_uri, "mongodb://localhost:27017");
}
