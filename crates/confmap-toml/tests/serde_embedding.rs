//! Embedding a config object inside another serde format.

use confmap_core::{static_schema, Config, IntConfigEntry, MappingError, Schema, Value};
use confmap_toml::{ConfigError, ConfigurationProvider, TomlConfiguration};

#[derive(Debug, Default, PartialEq)]
struct Endpoint {
    host: String,
    tags: Vec<String>,
}

impl Config for Endpoint {
    fn schema() -> &'static Schema<Self> {
        static_schema!(Endpoint, {
            Schema::<Self>::builder()
                .field("host", |c| &c.host, |c| &mut c.host)
                .field("tags", |c| &c.tags, |c| &mut c.tags)
                .build()
        })
    }
}

#[derive(Debug)]
struct Service {
    name: Option<String>,
    timeout: IntConfigEntry,
    endpoint: Endpoint,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: None,
            timeout: IntConfigEntry::bounded(30, 1, 300),
            endpoint: Endpoint::default(),
        }
    }
}

impl Config for Service {
    fn schema() -> &'static Schema<Self> {
        static_schema!(Service, {
            Schema::<Self>::builder()
                .field("name", |c| &c.name, |c| &mut c.name)
                .entry("timeout", |c| &c.timeout, |c| &mut c.timeout)
                .ignore_default()
                .section("endpoint", |c| &c.endpoint, |c| &mut c.endpoint)
                .build()
        })
    }
}

#[test]
fn test_serialize_to_json_and_back() {
    // Arrange
    let toml = TomlConfiguration::new();
    let mut service = Service {
        name: Some("billing".into()),
        endpoint: Endpoint {
            host: "billing.internal".into(),
            tags: vec!["a".into(), "b".into()],
        },
        ..Service::default()
    };
    service.timeout.set(45);

    // Act
    let tree = toml.serialize(&service).expect("serialize");
    let json = serde_json::to_string(&tree).expect("to json");
    let parsed: Value = serde_json::from_str(&json).expect("from json");
    let mut restored = Service::default();
    toml.deserialize(&mut restored, &parsed).expect("deserialize");

    // Assert
    assert_eq!(
        json,
        r#"{"name":"billing","timeout":45,"endpoint":{"host":"billing.internal","tags":["a","b"]}}"#
    );
    assert_eq!(restored.name.as_deref(), Some("billing"));
    assert_eq!(*restored.timeout.value(), 45);
    assert_eq!(restored.endpoint, service.endpoint);
}

#[test]
fn test_serialize_leaves_out_absent_and_default_suppressed_fields() {
    let tree = TomlConfiguration::new()
        .serialize(&Service::default())
        .expect("serialize");

    let table = tree.as_table().expect("table");
    let keys: Vec<&str> = table.keys().map(String::as_str).collect();
    assert_eq!(keys, ["endpoint"]);
}

#[test]
fn test_deserialize_keeps_fields_missing_from_the_tree() {
    // Arrange
    let toml = TomlConfiguration::new();
    let mut service = Service::default();
    service.name = Some("kept".into());
    let partial: Value = serde_json::from_str(r#"{"timeout":10}"#).expect("json");

    // Act
    toml.deserialize(&mut service, &partial).expect("deserialize");

    // Assert
    assert_eq!(service.name.as_deref(), Some("kept"));
    assert_eq!(*service.timeout.value(), 10);
}

#[derive(Debug, Default)]
struct Duplicated {
    first: String,
    second: String,
}

impl Config for Duplicated {
    fn schema() -> &'static Schema<Self> {
        static_schema!(Duplicated, {
            Schema::<Self>::builder()
                .field("first", |c| &c.first, |c| &mut c.first)
                .path("host")
                .field("second", |c| &c.second, |c| &mut c.second)
                .path("host")
                .build()
        })
    }
}

#[derive(Debug, Default)]
struct Wrapper {
    inner: Duplicated,
}

impl Config for Wrapper {
    fn schema() -> &'static Schema<Self> {
        static_schema!(Wrapper, {
            Schema::<Self>::builder()
                .section("inner", |c| &c.inner, |c| &mut c.inner)
                .build()
        })
    }
}

#[test]
fn test_serialize_rejects_invalid_nested_schema() {
    let err = TomlConfiguration::new()
        .serialize(&Wrapper::default())
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Mapping(MappingError::Schema { .. })
    ));
}
