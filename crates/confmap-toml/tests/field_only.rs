//! Annotated-only mapping versus mapping every registered field.

use confmap_core::{static_schema, Config, Schema};
use confmap_toml::{ConfigurationProvider, TomlConfiguration};

#[derive(Debug, PartialEq)]
struct AnnotatedOnly {
    with_annotation: String,
    without_annotation: String,
}

impl Default for AnnotatedOnly {
    fn default() -> Self {
        Self {
            with_annotation: "annotated".into(),
            without_annotation: "unannotated".into(),
        }
    }
}

impl Config for AnnotatedOnly {
    fn schema() -> &'static Schema<Self> {
        static_schema!(AnnotatedOnly, {
            Schema::<Self>::builder()
                .field("withAnnotation", |c| &c.with_annotation, |c| &mut c.with_annotation)
                .field("withoutAnnotation", |c| &c.without_annotation, |c| &mut c.without_annotation)
                .unannotated()
                .build()
        })
    }
}

#[derive(Debug, PartialEq)]
struct EveryField {
    with_annotation: String,
    without_annotation: String,
}

impl Default for EveryField {
    fn default() -> Self {
        Self {
            with_annotation: "annotated".into(),
            without_annotation: "unannotated".into(),
        }
    }
}

impl Config for EveryField {
    fn schema() -> &'static Schema<Self> {
        static_schema!(EveryField, {
            Schema::<Self>::builder()
                .config_fields_only(false)
                .field("withAnnotation", |c| &c.with_annotation, |c| &mut c.with_annotation)
                .field("withoutAnnotation", |c| &c.without_annotation, |c| &mut c.without_annotation)
                .unannotated()
                .build()
        })
    }
}

#[derive(Debug, Default, PartialEq)]
struct ParentConfig {
    name: String,
    nested: AnnotatedOnly,
}

impl Config for ParentConfig {
    fn schema() -> &'static Schema<Self> {
        static_schema!(ParentConfig, {
            Schema::<Self>::builder()
                .section("nested", |c| &c.nested, |c| &mut c.nested)
                .field("name", |c| &c.name, |c| &mut c.name)
                .build()
        })
    }
}

fn save_to_string<T: Config>(config: &T) -> String {
    let mut out = Vec::new();
    TomlConfiguration::new().save(config, &mut out).expect("save");
    String::from_utf8(out).expect("utf-8")
}

fn load_str<T: Config>(text: &str) -> T {
    TomlConfiguration::new()
        .load(&mut text.as_bytes())
        .expect("load")
}

const BOTH_KEYS: &str = r#"
    with_annotation = "custom_value"
    without_annotation = "should_not_load"
"#;

#[test]
fn test_unannotated_field_is_not_written() {
    let serialized = save_to_string(&AnnotatedOnly::default());

    assert_eq!(serialized, "with_annotation = \"annotated\"\n");
}

#[test]
fn test_unannotated_field_is_not_loaded() {
    // Act
    let config: AnnotatedOnly = load_str(BOTH_KEYS);

    // Assert
    assert_eq!(config.with_annotation, "custom_value");
    assert_eq!(config.without_annotation, "unannotated");
}

#[test]
fn test_all_fields_mode_writes_and_loads_unannotated_field() {
    // Act
    let serialized = save_to_string(&EveryField::default());
    let config: EveryField = load_str(BOTH_KEYS);

    // Assert
    assert_eq!(
        serialized,
        "with_annotation = \"annotated\"\nwithout_annotation = \"unannotated\"\n"
    );
    assert_eq!(config.with_annotation, "custom_value");
    assert_eq!(config.without_annotation, "should_not_load");
}

#[test]
fn test_nested_section_follows_plain_fields() {
    // Arrange
    let config = ParentConfig {
        name: "parent".into(),
        nested: AnnotatedOnly::default(),
    };

    // Act
    let serialized = save_to_string(&config);

    // Assert
    assert_eq!(
        serialized,
        "name = \"parent\"\n\n[nested]\nwith_annotation = \"annotated\"\n"
    );
}

#[test]
fn test_nested_section_loads_annotated_fields_only() {
    let text = r#"
        name = "loaded"

        [nested]
        with_annotation = "inner"
        without_annotation = "ignored"
    "#;

    let config: ParentConfig = load_str(text);

    assert_eq!(config.name, "loaded");
    assert_eq!(config.nested.with_annotation, "inner");
    assert_eq!(config.nested.without_annotation, "unannotated");
}
