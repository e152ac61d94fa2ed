//! Record validation and payload building
//!
//! Validation rules are derived from column metadata, checked against the raw
//! JSON record, and only then is the typed insert/update payload built. The
//! referential-existence check runs separately because it needs the database;
//! everything else is pure and unit-testable.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sqlx::MySqlPool;

use crate::database::inspector::MySqlInspector;
use crate::database::rows::{quote_identifier, value_to_plain_string};
use crate::presentation::PresentationType;
use crate::schema::{ColumnDescriptor, ForeignKeyDescriptor};
use crate::{Result, ValidationErrors};

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("time pattern"));
static SHORT_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("short time pattern"));
static SIGNED_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").expect("digit pattern"));
static UNSIGNED_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("digit pattern"));

/// Spellings accepted as true when coercing a boolean-presented value.
const TRUTHY_TOKENS: &[&str] = &["1", "true", "yes", "on"];
/// Full token set a boolean-presented value must come from.
const BOOLEAN_TOKENS: &[&str] = &["yes", "no", "1", "0", "true", "false", "on", "off"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    Create,
    Update,
}

/// A single value-level check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCheck {
    BooleanToken,
    OneOf(Vec<String>),
    Str { max_chars: Option<u32> },
    Date,
    TimePattern,
    IntegerRange { min: i64, max: i64 },
    DigitString { signed: bool },
    Numeric,
    Json,
}

/// Derived rules for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRules {
    pub required: bool,
    pub checks: Vec<ValueCheck>,
}

/// The exact representable range of a MySQL integer subtype. `bigint` is
/// handled separately via a digit-string check because its unsigned range
/// exceeds i64.
pub(crate) fn integer_range(data_type: &str, unsigned: bool) -> Option<(i64, i64)> {
    match data_type {
        "tinyint" => Some(if unsigned { (0, 255) } else { (-128, 127) }),
        "smallint" => Some(if unsigned { (0, 65_535) } else { (-32_768, 32_767) }),
        "mediumint" => Some(if unsigned {
            (0, 16_777_215)
        } else {
            (-8_388_608, 8_388_607)
        }),
        "int" | "integer" => Some(if unsigned {
            (0, 4_294_967_295)
        } else {
            (-2_147_483_648, 2_147_483_647)
        }),
        _ => None,
    }
}

/// Columns eligible for validation and the rules for each. Auto-increment
/// columns are never writable; on update the primary key is excluded too.
pub fn derive_rules(
    columns: &[ColumnDescriptor],
    presentation_types: &BTreeMap<String, PresentationType>,
    mode: RecordMode,
    primary_key: Option<&str>,
) -> BTreeMap<String, ColumnRules> {
    let mut rules = BTreeMap::new();

    for column in columns {
        if column.auto_increment {
            continue;
        }
        if mode == RecordMode::Update && primary_key == Some(column.name.as_str()) {
            continue;
        }

        let mut checks = Vec::new();

        let presentation = presentation_types
            .get(&column.name)
            .copied()
            .unwrap_or(PresentationType::Text);
        if presentation == PresentationType::Boolean {
            checks.push(ValueCheck::BooleanToken);
        }

        let data_type = column.data_type.as_str();
        match data_type {
            "enum" => {
                if !column.enum_values.is_empty() {
                    checks.push(ValueCheck::OneOf(column.enum_values.clone()));
                }
            }
            "char" | "varchar" => {
                checks.push(ValueCheck::Str {
                    max_chars: column.character_maximum_length,
                });
            }
            "text" | "tinytext" | "mediumtext" | "longtext" => {
                checks.push(ValueCheck::Str { max_chars: None });
            }
            "date" | "datetime" | "timestamp" => {
                checks.push(ValueCheck::Date);
            }
            "time" => {
                checks.push(ValueCheck::TimePattern);
            }
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" => {
                if let Some((min, max)) = integer_range(data_type, column.unsigned) {
                    checks.push(ValueCheck::IntegerRange { min, max });
                }
            }
            "bigint" => {
                checks.push(ValueCheck::DigitString {
                    signed: !column.unsigned,
                });
            }
            "decimal" | "float" | "double" | "real" => {
                checks.push(ValueCheck::Numeric);
            }
            "json" => {
                checks.push(ValueCheck::Json);
            }
            _ => {}
        }

        rules.insert(
            column.name.clone(),
            ColumnRules {
                required: !column.nullable,
                checks,
            },
        );
    }

    rules
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn check_value(check: &ValueCheck, value: &Value) -> std::result::Result<(), String> {
    match check {
        ValueCheck::BooleanToken => {
            let ok = match value {
                Value::Bool(_) => true,
                Value::Number(n) => n.as_i64().map(|n| n == 0 || n == 1).unwrap_or(false),
                Value::String(s) => BOOLEAN_TOKENS.contains(&s.as_str()),
                _ => false,
            };
            if ok {
                Ok(())
            } else {
                Err("must be a boolean value".into())
            }
        }
        ValueCheck::OneOf(allowed) => {
            let plain = value_to_plain_string(value).unwrap_or_default();
            if allowed.contains(&plain) {
                Ok(())
            } else {
                Err(format!("must be one of: {}", allowed.join(", ")))
            }
        }
        ValueCheck::Str { max_chars } => {
            let Value::String(s) = value else {
                return Err("must be a string".into());
            };
            if let Some(max) = max_chars {
                if s.chars().count() > *max as usize {
                    return Err(format!("must not exceed {max} characters"));
                }
            }
            Ok(())
        }
        ValueCheck::Date => {
            let Value::String(s) = value else {
                return Err("must be a valid date".into());
            };
            let parsed = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
                || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
                || chrono::DateTime::parse_from_rfc3339(s).is_ok();
            if parsed {
                Ok(())
            } else {
                Err("must be a valid date".into())
            }
        }
        ValueCheck::TimePattern => {
            let Value::String(s) = value else {
                return Err("must match HH:MM or HH:MM:SS".into());
            };
            if TIME_PATTERN.is_match(s) {
                Ok(())
            } else {
                Err("must match HH:MM or HH:MM:SS".into())
            }
        }
        ValueCheck::IntegerRange { min, max } => {
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse::<i64>().ok(),
                _ => None,
            };
            match parsed {
                Some(n) if n >= *min && n <= *max => Ok(()),
                _ => Err(format!("must be an integer between {min} and {max}")),
            }
        }
        ValueCheck::DigitString { signed } => {
            let plain = value_to_plain_string(value).unwrap_or_default();
            let pattern = if *signed { &SIGNED_DIGITS } else { &UNSIGNED_DIGITS };
            if pattern.is_match(&plain) {
                Ok(())
            } else if *signed {
                Err("must be an integer".into())
            } else {
                Err("must be an unsigned integer".into())
            }
        }
        ValueCheck::Numeric => {
            let parsed = match value {
                Value::Number(_) => true,
                Value::String(s) => s.parse::<f64>().is_ok(),
                _ => false,
            };
            if parsed {
                Ok(())
            } else {
                Err("must be numeric".into())
            }
        }
        ValueCheck::Json => Ok(()),
    }
}

/// Check a raw record against derived rules. An empty error map means the
/// record passed. Empty values on nullable columns skip the value checks, the
/// way a nullable rule short-circuits.
pub fn validate(
    rules: &BTreeMap<String, ColumnRules>,
    record: &serde_json::Map<String, Value>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (column, column_rules) in rules {
        let value = record.get(column);

        if is_empty_value(value) {
            if column_rules.required {
                errors
                    .entry(column.clone())
                    .or_default()
                    .push("is required".into());
            }
            continue;
        }

        let value = value.unwrap_or(&Value::Null);
        for check in &column_rules.checks {
            if let Err(message) = check_value(check, value) {
                errors.entry(column.clone()).or_default().push(message);
            }
        }
    }

    errors
}

/// Verify that each supplied foreign-key value exists in the referenced
/// table's referenced column. Empty values are skipped (nullability is the
/// required/nullable rule's concern).
pub async fn check_referential_integrity(
    pool: &MySqlPool,
    inspector: &MySqlInspector,
    foreign_keys: &[ForeignKeyDescriptor],
    record: &serde_json::Map<String, Value>,
) -> Result<ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for fk in foreign_keys {
        let Some(value) = record.get(&fk.column) else {
            continue;
        };
        let Some(plain) = value_to_plain_string(value).filter(|plain| !plain.is_empty()) else {
            continue;
        };

        let physical = inspector.physical_name(&fk.referenced_table);
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
            quote_identifier(&physical),
            quote_identifier(&fk.referenced_column)
        );
        let exists: i64 = sqlx::query_scalar(&sql).bind(&plain).fetch_one(pool).await?;

        if exists == 0 {
            errors.entry(fk.column.clone()).or_default().push(format!(
                "references a row that does not exist in {}",
                fk.referenced_table
            ));
        }
    }

    Ok(errors)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => TRUTHY_TOKENS.contains(&s.as_str()),
        _ => false,
    }
}

/// Convert a validated record into the typed insert/update payload.
pub fn build_payload(
    columns: &[ColumnDescriptor],
    record: &serde_json::Map<String, Value>,
    presentation_types: &BTreeMap<String, PresentationType>,
    mode: RecordMode,
    primary_key: Option<&str>,
) -> serde_json::Map<String, Value> {
    let mut payload = serde_json::Map::new();

    for column in columns {
        if column.auto_increment {
            continue;
        }
        if mode == RecordMode::Update && primary_key == Some(column.name.as_str()) {
            continue;
        }
        let Some(value) = record.get(&column.name) else {
            continue;
        };

        if matches!(value, Value::String(s) if s.is_empty()) && column.nullable {
            payload.insert(column.name.clone(), Value::Null);
            continue;
        }

        let presentation = presentation_types
            .get(&column.name)
            .copied()
            .unwrap_or(PresentationType::Text);

        if presentation == PresentationType::Boolean {
            let coerced = if is_empty_value(Some(value)) {
                if column.nullable {
                    Value::Null
                } else {
                    Value::Number(0.into())
                }
            } else {
                Value::Number(i32::from(is_truthy(value)).into())
            };
            payload.insert(column.name.clone(), coerced);
            continue;
        }

        if presentation == PresentationType::Time {
            if let Value::String(s) = value {
                if SHORT_TIME_PATTERN.is_match(s) {
                    payload.insert(column.name.clone(), Value::String(format!("{s}:00")));
                    continue;
                }
            }
        }

        payload.insert(column.name.clone(), value.clone());
    }

    payload
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(u) = n.as_u64() {
                query.bind(u)
            } else {
                query.bind(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => query.bind(s.as_str()),
        // JSON columns take their serialized form.
        Value::Array(_) | Value::Object(_) => query.bind(value.to_string()),
    }
}

/// Insert a payload and return the new auto-increment id.
pub(crate) async fn insert_record(
    pool: &MySqlPool,
    physical_table: &str,
    payload: &serde_json::Map<String, Value>,
) -> Result<u64> {
    let columns: Vec<String> = payload.keys().map(|name| quote_identifier(name)).collect();
    let placeholders = vec!["?"; payload.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(physical_table),
        columns.join(", "),
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for value in payload.values() {
        query = bind_value(query, value);
    }

    let result = query.execute(pool).await?;
    Ok(result.last_insert_id())
}

/// Update a record by key; returns the number of affected rows.
pub(crate) async fn update_record(
    pool: &MySqlPool,
    physical_table: &str,
    key_column: &str,
    id: &str,
    payload: &serde_json::Map<String, Value>,
) -> Result<u64> {
    let assignments: Vec<String> = payload
        .keys()
        .map(|name| format!("{} = ?", quote_identifier(name)))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_identifier(physical_table),
        assignments.join(", "),
        quote_identifier(key_column)
    );

    let mut query = sqlx::query(&sql);
    for value in payload.values() {
        query = bind_value(query, value);
    }
    query = query.bind(id);

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// Delete a record by key; returns the number of affected rows.
pub(crate) async fn delete_record(
    pool: &MySqlPool,
    physical_table: &str,
    key_column: &str,
    id: &str,
) -> Result<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        quote_identifier(physical_table),
        quote_identifier(key_column)
    );

    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeyKind;

    fn column(name: &str, data_type: &str, column_type: &str, nullable: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            data_type: data_type.into(),
            column_type: column_type.into(),
            nullable,
            key: KeyKind::None,
            auto_increment: false,
            unsigned: column_type.contains("unsigned"),
            character_maximum_length: None,
            enum_values: Vec::new(),
        }
    }

    fn record(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn rules_for(columns: &[ColumnDescriptor]) -> BTreeMap<String, ColumnRules> {
        derive_rules(columns, &BTreeMap::new(), RecordMode::Create, None)
    }

    #[test]
    fn signed_tinyint_accepts_its_exact_range() {
        let columns = [column("level", "tinyint", "tinyint(4)", false)];
        let rules = rules_for(&columns);

        for ok in ["-128", "127", "0"] {
            assert!(validate(&rules, &record(&[("level", Value::from(ok))])).is_empty(), "{ok}");
        }
        for bad in ["-129", "128"] {
            assert!(!validate(&rules, &record(&[("level", Value::from(bad))])).is_empty(), "{bad}");
        }
    }

    #[test]
    fn unsigned_tinyint_accepts_its_exact_range() {
        let columns = [column("level", "tinyint", "tinyint(3) unsigned", false)];
        let rules = rules_for(&columns);

        assert!(validate(&rules, &record(&[("level", Value::from(0))])).is_empty());
        assert!(validate(&rules, &record(&[("level", Value::from(255))])).is_empty());
        assert!(!validate(&rules, &record(&[("level", Value::from(-1))])).is_empty());
        assert!(!validate(&rules, &record(&[("level", Value::from(256))])).is_empty());
    }

    #[test]
    fn integer_ranges_cover_the_wider_subtypes() {
        assert_eq!(integer_range("smallint", false), Some((-32_768, 32_767)));
        assert_eq!(integer_range("mediumint", true), Some((0, 16_777_215)));
        assert_eq!(integer_range("int", false), Some((-2_147_483_648, 2_147_483_647)));
        assert_eq!(integer_range("integer", true), Some((0, 4_294_967_295)));
        assert_eq!(integer_range("bigint", false), None);
    }

    #[test]
    fn bigint_is_validated_as_a_digit_string() {
        let signed = [column("counter", "bigint", "bigint(20)", false)];
        let rules = rules_for(&signed);
        assert!(validate(&rules, &record(&[("counter", Value::from("-9223372036854775809"))])).is_empty());
        assert!(!validate(&rules, &record(&[("counter", Value::from("12.5"))])).is_empty());

        let unsigned = [column("counter", "bigint", "bigint(20) unsigned", false)];
        let rules = rules_for(&unsigned);
        assert!(validate(&rules, &record(&[("counter", Value::from("18446744073709551615"))])).is_empty());
        assert!(!validate(&rules, &record(&[("counter", Value::from("-1"))])).is_empty());
    }

    #[test]
    fn required_and_nullable_follow_column_nullability() {
        let columns = [
            column("name", "varchar", "varchar(191)", false),
            column("note", "varchar", "varchar(191)", true),
        ];
        let rules = rules_for(&columns);

        let errors = validate(&rules, &record(&[("note", Value::from(""))]));
        assert!(errors.contains_key("name"));
        assert!(!errors.contains_key("note"));
    }

    #[test]
    fn varchar_length_is_bounded_when_known() {
        let mut col = column("name", "varchar", "varchar(5)", false);
        col.character_maximum_length = Some(5);
        let rules = rules_for(&[col]);

        assert!(validate(&rules, &record(&[("name", Value::from("12345"))])).is_empty());
        assert!(!validate(&rules, &record(&[("name", Value::from("123456"))])).is_empty());
    }

    #[test]
    fn enum_values_are_the_only_accepted_labels() {
        let mut col = column("status", "enum", "enum('draft','published')", false);
        col.enum_values = vec!["draft".into(), "published".into()];
        let rules = rules_for(&[col]);

        assert!(validate(&rules, &record(&[("status", Value::from("draft"))])).is_empty());
        assert!(!validate(&rules, &record(&[("status", Value::from("archived"))])).is_empty());
    }

    #[test]
    fn time_values_must_match_the_pattern() {
        let columns = [column("opens_at", "time", "time", false)];
        let rules = rules_for(&columns);

        assert!(validate(&rules, &record(&[("opens_at", Value::from("09:30"))])).is_empty());
        assert!(validate(&rules, &record(&[("opens_at", Value::from("09:30:15"))])).is_empty());
        assert!(!validate(&rules, &record(&[("opens_at", Value::from("9:30"))])).is_empty());
        assert!(!validate(&rules, &record(&[("opens_at", Value::from("evening"))])).is_empty());
    }

    #[test]
    fn boolean_presented_columns_take_the_token_set() {
        let columns = [column("is_active", "tinyint", "tinyint(1)", false)];
        let presentations: BTreeMap<String, PresentationType> =
            [("is_active".to_string(), PresentationType::Boolean)].into();
        let rules = derive_rules(&columns, &presentations, RecordMode::Create, None);

        for ok in ["yes", "no", "1", "0", "true", "false", "on", "off"] {
            assert!(
                validate(&rules, &record(&[("is_active", Value::from(ok))])).is_empty(),
                "{ok}"
            );
        }
        assert!(validate(&rules, &record(&[("is_active", Value::Bool(true))])).is_empty());
        assert!(!validate(&rules, &record(&[("is_active", Value::from("maybe"))])).is_empty());
    }

    #[test]
    fn auto_increment_and_update_primary_key_are_excluded() {
        let mut id = column("id", "bigint", "bigint unsigned", false);
        id.auto_increment = true;
        id.key = KeyKind::Primary;
        let code = column("code", "varchar", "varchar(10)", false);
        let name = column("name", "varchar", "varchar(191)", false);

        let create = derive_rules(
            &[id.clone(), code.clone(), name.clone()],
            &BTreeMap::new(),
            RecordMode::Create,
            Some("code"),
        );
        assert!(!create.contains_key("id"));
        assert!(create.contains_key("code"));

        let update = derive_rules(
            &[id, code, name],
            &BTreeMap::new(),
            RecordMode::Update,
            Some("code"),
        );
        assert!(!update.contains_key("code"));
        assert!(update.contains_key("name"));
    }

    #[test]
    fn payload_nulls_empty_strings_on_nullable_columns() {
        let columns = [
            column("note", "varchar", "varchar(191)", true),
            column("name", "varchar", "varchar(191)", false),
        ];
        let payload = build_payload(
            &columns,
            &record(&[("note", Value::from("")), ("name", Value::from("x"))]),
            &BTreeMap::new(),
            RecordMode::Create,
            None,
        );
        assert_eq!(payload["note"], Value::Null);
        assert_eq!(payload["name"], Value::from("x"));
    }

    #[test]
    fn payload_coerces_boolean_spellings() {
        let columns = [
            column("flag", "tinyint", "tinyint(1)", false),
            column("opt", "tinyint", "tinyint(1)", true),
        ];
        let presentations: BTreeMap<String, PresentationType> = [
            ("flag".to_string(), PresentationType::Boolean),
            ("opt".to_string(), PresentationType::Boolean),
        ]
        .into();

        for truthy in [Value::from("yes"), Value::from("1"), Value::Bool(true), Value::from(1)] {
            let payload = build_payload(
                &columns,
                &record(&[("flag", truthy)]),
                &presentations,
                RecordMode::Create,
                None,
            );
            assert_eq!(payload["flag"], Value::from(1));
        }

        let payload = build_payload(
            &columns,
            &record(&[("flag", Value::from("off")), ("opt", Value::from(""))]),
            &presentations,
            RecordMode::Create,
            None,
        );
        assert_eq!(payload["flag"], Value::from(0));
        // Empty on a nullable boolean becomes NULL, not 0.
        assert_eq!(payload["opt"], Value::Null);

        let payload = build_payload(
            &columns,
            &record(&[("flag", Value::Null)]),
            &presentations,
            RecordMode::Create,
            None,
        );
        assert_eq!(payload["flag"], Value::from(0));
    }

    #[test]
    fn payload_pads_short_time_values() {
        let columns = [column("opens_at", "time", "time", false)];
        let presentations: BTreeMap<String, PresentationType> =
            [("opens_at".to_string(), PresentationType::Time)].into();

        let payload = build_payload(
            &columns,
            &record(&[("opens_at", Value::from("09:30"))]),
            &presentations,
            RecordMode::Create,
            None,
        );
        assert_eq!(payload["opens_at"], Value::from("09:30:00"));

        let payload = build_payload(
            &columns,
            &record(&[("opens_at", Value::from("09:30:15"))]),
            &presentations,
            RecordMode::Create,
            None,
        );
        assert_eq!(payload["opens_at"], Value::from("09:30:15"));
    }

    #[test]
    fn payload_drops_auto_increment_and_update_primary_key() {
        let mut id = column("id", "bigint", "bigint unsigned", false);
        id.auto_increment = true;
        id.key = KeyKind::Primary;
        let name = column("name", "varchar", "varchar(191)", false);

        let payload = build_payload(
            &[id.clone(), name.clone()],
            &record(&[("id", Value::from(7)), ("name", Value::from("x"))]),
            &BTreeMap::new(),
            RecordMode::Create,
            Some("id"),
        );
        assert!(!payload.contains_key("id"));

        let mut code = column("code", "varchar", "varchar(10)", false);
        code.key = KeyKind::Primary;
        let payload = build_payload(
            &[code, name],
            &record(&[("code", Value::from("A1")), ("name", Value::from("x"))]),
            &BTreeMap::new(),
            RecordMode::Update,
            Some("code"),
        );
        assert!(!payload.contains_key("code"));
        assert!(payload.contains_key("name"));
    }

    #[test]
    fn dates_parse_in_common_shapes() {
        let columns = [column("published_at", "datetime", "datetime", false)];
        let rules = rules_for(&columns);

        for ok in ["2026-08-07", "2026-08-07 12:30:00", "2026-08-07T12:30:00"] {
            assert!(
                validate(&rules, &record(&[("published_at", Value::from(ok))])).is_empty(),
                "{ok}"
            );
        }
        assert!(!validate(&rules, &record(&[("published_at", Value::from("next tuesday"))])).is_empty());
    }
}
