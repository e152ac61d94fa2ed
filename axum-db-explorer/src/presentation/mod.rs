//! Presentation types and the column → widget resolver
//!
//! A presentation type is the UI input widget a column is rendered and edited
//! with. [`detect`] infers a default from MySQL column metadata;
//! [`allowed_for_column`] enumerates the overrides a column may be switched to.
//! The invariant between the two: for any column with a non-empty allowed set,
//! the detected type is a member of that set.

use serde::{Deserialize, Serialize};

use crate::schema::ColumnDescriptor;

pub mod store;

pub use store::{ColumnPresentation, ColumnPresentationStore};

/// The closed set of UI input widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationType {
    Text,
    Textarea,
    Number,
    Color,
    Date,
    Time,
    Datetime,
    Boolean,
    Select,
    ForeignSelect,
}

impl PresentationType {
    pub const ALL: [PresentationType; 10] = [
        PresentationType::Text,
        PresentationType::Textarea,
        PresentationType::Number,
        PresentationType::Color,
        PresentationType::Date,
        PresentationType::Time,
        PresentationType::Datetime,
        PresentationType::Boolean,
        PresentationType::Select,
        PresentationType::ForeignSelect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationType::Text => "text",
            PresentationType::Textarea => "textarea",
            PresentationType::Number => "number",
            PresentationType::Color => "color",
            PresentationType::Date => "date",
            PresentationType::Time => "time",
            PresentationType::Datetime => "datetime",
            PresentationType::Boolean => "boolean",
            PresentationType::Select => "select",
            PresentationType::ForeignSelect => "foreign-select",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == raw)
    }

    /// Human-readable widget name for option lists.
    pub fn label(&self) -> &'static str {
        match self {
            PresentationType::Text => "Text Input",
            PresentationType::Textarea => "Textarea",
            PresentationType::Number => "Number",
            PresentationType::Color => "Color Picker",
            PresentationType::Date => "Date",
            PresentationType::Time => "Time",
            PresentationType::Datetime => "Datetime",
            PresentationType::Boolean => "Boolean (Yes/No)",
            PresentationType::Select => "Dropdown",
            PresentationType::ForeignSelect => "Foreign Key Dropdown",
        }
    }
}

impl std::fmt::Display for PresentationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value/label pair for widget option lists.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationTypeOption {
    pub value: PresentationType,
    pub label: &'static str,
}

pub fn options_for_types(types: &[PresentationType]) -> Vec<PresentationTypeOption> {
    types
        .iter()
        .map(|t| PresentationTypeOption {
            value: *t,
            label: t.label(),
        })
        .collect()
}

const TEXT_FAMILY: &[&str] = &["text", "tinytext", "mediumtext", "longtext"];
const CHARACTER_FAMILY: &[&str] = &["char", "varchar", "text", "tinytext", "mediumtext", "longtext"];
const NUMERIC_FAMILY: &[&str] = &[
    "int", "integer", "tinyint", "smallint", "mediumint", "bigint", "decimal", "float", "double",
];
const BOOLEAN_SHAPED: &[&str] = &["tinyint", "boolean", "bool"];

fn column_name_suggests_color(column: &ColumnDescriptor) -> bool {
    column.name.to_lowercase().contains("color")
}

/// Infer the default widget for a column. First match wins.
pub fn detect(column: &ColumnDescriptor, is_foreign_key: bool) -> PresentationType {
    let data_type = column.data_type.to_lowercase();
    let column_type = column.column_type.to_lowercase();

    if is_foreign_key {
        return PresentationType::ForeignSelect;
    }

    if data_type == "enum" {
        return PresentationType::Select;
    }

    if column_name_suggests_color(column) && CHARACTER_FAMILY.contains(&data_type.as_str()) {
        return PresentationType::Color;
    }

    if data_type == "date" {
        return PresentationType::Date;
    }

    if data_type == "time" {
        return PresentationType::Time;
    }

    if data_type == "datetime" || data_type == "timestamp" {
        return PresentationType::Datetime;
    }

    if BOOLEAN_SHAPED.contains(&data_type.as_str()) && column_type.contains("(1)") {
        return PresentationType::Boolean;
    }

    if NUMERIC_FAMILY.contains(&data_type.as_str()) {
        return PresentationType::Number;
    }

    if TEXT_FAMILY.contains(&data_type.as_str()) {
        return PresentationType::Textarea;
    }

    PresentationType::Text
}

/// The overrides a column may be switched to, per type family.
///
/// Auto-increment columns are forced to an empty set by the caller, overriding
/// this function's result.
pub fn allowed_for_column(column: &ColumnDescriptor, is_foreign_key: bool) -> Vec<PresentationType> {
    let data_type = column.data_type.to_lowercase();
    let column_type = column.column_type.to_lowercase();

    if is_foreign_key {
        return vec![
            PresentationType::ForeignSelect,
            PresentationType::Select,
            PresentationType::Number,
            PresentationType::Text,
        ];
    }

    if data_type == "enum" {
        return vec![PresentationType::Select];
    }

    if data_type == "date" {
        return vec![PresentationType::Date, PresentationType::Text];
    }

    if data_type == "time" {
        return vec![PresentationType::Time, PresentationType::Text];
    }

    if data_type == "datetime" || data_type == "timestamp" {
        return vec![PresentationType::Datetime, PresentationType::Text];
    }

    if BOOLEAN_SHAPED.contains(&data_type.as_str()) && column_type.contains("(1)") {
        return vec![
            PresentationType::Boolean,
            PresentationType::Number,
            PresentationType::Text,
        ];
    }

    if NUMERIC_FAMILY.contains(&data_type.as_str()) {
        return vec![
            PresentationType::Number,
            PresentationType::Text,
            PresentationType::Select,
        ];
    }

    if TEXT_FAMILY.contains(&data_type.as_str()) || data_type == "json" {
        if column_name_suggests_color(column) {
            return vec![
                PresentationType::Color,
                PresentationType::Textarea,
                PresentationType::Text,
            ];
        }

        return vec![PresentationType::Textarea, PresentationType::Text];
    }

    if data_type == "char" || data_type == "varchar" {
        if column_name_suggests_color(column) {
            return vec![
                PresentationType::Color,
                PresentationType::Text,
                PresentationType::Textarea,
            ];
        }

        return vec![PresentationType::Text, PresentationType::Textarea];
    }

    vec![PresentationType::Text]
}

/// Allowed override sets for every column of a table. Auto-increment columns
/// get an empty set: their presentation is not configurable.
pub fn allowed_types_by_column(
    columns: &[ColumnDescriptor],
    foreign_key_columns: &std::collections::HashSet<String>,
) -> std::collections::BTreeMap<String, Vec<PresentationType>> {
    columns
        .iter()
        .map(|column| {
            let allowed = if column.auto_increment {
                Vec::new()
            } else {
                allowed_for_column(column, foreign_key_columns.contains(&column.name))
            };
            (column.name.clone(), allowed)
        })
        .collect()
}

/// Combine a stored override with the detected default, clamped to the allowed
/// set. An empty allowed set means the column is not configurable; the detected
/// default is used as-is.
pub fn effective_type(
    saved: Option<PresentationType>,
    detected: PresentationType,
    allowed: &[PresentationType],
) -> PresentationType {
    if allowed.is_empty() {
        return detected;
    }

    if let Some(saved) = saved {
        if allowed.contains(&saved) {
            return saved;
        }
    }

    if allowed.contains(&detected) {
        detected
    } else {
        allowed[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeyKind;

    fn column(name: &str, data_type: &str, column_type: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            data_type: data_type.into(),
            column_type: column_type.into(),
            nullable: true,
            key: KeyKind::None,
            auto_increment: false,
            unsigned: column_type.contains("unsigned"),
            character_maximum_length: None,
            enum_values: if data_type == "enum" {
                vec!["draft".into(), "published".into()]
            } else {
                Vec::new()
            },
        }
    }

    #[test]
    fn enum_columns_are_selects_and_only_selects() {
        let col = column("status", "enum", "enum('draft','published')");
        assert_eq!(detect(&col, false), PresentationType::Select);
        assert_eq!(allowed_for_column(&col, false), vec![PresentationType::Select]);
    }

    #[test]
    fn foreign_keys_win_over_any_data_type() {
        for (data_type, column_type) in [
            ("bigint", "bigint unsigned"),
            ("varchar", "varchar(64)"),
            ("enum", "enum('a','b')"),
        ] {
            let col = column("author_id", data_type, column_type);
            assert_eq!(detect(&col, true), PresentationType::ForeignSelect);
        }
    }

    #[test]
    fn tinyint_width_one_is_boolean_otherwise_number() {
        let flag = column("is_active", "tinyint", "tinyint(1)");
        assert_eq!(detect(&flag, false), PresentationType::Boolean);

        let counter = column("retries", "tinyint", "tinyint(4)");
        assert_eq!(detect(&counter, false), PresentationType::Number);
    }

    #[test]
    fn color_heuristic_applies_to_character_types_only() {
        let hex = column("accent_color", "varchar", "varchar(7)");
        assert_eq!(detect(&hex, false), PresentationType::Color);

        let count = column("color_count", "int", "int(11)");
        assert_eq!(detect(&count, false), PresentationType::Number);
    }

    #[test]
    fn temporal_types_map_to_their_widgets() {
        assert_eq!(detect(&column("born_on", "date", "date"), false), PresentationType::Date);
        assert_eq!(detect(&column("opens_at", "time", "time"), false), PresentationType::Time);
        assert_eq!(
            detect(&column("created_at", "datetime", "datetime"), false),
            PresentationType::Datetime
        );
        assert_eq!(
            detect(&column("updated_at", "timestamp", "timestamp"), false),
            PresentationType::Datetime
        );
    }

    #[test]
    fn long_text_becomes_textarea_and_default_is_text() {
        assert_eq!(
            detect(&column("body", "mediumtext", "mediumtext"), false),
            PresentationType::Textarea
        );
        assert_eq!(detect(&column("payload", "varbinary", "varbinary(32)"), false), PresentationType::Text);
    }

    #[test]
    fn json_columns_allow_textarea_but_detect_as_text() {
        let col = column("settings", "json", "json");
        assert_eq!(detect(&col, false), PresentationType::Text);
        assert_eq!(
            allowed_for_column(&col, false),
            vec![PresentationType::Textarea, PresentationType::Text]
        );
    }

    #[test]
    fn detect_is_always_allowed_when_the_set_is_non_empty() {
        let fixtures = [
            column("id", "bigint", "bigint unsigned"),
            column("name", "varchar", "varchar(191)"),
            column("bio", "text", "text"),
            column("accent_color", "varchar", "varchar(7)"),
            column("favorite_color", "longtext", "longtext"),
            column("status", "enum", "enum('draft','published')"),
            column("is_active", "tinyint", "tinyint(1)"),
            column("retries", "tinyint", "tinyint(4)"),
            column("born_on", "date", "date"),
            column("opens_at", "time", "time"),
            column("created_at", "timestamp", "timestamp"),
            column("settings", "json", "json"),
            column("blob_col", "blob", "blob"),
        ];

        for col in &fixtures {
            for is_fk in [false, true] {
                let allowed = allowed_for_column(col, is_fk);
                if !allowed.is_empty() {
                    assert!(
                        allowed.contains(&detect(col, is_fk)),
                        "detect({}) not in allowed set",
                        col.name
                    );
                }
            }
        }
    }

    #[test]
    fn effective_type_clamps_to_the_allowed_set() {
        let allowed = [PresentationType::Number, PresentationType::Text];

        // Saved value wins when allowed.
        assert_eq!(
            effective_type(Some(PresentationType::Text), PresentationType::Number, &allowed),
            PresentationType::Text
        );

        // Out-of-set saved value is ignored in favor of the detected default.
        assert_eq!(
            effective_type(Some(PresentationType::Color), PresentationType::Number, &allowed),
            PresentationType::Number
        );

        // Disallowed detected value falls back to the first allowed entry.
        assert_eq!(
            effective_type(None, PresentationType::Color, &allowed),
            PresentationType::Number
        );

        // Empty allowed set passes the detected value through.
        assert_eq!(
            effective_type(Some(PresentationType::Text), PresentationType::Number, &[]),
            PresentationType::Number
        );
    }

    #[test]
    fn auto_increment_columns_are_not_configurable() {
        let mut id = column("id", "bigint", "bigint unsigned");
        id.auto_increment = true;
        let name = column("name", "varchar", "varchar(191)");

        let allowed = allowed_types_by_column(
            &[id, name],
            &std::collections::HashSet::from(["name".to_string()]),
        );
        assert!(allowed["id"].is_empty());
        // The set for a foreign-key column leads with foreign-select.
        assert_eq!(allowed["name"][0], PresentationType::ForeignSelect);
    }

    #[test]
    fn wire_form_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&PresentationType::ForeignSelect).unwrap(),
            "\"foreign-select\""
        );
        assert_eq!(PresentationType::parse("foreign-select"), Some(PresentationType::ForeignSelect));
        assert_eq!(PresentationType::parse("carousel"), None);
    }
}
