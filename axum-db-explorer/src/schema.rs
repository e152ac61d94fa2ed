//! Schema types for MySQL metadata introspection
//!
//! These types are populated directly from `information_schema` query results so
//! that everything downstream works on fixed, explicitly-typed descriptors.

use serde::{Deserialize, Serialize};

/// Whether a relation is a real table or a view, per
/// `information_schema.tables.table_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    #[serde(rename = "BASE TABLE")]
    BaseTable,
    #[serde(rename = "VIEW")]
    View,
}

impl TableType {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("VIEW") {
            TableType::View
        } else {
            TableType::BaseTable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::BaseTable => "BASE TABLE",
            TableType::View => "VIEW",
        }
    }
}

/// A table or view in the active schema.
///
/// `name` is the logical name used in routes (configured prefix stripped);
/// `display_name` keeps the physical name as it exists in the database.
#[derive(Debug, Clone, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub display_name: String,
    pub table_type: TableType,
}

/// Key classification from `information_schema.columns.column_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Primary,
    Unique,
    Multiple,
    None,
}

impl KeyKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PRI" => KeyKind::Primary,
            "UNI" => KeyKind::Unique,
            "MUL" => KeyKind::Multiple,
            _ => KeyKind::None,
        }
    }
}

/// A single column, captured immediately after the metadata query.
///
/// `data_type` is the lowercase MySQL data type (`varchar`, `tinyint`, ...);
/// `column_type` is the full type string (`tinyint(1) unsigned`) used for enum
/// label extraction and signedness/width checks.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub column_type: String,
    pub nullable: bool,
    pub key: KeyKind,
    pub auto_increment: bool,
    pub unsigned: bool,
    pub character_maximum_length: Option<u32>,
    pub enum_values: Vec<String>,
}

/// A foreign key constraint owned by a column of the inspected table.
///
/// `referenced_table` is the logical (prefix-stripped) name used for routing;
/// `referenced_table_display_name` keeps the physical name for display.
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKeyDescriptor {
    pub column: String,
    pub referenced_table: String,
    pub referenced_table_display_name: String,
    pub referenced_column: String,
}

/// One member column of an index, from `information_schema.statistics`.
/// Rows sharing `name` form one index; `sequence` orders the members.
#[derive(Debug, Clone, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub column: String,
    pub unique: bool,
    pub sequence: u32,
    pub index_type: String,
}

/// Sort direction for row browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Raw browse query parameters as they arrive on the request.
///
/// Validated into [`BrowseParams`] before use; see [`BrowseQuery::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

/// Validated browse parameters.
#[derive(Debug, Clone)]
pub struct BrowseParams {
    pub page: u32,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

/// Limits matching the query parameter contract: `page` positive, `search`
/// capped at 100 chars, `sort` capped at 50 chars, `direction` asc|desc.
const MAX_SEARCH_LEN: usize = 100;
const MAX_SORT_LEN: usize = 50;

impl BrowseQuery {
    pub fn validate(&self) -> Result<BrowseParams, crate::ValidationErrors> {
        let mut errors = crate::ValidationErrors::new();

        let page = match self.page {
            None => 1,
            Some(p) if p >= 1 => p as u32,
            Some(_) => {
                errors
                    .entry("page".into())
                    .or_default()
                    .push("must be a positive integer".into());
                1
            }
        };

        let search = match &self.search {
            Some(s) if s.chars().count() > MAX_SEARCH_LEN => {
                errors
                    .entry("search".into())
                    .or_default()
                    .push(format!("must not exceed {MAX_SEARCH_LEN} characters"));
                None
            }
            Some(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        let sort = match &self.sort {
            Some(s) if s.chars().count() > MAX_SORT_LEN => {
                errors
                    .entry("sort".into())
                    .or_default()
                    .push(format!("must not exceed {MAX_SORT_LEN} characters"));
                None
            }
            Some(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        let direction = match &self.direction {
            None => None,
            Some(d) if d.is_empty() => None,
            Some(d) => match SortDirection::parse(d) {
                Some(direction) => Some(direction),
                None => {
                    errors
                        .entry("direction".into())
                        .or_default()
                        .push("must be one of: asc, desc".into());
                    None
                }
            },
        };

        if errors.is_empty() {
            Ok(BrowseParams {
                page,
                search,
                sort,
                direction,
            })
        } else {
            Err(errors)
        }
    }
}

/// Page metadata returned alongside a page of rows.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl Pagination {
    pub fn new(total: u64, per_page: u32, current_page: u32) -> Self {
        let last_page = ((total + u64::from(per_page) - 1) / u64::from(per_page)).max(1) as u32;
        Self {
            total,
            per_page,
            current_page,
            last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, search: Option<&str>, sort: Option<&str>, direction: Option<&str>) -> BrowseQuery {
        BrowseQuery {
            page,
            search: search.map(String::from),
            sort: sort.map(String::from),
            direction: direction.map(String::from),
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        let params = query(None, None, None, None).validate().unwrap();
        assert_eq!(params.page, 1);
        assert!(params.search.is_none());
        assert!(params.sort.is_none());
        assert!(params.direction.is_none());
    }

    #[test]
    fn validate_rejects_non_positive_page() {
        assert!(query(Some(0), None, None, None).validate().is_err());
        assert!(query(Some(-3), None, None, None).validate().is_err());
        assert!(query(Some(2), None, None, None).validate().is_ok());
    }

    #[test]
    fn validate_caps_search_and_sort_length() {
        let long_search = "x".repeat(101);
        assert!(query(None, Some(&long_search), None, None).validate().is_err());

        let long_sort = "y".repeat(51);
        assert!(query(None, None, Some(&long_sort), None).validate().is_err());

        let ok = query(None, Some("term"), Some("name"), None).validate().unwrap();
        assert_eq!(ok.search.as_deref(), Some("term"));
        assert_eq!(ok.sort.as_deref(), Some("name"));
    }

    #[test]
    fn validate_rejects_unknown_direction() {
        assert!(query(None, None, None, Some("sideways")).validate().is_err());
        let params = query(None, None, None, Some("ASC")).validate().unwrap();
        assert_eq!(params.direction, Some(SortDirection::Asc));
    }

    #[test]
    fn table_type_parses_case_insensitively() {
        assert_eq!(TableType::parse("VIEW"), TableType::View);
        assert_eq!(TableType::parse("view"), TableType::View);
        assert_eq!(TableType::parse("BASE TABLE"), TableType::BaseTable);
        assert_eq!(TableType::parse("anything else"), TableType::BaseTable);
    }

    #[test]
    fn pagination_computes_last_page() {
        assert_eq!(Pagination::new(0, 25, 1).last_page, 1);
        assert_eq!(Pagination::new(25, 25, 1).last_page, 1);
        assert_eq!(Pagination::new(26, 25, 1).last_page, 2);
        assert_eq!(Pagination::new(100, 25, 2).last_page, 4);
    }
}
