//! Server-rendered HTML views
//!
//! Plain string templating: a shared layout with a sidebar of tables, the
//! table browser, the record panel, and a printable schema report. Assets are
//! served from the embedded bundle (see [`crate::frontend`]).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;

use crate::api::TableContext;
use crate::config::ExplorerConfig;
use crate::schema::{
    BrowseParams, ColumnDescriptor, ForeignKeyDescriptor, SortDirection, TableDescriptor,
};

/// One table's slice of the schema report.
pub(crate) struct SchemaEntry {
    pub table: TableDescriptor,
    pub columns: Vec<ColumnDescriptor>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

pub(crate) fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn encode_query_value(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            _ => {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}

/// Query string for browse links, preserving search/sort/direction.
fn browse_query_string(params: &BrowseParams, page: u32) -> String {
    let mut parts = vec![format!("page={page}")];
    if let Some(search) = &params.search {
        parts.push(format!("search={}", encode_query_value(search)));
    }
    if let Some(sort) = &params.sort {
        parts.push(format!("sort={}", encode_query_value(sort)));
    }
    if let Some(direction) = params.direction {
        parts.push(format!(
            "direction={}",
            match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            }
        ));
    }
    parts.join("&")
}

/// Render a cell value, applying the configured date/datetime display formats.
pub(crate) fn format_cell(data_type: &str, value: &Value, config: &ExplorerConfig) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(raw) => match data_type {
            "date" => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.format(&config.date_format).to_string())
                .unwrap_or_else(|_| raw.clone()),
            "datetime" | "timestamp" => {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                    .map(|datetime| datetime.format(&config.datetime_format).to_string())
                    .unwrap_or_else(|_| raw.clone())
            }
            _ => raw.clone(),
        },
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

fn layout(
    base_path: &str,
    title: &str,
    tables: &[TableDescriptor],
    active_table: Option<&str>,
    content: &str,
) -> String {
    let mut sidebar = String::new();
    for table in tables {
        let class = if active_table == Some(table.name.as_str()) {
            " class=\"active\""
        } else {
            ""
        };
        let _ = write!(
            sidebar,
            "<li{class}><a href=\"{base_path}/table/{name}\" title=\"{display}\">{name}</a></li>",
            name = escape_html(&table.name),
            display = escape_html(&table.display_name),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - DB Explorer</title>
    <link rel="stylesheet" href="{base_path}/assets/style.css">
    <script src="{base_path}/assets/app.js" defer></script>
</head>
<body>
    <header>
        <a class="brand" href="{base_path}/">DB Explorer</a>
        <nav>
            <a href="{base_path}/">Tables</a>
            <a href="{base_path}/schema">Schema</a>
        </nav>
    </header>
    <div class="wrap">
        <aside>
            <ul class="tables">{sidebar}</ul>
        </aside>
        <main>{content}</main>
    </div>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

pub(crate) fn render_dashboard(
    base_path: &str,
    database: &str,
    tables: &[TableDescriptor],
) -> String {
    let mut rows = String::new();
    for table in tables {
        let _ = write!(
            rows,
            "<tr><td><a href=\"{base_path}/table/{name}\">{name}</a></td><td>{display}</td><td>{kind}</td></tr>",
            name = escape_html(&table.name),
            display = escape_html(&table.display_name),
            kind = table.table_type.as_str(),
        );
    }

    let content = format!(
        r#"<h1>{database}</h1>
<p class="muted">{count} tables and views</p>
<table class="grid">
<thead><tr><th>Table</th><th>Physical name</th><th>Type</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        database = escape_html(database),
        count = tables.len(),
    );

    layout(base_path, database, tables, None, &content)
}

pub(crate) fn render_table(
    base_path: &str,
    config: &ExplorerConfig,
    all_tables: &[TableDescriptor],
    ctx: &TableContext,
    params: &BrowseParams,
    selected_record: Option<&serde_json::Map<String, Value>>,
    foreign_key_display: &BTreeMap<String, Value>,
) -> String {
    let mut content = String::new();

    let _ = write!(
        content,
        r#"<h1>{table} <span class="muted">({physical}, {kind})</span></h1>"#,
        table = escape_html(&ctx.table),
        physical = escape_html(&ctx.physical_table),
        kind = ctx.table_type.as_str(),
    );

    // Search box keeps the current sort.
    let _ = write!(
        content,
        r#"<form class="search" method="get" action="{base_path}/table/{table}">
<input type="search" name="search" maxlength="100" placeholder="Search..." value="{search}">
<button type="submit">Search</button>
</form>"#,
        table = escape_html(&ctx.table),
        search = escape_html(params.search.as_deref().unwrap_or("")),
    );

    // Column header links toggle the sort direction.
    let current_direction = params.direction.unwrap_or(config.default_sort_direction);
    let mut header = String::new();
    for column in &ctx.columns {
        let next_direction = if params.sort.as_deref() == Some(column.name.as_str())
            && current_direction == SortDirection::Asc
        {
            "desc"
        } else {
            "asc"
        };
        let _ = write!(
            header,
            "<th><a href=\"{base_path}/table/{table}?page=1&sort={name}&direction={next_direction}\">{name}</a></th>",
            table = escape_html(&ctx.table),
            name = escape_html(&column.name),
        );
    }

    let mut body = String::new();
    let key_column = ctx.record_key_column();
    for row in &ctx.rows {
        let Some(row) = row.as_object() else { continue };
        body.push_str("<tr>");
        for column in &ctx.columns {
            let value = row.get(&column.name).unwrap_or(&Value::Null);
            let cell = escape_html(&format_cell(&column.data_type, value, config));
            if column.name == key_column {
                let _ = write!(
                    body,
                    "<td><a href=\"{base_path}/table/{table}/record/{id}\">{cell}</a></td>",
                    table = escape_html(&ctx.table),
                    id = encode_query_value(&crate::database::rows::value_to_plain_string(value).unwrap_or_default()),
                );
            } else {
                let _ = write!(body, "<td>{cell}</td>");
            }
        }
        body.push_str("</tr>");
    }

    let _ = write!(
        content,
        r#"<table class="grid"><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table>"#
    );

    // Pagination nav.
    let pagination = &ctx.pagination;
    let _ = write!(
        content,
        r#"<nav class="pagination"><span>{total} rows, page {current} of {last}</span>"#,
        total = pagination.total,
        current = pagination.current_page,
        last = pagination.last_page,
    );
    if pagination.current_page > 1 {
        let _ = write!(
            content,
            " <a href=\"{base_path}/table/{table}?{query}\">&laquo; Previous</a>",
            table = escape_html(&ctx.table),
            query = browse_query_string(params, pagination.current_page - 1),
        );
    }
    if pagination.current_page < pagination.last_page {
        let _ = write!(
            content,
            " <a href=\"{base_path}/table/{table}?{query}\">Next &raquo;</a>",
            table = escape_html(&ctx.table),
            query = browse_query_string(params, pagination.current_page + 1),
        );
    }
    content.push_str("</nav>");

    if let Some(record) = selected_record {
        content.push_str("<section class=\"record\"><h2>Record</h2><dl>");
        for column in &ctx.columns {
            let value = record.get(&column.name).unwrap_or(&Value::Null);
            let mut cell = escape_html(&format_cell(&column.data_type, value, config));
            if let Some(label) = foreign_key_display.get(&column.name) {
                let _ = write!(
                    cell,
                    " <span class=\"muted\">({})</span>",
                    escape_html(&format_cell("", label, config))
                );
            }
            let _ = write!(
                content,
                "<dt>{name}</dt><dd>{cell}</dd>",
                name = escape_html(&column.name),
            );
        }
        content.push_str("</dl></section>");
    }

    // Structure panel: columns, presentation types, foreign keys, indexes.
    content.push_str(
        r#"<section class="structure"><h2>Structure</h2><table class="grid">
<thead><tr><th>Column</th><th>Type</th><th>Nullable</th><th>Key</th><th>Presentation</th></tr></thead><tbody>"#,
    );
    for column in &ctx.columns {
        let presentation = ctx
            .presentation_types
            .get(&column.name)
            .map(|t| t.label())
            .unwrap_or("Text Input");
        let _ = write!(
            content,
            "<tr><td>{name}</td><td>{kind}</td><td>{nullable}</td><td>{key:?}</td><td>{presentation}</td></tr>",
            name = escape_html(&column.name),
            kind = escape_html(&column.column_type),
            nullable = if column.nullable { "YES" } else { "NO" },
            key = column.key,
        );
    }
    content.push_str("</tbody></table>");

    if !ctx.foreign_keys.is_empty() {
        content.push_str("<h3>Foreign keys</h3><ul>");
        for fk in &ctx.foreign_keys {
            let _ = write!(
                content,
                "<li>{column} &rarr; <a href=\"{base_path}/table/{referenced}\">{referenced_display}</a>.{referenced_column}</li>",
                column = escape_html(&fk.column),
                referenced = escape_html(&fk.referenced_table),
                referenced_display = escape_html(&fk.referenced_table_display_name),
                referenced_column = escape_html(&fk.referenced_column),
            );
        }
        content.push_str("</ul>");
    }

    if !ctx.indexes.is_empty() {
        content.push_str("<h3>Indexes</h3><ul>");
        let mut current: Option<&str> = None;
        for index in &ctx.indexes {
            if current != Some(index.name.as_str()) {
                if current.is_some() {
                    content.push_str("</li>");
                }
                let _ = write!(
                    content,
                    "<li><strong>{name}</strong> ({kind}{unique}): {column}",
                    name = escape_html(&index.name),
                    kind = escape_html(&index.index_type),
                    unique = if index.unique { ", unique" } else { "" },
                    column = escape_html(&index.column),
                );
                current = Some(index.name.as_str());
            } else {
                let _ = write!(content, ", {}", escape_html(&index.column));
            }
        }
        if current.is_some() {
            content.push_str("</li>");
        }
        content.push_str("</ul>");
    }
    content.push_str("</section>");

    layout(base_path, &ctx.table, all_tables, Some(ctx.table.as_str()), &content)
}

pub(crate) fn render_schema_report(
    base_path: &str,
    database: &str,
    tables: &[TableDescriptor],
    entries: &[SchemaEntry],
) -> String {
    let mut content = format!(
        "<h1>Schema report: {}</h1>",
        escape_html(database)
    );

    for entry in entries {
        let _ = write!(
            content,
            r#"<section class="schema-table"><h2>{name} <span class="muted">({display}, {kind})</span></h2>
<table class="grid"><thead><tr><th>Column</th><th>Type</th><th>Nullable</th><th>Key</th><th>Extra</th></tr></thead><tbody>"#,
            name = escape_html(&entry.table.name),
            display = escape_html(&entry.table.display_name),
            kind = entry.table.table_type.as_str(),
        );
        for column in &entry.columns {
            let _ = write!(
                content,
                "<tr><td>{name}</td><td>{kind}</td><td>{nullable}</td><td>{key:?}</td><td>{extra}</td></tr>",
                name = escape_html(&column.name),
                kind = escape_html(&column.column_type),
                nullable = if column.nullable { "YES" } else { "NO" },
                key = column.key,
                extra = if column.auto_increment { "auto_increment" } else { "" },
            );
        }
        content.push_str("</tbody></table>");

        if !entry.foreign_keys.is_empty() {
            content.push_str("<ul>");
            for fk in &entry.foreign_keys {
                let _ = write!(
                    content,
                    "<li>{column} &rarr; {referenced}.{referenced_column}</li>",
                    column = escape_html(&fk.column),
                    referenced = escape_html(&fk.referenced_table_display_name),
                    referenced_column = escape_html(&fk.referenced_column),
                );
            }
            content.push_str("</ul>");
        }
        content.push_str("</section>");
    }

    layout(base_path, "Schema", tables, None, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html("<script>\"&'"),
            "&lt;script&gt;&quot;&amp;&#39;"
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(encode_query_value("a b"), "a+b");
        assert_eq!(encode_query_value("50%"), "50%25");
        assert_eq!(encode_query_value("safe-._~"), "safe-._~");
    }

    #[test]
    fn browse_query_string_preserves_parameters() {
        let params = BrowseParams {
            page: 3,
            search: Some("100%".into()),
            sort: Some("name".into()),
            direction: Some(SortDirection::Asc),
        };
        assert_eq!(
            browse_query_string(&params, 4),
            "page=4&search=100%25&sort=name&direction=asc"
        );
    }

    #[test]
    fn date_cells_use_the_configured_format() {
        let config = ExplorerConfig::default();

        assert_eq!(
            format_cell("date", &Value::from("2026-08-07"), &config),
            "Aug 7, 2026"
        );
        assert_eq!(
            format_cell("datetime", &Value::from("2026-08-07 09:30:00"), &config),
            "Aug 7, 2026 09:30:00"
        );
        // Unparseable values fall through unchanged.
        assert_eq!(format_cell("date", &Value::from("soon"), &config), "soon");
        assert_eq!(format_cell("varchar", &Value::Null, &config), "NULL");
    }
}
