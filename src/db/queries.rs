//! SQL for the document tables: one table per collection, each row an
//! `id` plus a JSON `body`. Fields are addressed with `json_extract` and
//! bound path parameters. Only the fixed paths in [`INDEXED_FIELDS`] are
//! written inline, so the planner can match the v2 expression indexes.

use crate::client::{Aggregate, Condition, GroupRow, Order, Query, Record};
use crate::errors::{AppError, AppResult};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Fields with an expression index. The SQL text must match the index
/// definitions in `db::migrate` exactly.
pub const INDEXED_FIELDS: &[(&str, &str)] = &[
    ("project", "json_extract(body, '$.project')"),
    ("task", "json_extract(body, '$.task')"),
    ("date", "json_extract(body, '$.date')"),
];

fn field_expr(field: &str, params: &mut Vec<SqlValue>) -> String {
    if field == "id" {
        return "id".to_string();
    }
    if let Some((_, expr)) = INDEXED_FIELDS.iter().find(|(name, _)| *name == field) {
        return (*expr).to_string();
    }
    params.push(SqlValue::Text(format!("$.{field}")));
    "json_extract(body, ?)".to_string()
}

fn compare(field: &str, op: &str, value: &Value, params: &mut Vec<SqlValue>) -> String {
    let expr = field_expr(field, params);
    params.push(json_to_sql(value));
    format!("{expr} {op} ?")
}

/// Compile a condition into a WHERE fragment, appending its parameters in
/// placeholder order.
pub fn compile_condition(condition: &Condition, params: &mut Vec<SqlValue>) -> String {
    match condition {
        Condition::All => "1".to_string(),
        Condition::Eq(field, Value::Null) | Condition::IsNull(field) => {
            format!("{} IS NULL", field_expr(field, params))
        }
        Condition::Eq(field, value) => compare(field, "=", value, params),
        Condition::In(_, values) if values.is_empty() => "0".to_string(),
        Condition::In(field, values) => {
            let expr = field_expr(field, params);
            params.extend(values.iter().map(json_to_sql));
            let placeholders = vec!["?"; values.len()].join(",");
            format!("{expr} IN ({placeholders})")
        }
        Condition::Gt(field, value) => compare(field, ">", value, params),
        Condition::Gte(field, value) => compare(field, ">=", value, params),
        Condition::Lt(field, value) => compare(field, "<", value, params),
        Condition::Lte(field, value) => compare(field, "<=", value, params),
        Condition::And(parts) if parts.is_empty() => "1".to_string(),
        Condition::And(parts) => parts
            .iter()
            .map(|c| format!("({})", compile_condition(c, params)))
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

fn parse_body(body: &str) -> AppResult<Record> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Other(format!("stored body is not an object: {other}"))),
    }
}

pub fn select_records(conn: &Connection, table: &str, query: &Query) -> AppResult<Vec<Record>> {
    let mut params = Vec::new();
    let filter = compile_condition(&query.condition, &mut params);

    let mut sql = format!("SELECT body FROM {table} WHERE {filter}");
    match &query.order_by {
        Some((field, order)) => {
            let expr = field_expr(field, &mut params);
            let dir = match order {
                Order::Asc => "ASC",
                Order::Desc => "DESC",
            };
            sql.push_str(&format!(" ORDER BY {expr} {dir}, rowid ASC"));
        }
        None => sql.push_str(" ORDER BY rowid ASC"),
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    log::debug!("{sql} -- {} param(s)", params.len());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        row.get::<_, String>(0)
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(parse_body(&r?)?);
    }
    Ok(out)
}

pub fn load_record(conn: &Connection, table: &str, id: &str) -> AppResult<Option<Record>> {
    let body: Option<String> = conn
        .query_row(
            &format!("SELECT body FROM {table} WHERE id = ?1"),
            [id],
            |row| row.get(0),
        )
        .optional()?;
    body.as_deref().map(parse_body).transpose()
}

pub fn insert_record(conn: &Connection, table: &str, id: &str, record: &Record) -> AppResult<()> {
    let body = serde_json::to_string(record)?;
    conn.execute(
        &format!("INSERT INTO {table} (id, body) VALUES (?1, ?2)"),
        params![id, body],
    )?;
    Ok(())
}

pub fn update_record(conn: &Connection, table: &str, id: &str, record: &Record) -> AppResult<usize> {
    let body = serde_json::to_string(record)?;
    let n = conn.execute(
        &format!("UPDATE {table} SET body = ?2 WHERE id = ?1"),
        params![id, body],
    )?;
    Ok(n)
}

pub fn delete_record(conn: &Connection, table: &str, id: &str) -> AppResult<usize> {
    let n = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
    Ok(n)
}

/// Aggregate over matching rows; no matching row aggregates to 0.
pub fn aggregate(
    conn: &Connection,
    table: &str,
    aggregate: &Aggregate,
    condition: &Condition,
) -> AppResult<f64> {
    let mut params = Vec::new();
    let expr = field_expr(&aggregate.field, &mut params);
    let filter = compile_condition(condition, &mut params);
    let sql = format!(
        "SELECT {}({expr}) FROM {table} WHERE {filter}",
        aggregate.op.sql_fn()
    );

    let value: Option<f64> =
        conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(value.unwrap_or(0.0))
}

fn group_key(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Text(s) => Some(s),
        SqlValue::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

pub fn group_aggregate(
    conn: &Connection,
    table: &str,
    group_by: &str,
    aggregate: &Aggregate,
    condition: &Condition,
) -> AppResult<Vec<GroupRow>> {
    let mut params = Vec::new();
    let group_expr = field_expr(group_by, &mut params);
    let expr = field_expr(&aggregate.field, &mut params);
    let filter = compile_condition(condition, &mut params);
    let sql = format!(
        "SELECT {group_expr} AS grp, {}({expr}) FROM {table} WHERE {filter} GROUP BY grp ORDER BY grp",
        aggregate.op.sql_fn()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok(GroupRow {
            key: group_key(row.get::<_, SqlValue>(0)?),
            value: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
