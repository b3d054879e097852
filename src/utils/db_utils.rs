use chrono::NaiveDate;
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::AppError;

/// SQL bindable value
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Date(NaiveDate),
    Null,
}

/// A ready-to-run `UPDATE` with its bind values in placeholder order.
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds `UPDATE <table> SET a = ?, b = ? WHERE <id_column> = ?` from a JSON
/// object. Only keys listed in `allowed` are accepted, so callers never splice
/// client-chosen identifiers into SQL.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, AppError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::validation("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(AppError::validation(format!(
            "Field '{unknown}' cannot be updated"
        )));
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    for (column, value) in obj {
        match value {
            Value::String(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => values.push(SqlValue::Date(d)),
                Err(_) => values.push(SqlValue::String(s.clone())),
            },
            Value::Number(n) => match n.as_i64() {
                Some(i) => values.push(SqlValue::I64(i)),
                None => {
                    return Err(AppError::validation(format!(
                        "Field '{column}' must be a whole number"
                    )));
                }
            },
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(AppError::validation(format!(
                    "Unsupported value for field '{column}'"
                )));
            }
        }
    }

    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// Runs the update and returns the affected row count.
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["email", "role_id", "date_of_joining", "pan_no"];

    #[test]
    fn builds_single_column_update() {
        let payload = json!({ "date_of_joining": "2024-01-15" });

        let update = build_update_sql("users", &payload, ALLOWED, "id", 7).unwrap();
        assert_eq!(update.sql, "UPDATE users SET date_of_joining = ? WHERE id = ?");
        assert_eq!(
            update.values,
            vec![
                SqlValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                SqlValue::I64(7),
            ]
        );
    }

    #[test]
    fn binds_one_value_per_column_plus_id() {
        let payload = json!({
            "email": "jane@corp.com",
            "role_id": 1,
            "pan_no": null
        });

        let update = build_update_sql("users", &payload, ALLOWED, "id", 7).unwrap();
        assert_eq!(update.sql.matches("= ?").count(), 4);
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 4);
        assert!(update.values.contains(&SqlValue::String("jane@corp.com".into())));
        assert!(update.values.contains(&SqlValue::Null));
        assert_eq!(update.values.last(), Some(&SqlValue::I64(7)));
    }

    #[test]
    fn rejects_fields_outside_the_whitelist() {
        let payload = json!({ "password": "plain" });
        let err = build_update_sql("users", &payload, ALLOWED, "id", 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("password")));
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_update_sql("users", &json!({}), ALLOWED, "id", 1).is_err());
        assert!(build_update_sql("users", &json!([1, 2]), ALLOWED, "id", 1).is_err());
        assert!(build_update_sql("users", &json!({"role_id": 1.5}), ALLOWED, "id", 1).is_err());
    }
}
