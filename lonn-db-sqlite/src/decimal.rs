use lonn_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row.
///
/// Amounts are written as TEXT, but INTEGER and REAL columns (rows edited by
/// hand or older files) are read as well.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            val.trim().parse::<Decimal>().map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to parse decimal '{}' in '{}': {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Textual form used for storage; keeps every digit.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                value
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn read_back(literal: &str) -> Result<Decimal, RepositoryError> {
        let pool = setup_test_db().await;
        sqlx::query(&format!(
            "INSERT INTO test_decimals (id, value) VALUES (1, {literal})"
        ))
        .execute(&pool)
        .await
        .expect("Failed to insert test data");

        let row = sqlx::query("SELECT value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        get_decimal(&row, "value")
    }

    #[tokio::test]
    async fn test_get_decimal_from_text() {
        assert_eq!(read_back("'52345.67'").await, Ok(dec!(52345.67)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        assert_eq!(read_back("12345").await, Ok(dec!(12345)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        assert_eq!(read_back("1441.5").await, Ok(dec!(1441.5)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_null_returns_zero() {
        assert_eq!(read_back("NULL").await, Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_get_decimal_from_garbage_text() {
        let result = read_back("'lots'").await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("lots")));
    }

    #[tokio::test]
    async fn test_get_decimal_column_not_found() {
        let pool = setup_test_db().await;
        let row = sqlx::query("SELECT 1 AS other")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        let result = get_decimal(&row, "value");

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("not found")));
    }

    #[test]
    fn test_decimal_to_text_strips_trailing_zeros() {
        assert_eq!(decimal_to_text(dec!(50000.00)), "50000");
        assert_eq!(decimal_to_text(dec!(0.10)), "0.1");
        assert_eq!(decimal_to_text(dec!(-12.340)), "-12.34");
    }
}
