use crate::error::AppError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint names follow the Postgres defaults produced by the content
/// migrations: `<table>_<column>_key` for unique, `<table>_<column>_fkey`
/// for foreign keys and `<table>_<column>_check` for checks.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let table = info.table_name();
        let column = info.column_name();
        let parsed = info
            .constraint_name()
            .and_then(|name| Self::split_constraint(name, table));

        match (kind, parsed) {
            (DatabaseErrorKind::UniqueViolation, Some((entity, field))) => AppError::Duplicate {
                value: Self::detail_value(info.details()).unwrap_or_else(|| "unknown".to_string()),
                entity,
                field,
            },
            (DatabaseErrorKind::ForeignKeyViolation, Some((entity, field))) => {
                AppError::Validation {
                    field,
                    reason: format!("Invalid reference from {}", entity),
                }
            }
            (DatabaseErrorKind::CheckViolation, Some((entity, field))) => AppError::Validation {
                field,
                reason: format!("Check constraint failed for {}", entity),
            },
            (DatabaseErrorKind::NotNullViolation, _) => AppError::Validation {
                field: column.unwrap_or("unknown").to_string(),
                reason: format!("Field is required for {}", table.unwrap_or("resource")),
            },
            (kind, _) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{:?}: {}", kind, message)),
            },
        }
    }

    /// Splits `<table>_<column>_<suffix>` into `(table, column)`.
    fn split_constraint(name: &str, table: Option<&str>) -> Option<(String, String)> {
        let stem = ["_key", "_fkey", "_check"]
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))?;

        if let Some(table) = table
            && let Some(column) = stem.strip_prefix(table).and_then(|s| s.strip_prefix('_'))
        {
            return Some((table.to_string(), column.to_string()));
        }

        let (entity, field) = stem.split_once('_')?;
        Some((entity.to_string(), field.to_string()))
    }

    /// Extracts the value from a Postgres detail such as
    /// `Key (short_description)=(Adobe PDF) already exists.`
    fn detail_value(details: Option<&str>) -> Option<String> {
        let details = details?;
        let start = details.find(")=(")? + 3;
        let end = details[start..].find(')')? + start;
        Some(details[start..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockInfo {
        message: String,
        details: Option<String>,
        table: Option<String>,
        column: Option<String>,
        constraint: Option<String>,
    }

    impl DatabaseErrorInformation for MockInfo {
        fn message(&self) -> &str {
            &self.message
        }
        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            self.table.as_deref()
        }
        fn column_name(&self) -> Option<&str> {
            self.column.as_deref()
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint.as_deref()
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn error(kind: DatabaseErrorKind, info: MockInfo) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[test]
    fn test_unique_violation_becomes_duplicate() {
        let err = error(
            DatabaseErrorKind::UniqueViolation,
            MockInfo {
                message: "duplicate key value violates unique constraint".into(),
                details: Some("Key (short_description)=(Adobe PDF) already exists.".into()),
                table: Some("bitstream_formats".into()),
                column: None,
                constraint: Some("bitstream_formats_short_description_key".into()),
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(err, "insert format") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "bitstream_formats");
                assert_eq!(field, "short_description");
                assert_eq!(value, "Adobe PDF");
            }
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_violation_without_table() {
        let err = error(
            DatabaseErrorKind::ForeignKeyViolation,
            MockInfo {
                message: "insert or update violates foreign key constraint".into(),
                details: None,
                table: None,
                column: None,
                constraint: Some("bundles_item_fkey".into()),
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(err, "insert bundle") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "item");
                assert!(reason.contains("bundles"));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_not_null_uses_column() {
        let err = error(
            DatabaseErrorKind::NotNullViolation,
            MockInfo {
                message: "null value in column".into(),
                details: None,
                table: Some("items".into()),
                column: Some("title".into()),
                constraint: None,
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(err, "insert item") {
            AppError::Validation { field, .. } => assert_eq!(field, "title"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsed_constraint_falls_back_to_database() {
        let err = error(
            DatabaseErrorKind::UniqueViolation,
            MockInfo {
                message: "duplicate".into(),
                details: None,
                table: None,
                column: None,
                constraint: Some("weird".into()),
            },
        );

        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(err, "op"),
            AppError::Database { .. }
        ));
    }

    #[test]
    fn test_not_found() {
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "op"),
            AppError::NotFound { .. }
        ));
    }
}
