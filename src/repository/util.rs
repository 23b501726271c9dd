//! Repository utilities.

use diesel::result::DatabaseErrorInformation;

/// Simple error info wrapper for database errors.
#[derive(Debug)]
pub struct DbErrorInfo(pub String);

impl DatabaseErrorInformation for DbErrorInfo {
    fn message(&self) -> &str {
        &self.0
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        None
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Convert any displayable error to a diesel error with proper message.
pub fn to_diesel_error(e: impl std::fmt::Display) -> diesel::result::Error {
    diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::Unknown,
        Box::new(DbErrorInfo(e.to_string())),
    )
}

/// Convert a character offset to the `INTEGER` column type.
pub fn offset_to_db(offset: usize) -> Result<i32, diesel::result::Error> {
    i32::try_from(offset).map_err(|_| to_diesel_error(format!("offset {} out of range", offset)))
}

/// Convert a stored offset back, treating negative values as corrupt rows.
pub fn offset_from_db(offset: i32) -> Result<usize, diesel::result::Error> {
    usize::try_from(offset).map_err(|_| to_diesel_error(format!("negative offset {}", offset)))
}
