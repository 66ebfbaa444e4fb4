use uuid::Uuid;

use crate::{
    db::error::{DbError, DbResult},
    models::{FreezeEventType, ProjectStatus, UserStatus},
};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

pub fn parse_project_status(value: i64) -> DbResult<ProjectStatus> {
    ProjectStatus::from_i64(value)
        .ok_or_else(|| DbError::Internal(format!("Invalid project status in database: {}", value)))
}

pub fn parse_user_status(value: i64) -> DbResult<UserStatus> {
    UserStatus::from_i64(value)
        .ok_or_else(|| DbError::Internal(format!("Invalid user status in database: {}", value)))
}

pub fn parse_freeze_event_type(value: i64) -> DbResult<FreezeEventType> {
    FreezeEventType::from_i64(value)
        .ok_or_else(|| DbError::Internal(format!("Invalid freeze event type in database: {}", value)))
}

/// Convert a page size or offset to the integer type SQLite binds.
pub fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
