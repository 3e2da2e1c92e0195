//! Classification of database errors.

/// Constraint names that guard short code uniqueness on `links`.
const CODE_CONSTRAINTS: &[&str] = &["links_pkey", "links_code_key"];

/// Returns true if `e` is a unique violation on the `links.code` column.
///
/// This is the authoritative conflict signal for link creation: the existence
/// pre-check in the service is advisory and can race with concurrent inserts.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err
        .constraint()
        .is_some_and(|name| CODE_CONSTRAINTS.contains(&name))
}
