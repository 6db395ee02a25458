//! Short human-presentable codes.

use uuid::Uuid;

use crate::error::RepositoryError;

/// Inserts tried, each with a fresh code, before a collision is reported.
pub(crate) const CODE_ATTEMPTS: u32 = 3;

/// Returns the first eight hex digits of a random UUID.
///
/// Must be v4: v7 ids minted in the same minute share their first eight
/// digits. Uniqueness is enforced by the store, and callers regenerate on
/// a clash (see [`collides_on`]).
pub(crate) fn short_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(8);
    code
}

/// Returns `prefix` followed by a short code, e.g. `TX-1a2b3c4d`.
pub(crate) fn prefixed_code(prefix: &str) -> String {
    format!("{prefix}-{}", short_code())
}

/// Whether `err` is a unique clash on the generated code stored in `field`.
pub(crate) fn collides_on(err: &RepositoryError, field: &str) -> bool {
    matches!(err, RepositoryError::Duplicate { field: clashed, .. } if *clashed == field)
}
