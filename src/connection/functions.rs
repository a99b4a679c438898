//! SQL functions registered on every session

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Name of the case-insensitive substring function
pub const ICONTAINS: &str = "icontains";

/// Register `icontains(haystack, needle)`.
///
/// True when `needle` occurs in `haystack` ignoring case (full Unicode
/// lowercase, so `débito` matches `DÉBITO`). NULL on either side is false.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        ICONTAINS,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        icontains,
    )
}

fn icontains(ctx: &Context<'_>) -> rusqlite::Result<bool> {
    let haystack = match as_text(ctx.get_raw(0)) {
        Some(text) => text,
        None => return Ok(false),
    };
    let needle = match as_text(ctx.get_raw(1)) {
        Some(text) => text,
        None => return Ok(false),
    };
    Ok(contains_ignore_case(&haystack, &needle))
}

fn as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Case-insensitive substring test shared with in-memory filtering.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
