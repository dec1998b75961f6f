//! Unicode case folding for name comparison and keyword search.
//!
//! SQLite's built-in `NOCASE` collation and `lower()` fold ASCII only.
//! Every roster connection registers these replacements before the schema
//! is touched, since the schema itself names the collation.
//!
//! # Invariants
//! - `UNICASE` orders and compares names by their Unicode lowercase form.
//! - `casefold(text)` returns the Unicode lowercase form; `NULL` stays `NULL`.

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;
use std::cmp::Ordering;

/// Collation used by every name column and name lookup.
const NAME_COLLATION: &str = "UNICASE";
/// Scalar SQL function used by keyword search.
const CASEFOLD_FUNCTION: &str = "casefold";

/// Registers the `UNICASE` collation and the `casefold` function on `conn`.
pub fn register_case_folding(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_collation(NAME_COLLATION, compare_folded)?;
    conn.create_scalar_function(
        CASEFOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        casefold,
    )
}

/// Whether two names are equal under the roster's case-insensitive rule.
pub fn same_name(left: &str, right: &str) -> bool {
    compare_folded(left, right) == Ordering::Equal
}

fn compare_folded(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

fn casefold(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
    let text: Option<String> = ctx.get(0)?;
    Ok(text.map(|text| text.to_lowercase()))
}
