//! SQL quoting utilities
//!
//! Provides safe quoting for identifiers and string literals when building
//! catalog and log statements dynamically.

/// Quote an identifier with standard SQL double quotes (DuckDB).
///
/// Embedded double quotes are escaped by doubling them.
///
/// # Examples
/// ```
/// use dbm_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote an identifier with MySQL backticks.
///
/// Embedded backticks are escaped by doubling them.
///
/// # Examples
/// ```
/// use dbm_core::sql_utils::quote_mysql_ident;
/// assert_eq!(quote_mysql_ident("audit_insert"), "`audit_insert`");
/// assert_eq!(quote_mysql_ident("odd`name"), "`odd``name`");
/// ```
pub fn quote_mysql_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
