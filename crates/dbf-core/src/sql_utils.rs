//! MySQL identifier and literal quoting utilities

/// Quote a MySQL identifier with backticks.
///
/// Embedded backticks are escaped by doubling them.
///
/// # Examples
/// ```
/// use dbf_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), "`users`");
/// assert_eq!(quote_ident("my`table"), "`my``table`");
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote a list of identifiers and join them with commas.
pub fn quote_ident_list<S: AsRef<str>>(idents: &[S]) -> String {
    idents
        .iter()
        .map(|i| quote_ident(i.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape a string for use inside a single-quoted MySQL string literal.
///
/// MySQL treats backslash as an escape character by default, so it is
/// escaped along with quotes and control characters.
pub fn escape_sql_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out
}
