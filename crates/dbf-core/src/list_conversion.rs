//! Helpers for reshaping driver results into plain lists.

/// Flatten a sequence of fixed-width rows into one flat list, in row order.
///
/// Used to turn `SHOW DATABASES`-style results (one value per row) into a
/// list that can be checked for membership.
///
/// # Examples
/// ```
/// use dbf_core::flatten_rows;
/// let rows = vec![vec!["mysql"], vec!["sales"], vec!["sys"]];
/// assert_eq!(flatten_rows(rows), vec!["mysql", "sales", "sys"]);
/// ```
pub fn flatten_rows<I, R, T>(rows: I) -> Vec<T>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
{
    rows.into_iter().flatten().collect()
}
