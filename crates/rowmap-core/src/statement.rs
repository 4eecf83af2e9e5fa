//! SQL statement text builders.
//!
//! Every builder returns a fresh `String`; nothing is cached or
//! parameterized. Values arrive as pre-rendered literals (see
//! [`crate::mapper::stringify`] and [`crate::mapper::literals`]).
//!
//! # Trusted fragments
//!
//! Table names, column names, `criteria` and `tail` clauses are copied into
//! the statement verbatim. They are meant for caller-written SQL such as
//! `"WHERE pages > 100 ORDER BY name"` and must never carry unchecked user
//! input: a quote or `;` in them rewrites the statement.

use crate::error::{Error, Result};
use crate::schema::{Entity, describe_columns};

/// Builds `CREATE TABLE [IF NOT EXISTS] name(def1,def2,...)`.
///
/// # Errors
///
/// Returns [`Error::EmptyColumns`] when `defs` is empty.
pub fn create_table<S: AsRef<str>>(name: &str, defs: &[S], if_not_exists: bool) -> Result<String> {
    if defs.is_empty() {
        return Err(Error::EmptyColumns {
            table: String::from(name),
        });
    }

    let mut sql = String::from("CREATE TABLE ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(name);
    sql.push('(');
    sql.push_str(&join(defs, ","));
    sql.push(')');
    Ok(sql)
}

/// Builds `CREATE TABLE` for `T`, one `"<field> <kind> <constraint>"`
/// definition per tagged field.
///
/// # Errors
///
/// Returns [`Error::EmptyColumns`] when `T` has no tagged fields.
pub fn create_table_for<T: Entity>(name: &str, if_not_exists: bool) -> Result<String> {
    let defs: Vec<String> = describe_columns::<T>()
        .iter()
        .map(|c| c.definition())
        .collect();
    create_table(name, &defs, if_not_exists)
}

/// Builds `SELECT * FROM table tail`.
///
/// `tail` is a trusted fragment (`WHERE`, `ORDER BY`, `LIMIT`, ...).
#[must_use]
pub fn select(table: &str, tail: &str) -> String {
    select_columns::<&str>(&[], table, tail)
}

/// Builds `SELECT c1, c2 FROM table tail`; an empty column list selects `*`.
#[must_use]
pub fn select_columns<S: AsRef<str>>(columns: &[S], table: &str, tail: &str) -> String {
    let mut sql = String::from("SELECT ");
    if columns.is_empty() {
        sql.push('*');
    } else {
        sql.push_str(&join(columns, ", "));
    }
    sql.push_str(" FROM ");
    sql.push_str(table);
    push_tail(&mut sql, tail);
    sql
}

/// Builds `INSERT INTO table [(c1, c2)] VALUES(v1, v2)`.
///
/// The column clause is omitted when `columns` is empty, in which case the
/// values must cover every table column in table order.
///
/// # Errors
///
/// Returns [`Error::EmptyValues`] when `values` is empty and
/// [`Error::ArityMismatch`] when a non-empty column list differs in length.
pub fn insert<C, V>(table: &str, columns: &[C], values: &[V]) -> Result<String>
where
    C: AsRef<str>,
    V: AsRef<str>,
{
    if values.is_empty() {
        return Err(Error::EmptyValues {
            table: String::from(table),
        });
    }
    if !columns.is_empty() && columns.len() != values.len() {
        return Err(Error::ArityMismatch {
            table: String::from(table),
            columns: columns.len(),
            values: values.len(),
        });
    }

    let mut sql = String::from("INSERT INTO ");
    sql.push_str(table);
    sql.push(' ');
    if !columns.is_empty() {
        sql.push('(');
        sql.push_str(&join(columns, ", "));
        sql.push_str(") ");
    }
    sql.push_str("VALUES(");
    sql.push_str(&join(values, ", "));
    sql.push(')');
    Ok(sql)
}

/// Builds `UPDATE table SET c1=v1, c2=v2 [WHERE criteria]`.
///
/// `criteria` is a trusted fragment; `None` or blank text updates every row.
///
/// # Errors
///
/// Returns [`Error::EmptyValues`] for an empty assignment list and
/// [`Error::ArityMismatch`] when the lists differ in length.
pub fn update<C, V>(table: &str, columns: &[C], values: &[V], criteria: Option<&str>) -> Result<String>
where
    C: AsRef<str>,
    V: AsRef<str>,
{
    if columns.len() != values.len() {
        return Err(Error::ArityMismatch {
            table: String::from(table),
            columns: columns.len(),
            values: values.len(),
        });
    }
    if columns.is_empty() {
        return Err(Error::EmptyValues {
            table: String::from(table),
        });
    }

    let assignments: Vec<String> = columns
        .iter()
        .zip(values)
        .map(|(c, v)| format!("{}={}", c.as_ref(), v.as_ref()))
        .collect();

    let mut sql = String::from("UPDATE ");
    sql.push_str(table);
    sql.push_str(" SET ");
    sql.push_str(&assignments.join(", "));
    push_where(&mut sql, criteria);
    Ok(sql)
}

/// Builds `DELETE FROM table [WHERE criteria]`.
///
/// **Warning**: `None` or blank criteria deletes every row.
#[must_use]
pub fn delete(table: &str, criteria: Option<&str>) -> String {
    let mut sql = String::from("DELETE FROM ");
    sql.push_str(table);
    push_where(&mut sql, criteria);
    sql
}

fn join<S: AsRef<str>>(parts: &[S], sep: &str) -> String {
    parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(sep)
}

fn push_where(sql: &mut String, criteria: Option<&str>) {
    if let Some(criteria) = criteria.map(str::trim).filter(|c| !c.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(criteria);
    }
}

fn push_tail(sql: &mut String, tail: &str) {
    let tail = tail.trim();
    if !tail.is_empty() {
        sql.push(' ');
        sql.push_str(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table() {
        let sql = create_table("testing", &["id int primary key", "name varchar(255)"], false).unwrap();
        assert_eq!(sql, "CREATE TABLE testing(id int primary key,name varchar(255))");
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let sql = create_table("t", &["id integer"], true).unwrap();
        assert_eq!(sql, "CREATE TABLE IF NOT EXISTS t(id integer)");
    }

    #[test]
    fn test_create_table_rejects_empty_columns() {
        let err = create_table::<&str>("t", &[], true).unwrap_err();
        assert!(matches!(err, Error::EmptyColumns { ref table } if table == "t"));
    }

    #[test]
    fn test_select_without_tail() {
        assert_eq!(select("books", ""), "SELECT * FROM books");
        assert_eq!(select("books", "   "), "SELECT * FROM books");
    }

    #[test]
    fn test_select_with_tail() {
        assert_eq!(
            select("books", "WHERE pages > 10 ORDER BY name LIMIT 5"),
            "SELECT * FROM books WHERE pages > 10 ORDER BY name LIMIT 5"
        );
    }

    #[test]
    fn test_select_columns() {
        assert_eq!(
            select_columns(&["isbn", "name"], "books", "ORDER BY isbn"),
            "SELECT isbn, name FROM books ORDER BY isbn"
        );
    }

    #[test]
    fn test_insert_with_columns() {
        let sql = insert("books", &["isbn", "name"], &["'0-1'", "'Go'"]).unwrap();
        assert_eq!(sql, "INSERT INTO books (isbn, name) VALUES('0-1', 'Go')");
    }

    #[test]
    fn test_insert_without_columns() {
        let sql = insert::<&str, &str>("books", &[], &["'0-1'", "'Go'"]).unwrap();
        assert_eq!(sql, "INSERT INTO books VALUES('0-1', 'Go')");
    }

    #[test]
    fn test_insert_arity_mismatch() {
        let err = insert("books", &["isbn", "name"], &["'0-1'"]).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { columns: 2, values: 1, .. }));
    }

    #[test]
    fn test_insert_rejects_empty_values() {
        let err = insert::<&str, &str>("books", &[], &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyValues { .. }));
    }

    #[test]
    fn test_update_with_criteria() {
        let sql = update("books", &["name", "pages"], &["'Go'", "300"], Some("isbn='0-1'")).unwrap();
        assert_eq!(sql, "UPDATE books SET name='Go', pages=300 WHERE isbn='0-1'");
    }

    #[test]
    fn test_update_blank_criteria_updates_all() {
        let none = update("books", &["name"], &["'x'"], None).unwrap();
        let blank = update("books", &["name"], &["'x'"], Some("  ")).unwrap();
        assert_eq!(none, "UPDATE books SET name='x'");
        assert_eq!(blank, none);
    }

    #[test]
    fn test_update_rejects_empty_assignments() {
        let err = update::<&str, &str>("books", &[], &[], None).unwrap_err();
        assert!(matches!(err, Error::EmptyValues { .. }));
    }

    #[test]
    fn test_delete_blank_criteria() {
        assert_eq!(delete("t", None), "DELETE FROM t");
        assert_eq!(delete("t", Some("")), "DELETE FROM t");
    }

    #[test]
    fn test_delete_with_criteria() {
        assert_eq!(delete("t", Some("id=5")), "DELETE FROM t WHERE id=5");
    }

    #[test]
    fn test_criteria_is_copied_verbatim() {
        // Trusted fragment: nothing is escaped.
        let sql = delete("t", Some("name like 'bachir'"));
        assert_eq!(sql, "DELETE FROM t WHERE name like 'bachir'");
    }
}
