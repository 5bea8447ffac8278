// Read-only listing of what is in the user database: the tables it holds
// and every row of `users`, printed as plain boxed tables.

use std::io::Write;

use anyhow::Result;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator, TableFormat};
use prettytable::{Cell, Row, Table};

use crate::store::UserStore;

/// Render `rows` under `headers` as a boxed ASCII table in the PrettyTable
/// look: `-` borders above and below the header and around the body.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.set_format(boxed_format());
    table.set_titles(Row::new(headers.iter().map(|h| Cell::new(h)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
    }
    table.to_string().trim_end().to_string()
}

fn boxed_format() -> TableFormat {
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(
            &[LinePosition::Top, LinePosition::Title, LinePosition::Bottom],
            LineSeparator::new('-', '+', '+', '+'),
        )
        .padding(1, 1)
        .build()
}

/// Print the table listing. Returns whether any table exists; listing
/// errors are printed and reported as `false`.
pub fn list_tables<W: Write>(store: &UserStore, out: &mut W) -> Result<bool> {
    match store.list_tables() {
        Ok(tables) if tables.is_empty() => {
            writeln!(out, "[+] No tables in the database.")?;
            Ok(false)
        }
        Ok(tables) => {
            let rows: Vec<Vec<String>> = tables.into_iter().map(|t| vec![t]).collect();
            writeln!(out, "{}", render_table(&["Tables in Database"], &rows))?;
            Ok(true)
        }
        Err(err) => {
            writeln!(out, "{err}")?;
            Ok(false)
        }
    }
}

/// Print every row of `users`.
pub fn list_users<W: Write>(store: &UserStore, out: &mut W) -> Result<()> {
    match store.list_users() {
        Ok(users) => {
            let rows: Vec<Vec<String>> = users
                .into_iter()
                .map(|u| vec![u.id.to_string(), u.username])
                .collect();
            writeln!(out, "{}", render_table(&["ID", "Username"], &rows))?;
        }
        Err(err) => writeln!(out, "{err}")?,
    }
    Ok(())
}

/// The whole diagnostic: the sqlite version banner, the tables, and the
/// users when there is anything to show.
pub fn run<W: Write>(store: &UserStore, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "[-] this app uses sqlite version {}",
        rusqlite::version()
    )?;
    if list_tables(store, out)? {
        list_users(store, out)?;
    }
    Ok(())
}
