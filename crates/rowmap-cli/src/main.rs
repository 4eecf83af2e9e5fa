//! rowmap CLI
//!
//! Lists tables and runs ad-hoc statements against a SQLite database.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use rowmap_session::{Backend, Session, Sqlite, format_cursor, print_table};

/// Inspect tables through a rowmap session.
#[derive(Parser)]
#[command(name = "rowmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file, or `:memory:`. A leading `sqlite:` is accepted.
    #[arg(short, long, env = "DATABASE_URL", default_value = "db.sqlite3")]
    database: String,

    /// User name passed to the driver.
    #[arg(short, long, env = "DATABASE_USER", default_value = "")]
    user: String,

    /// Password passed to the driver.
    #[arg(short, long, env = "DATABASE_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rows of a table.
    Show {
        /// Table name.
        table: String,

        /// Columns to list, comma separated (all if not specified).
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Text appended to the SELECT, e.g. "WHERE id > 3 ORDER BY id".
        #[arg(short, long, default_value = "")]
        tail: String,
    },

    /// Run one SQL statement; queries print their rows.
    Exec {
        /// Statement text.
        sql: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let target = connection_target(&cli.database);
    let mut session = Session::new();
    session.connect_with(target, &cli.user, &cli.password).await?;

    match cli.command {
        Commands::Show {
            table,
            columns,
            tail,
        } => {
            print_table(&mut session, &table, &columns, &tail, &mut io::stdout()).await?;
        }

        Commands::Exec { sql } => {
            if is_query(&sql) {
                let cursor = session.execute_query(&sql).await?;
                io::stdout().lock().write_all(format_cursor(&cursor).as_bytes())?;
                info!(rows = cursor.len(), "Query finished");
            } else {
                let affected = session.execute_update(&sql).await?;
                info!(rows = affected, "Statement executed");
            }
        }
    }

    session.close().await?;
    Ok(())
}

/// Strips the SQLite URL prefix so `DATABASE_URL=sqlite:app.db` works too.
fn connection_target(database: &str) -> &str {
    database
        .strip_prefix(Sqlite.url_prefix())
        .unwrap_or(database)
}

/// Whether `sql` produces rows, judged by its leading keyword.
fn is_query(sql: &str) -> bool {
    let keyword = sql
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        keyword.as_str(),
        "select" | "with" | "values" | "pragma" | "explain"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_target_strips_prefix() {
        assert_eq!(connection_target("sqlite:app.db"), "app.db");
        assert_eq!(connection_target("app.db"), "app.db");
        assert_eq!(connection_target(":memory:"), ":memory:");
    }

    #[test]
    fn test_is_query() {
        assert!(is_query("SELECT * FROM books"));
        assert!(is_query("  with t AS (SELECT 1) SELECT * FROM t"));
        assert!(!is_query("INSERT INTO books VALUES('0-1', 'Go')"));
        assert!(!is_query(""));
    }

    #[test]
    fn test_cli_parses_show() {
        let cli = Cli::parse_from([
            "rowmap",
            "--database",
            "books.db",
            "show",
            "books",
            "--columns",
            "isbn,name",
            "--tail",
            "ORDER BY isbn",
        ]);
        assert_eq!(cli.database, "books.db");
        match cli.command {
            Commands::Show {
                table,
                columns,
                tail,
            } => {
                assert_eq!(table, "books");
                assert_eq!(columns, vec!["isbn", "name"]);
                assert_eq!(tail, "ORDER BY isbn");
            }
            Commands::Exec { .. } => panic!("expected show"),
        }
    }
}
