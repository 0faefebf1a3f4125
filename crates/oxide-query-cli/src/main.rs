//! oxide-query CLI
//!
//! Command-line tool for checking filters and statements before they reach
//! a driver.

use std::io::{self, Read};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_query::{
    compile_filter, count_statement, format_sql, Column, NamedParameterRewriter, OrderedRecord,
    Page, Placeholder, SqlValue, StatementBuilder,
};

/// Filter compiler, parameter rewriter and SQL formatter.
#[derive(Parser)]
#[command(name = "oxide-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Positional marker style: dollar ($1), numbered (?1) or question (?).
    #[arg(short, long, global = true, env = "OXIDE_QUERY_STYLE", default_value = "dollar")]
    style: Placeholder,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter expression such as `{age:gt:18|AND|name:sw:jo}`.
    Filter {
        /// The filter, braces included.
        filter: String,
    },

    /// Rewrite `:name` placeholders into positional markers.
    Rewrite {
        /// SQL with named placeholders.
        sql: String,

        /// An argument as `name=value` (repeatable). Numbers, booleans and
        /// `null` are typed; everything else binds as text.
        #[arg(short, long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
    },

    /// Pretty-print SQL for reading.
    Format {
        /// SQL to format (read from stdin when omitted).
        sql: Option<String>,
    },

    /// Build a SELECT over one table.
    Select {
        /// Table to select from.
        #[arg(short, long)]
        table: String,

        /// Comma-separated columns (all if not specified).
        #[arg(short, long)]
        columns: Option<String>,

        /// Filter expression for the WHERE clause.
        #[arg(short, long)]
        filter: Option<String>,

        /// 1-based page number; adds LIMIT/OFFSET and a COUNT statement.
        #[arg(short, long)]
        page: Option<u32>,

        /// Rows per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
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

    let rewriter = NamedParameterRewriter::new(cli.style);
    debug!(style = %cli.style, "marker style selected");

    match cli.command {
        Commands::Filter { filter } => {
            let compiled = compile_filter(&filter)?;
            let output = json!({
                "predicate": compiled.predicate,
                "arguments": compiled.arguments,
                "columns": compiled.columns,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Rewrite { sql, args } => {
            let arguments = args
                .iter()
                .map(|raw| parse_argument(raw))
                .collect::<anyhow::Result<OrderedRecord>>()?;
            let (sql, values) = rewriter.rewrite(&sql, &arguments).check()?;
            let output = json!({ "sql": sql, "values": values });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Format { sql } => {
            let sql = match sql {
                Some(sql) => sql,
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read SQL from stdin")?;
                    buffer
                }
            };
            println!("{}", format_sql(sql.trim()));
        }

        Commands::Select {
            table,
            columns,
            filter,
            page,
            page_size,
        } => {
            let page = page.map(|n| Page::new(n, page_size)).transpose()?;
            let output = select(rewriter, &table, columns.as_deref(), filter.as_deref(), page)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Builds a SELECT and, when paging, its COUNT companion.
fn select(
    rewriter: NamedParameterRewriter,
    table: &str,
    columns: Option<&str>,
    filter: Option<&str>,
    page: Option<Page>,
) -> anyhow::Result<serde_json::Value> {
    let mut builder = StatementBuilder::new().select();
    builder = match columns {
        Some(list) => builder.select_columns(
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(Column::new),
        ),
        None => builder.raw("*"),
    };
    builder = builder.from_table(table);
    if let Some(filter) = filter {
        builder = builder.where_filter(filter);
    }

    let mut arguments = OrderedRecord::new();
    if let Some(page) = page {
        builder = builder.limit();
        page.bind(&mut arguments);
    }

    let (sql, values) = builder.prepare_with(&rewriter, &arguments)?;
    let mut output = json!({ "sql": sql, "values": values });
    if page.is_some() {
        let count = count_statement(&builder)?;
        let (sql, values) = rewriter.rewrite(&count, builder.arguments()).check()?;
        output["count"] = json!({ "sql": sql, "values": values });
    }
    Ok(output)
}

/// Parses `name=value` into a `:name` key and a typed value.
fn parse_argument(raw: &str) -> anyhow::Result<(String, SqlValue)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("argument '{raw}' must look like name=value");
    };
    let name = name.trim();
    if name.trim_start_matches(':').is_empty() {
        bail!("argument '{raw}' has an empty name");
    }
    let key = if name.starts_with(':') {
        name.to_owned()
    } else {
        format!(":{name}")
    };
    Ok((key, infer_value(value)))
}

fn infer_value(raw: &str) -> SqlValue {
    if raw.eq_ignore_ascii_case("null") {
        return SqlValue::Null;
    }
    if let Ok(b) = raw.parse::<bool>() {
        return SqlValue::Bool(b);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return SqlValue::Int(n);
    }
    match raw.parse::<f64>() {
        Ok(x) if x.is_finite() => SqlValue::Float(x),
        _ => SqlValue::Text(raw.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argument_adds_colon() {
        assert_eq!(
            parse_argument("id=7").unwrap(),
            (String::from(":id"), SqlValue::Int(7))
        );
        assert_eq!(
            parse_argument(":name=o'brien").unwrap(),
            (String::from(":name"), SqlValue::Text(String::from("o'brien")))
        );
    }

    #[test]
    fn test_parse_argument_rejects_bad_input() {
        assert!(parse_argument("no-equals").is_err());
        assert!(parse_argument(":=1").is_err());
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("NULL"), SqlValue::Null);
        assert_eq!(infer_value("true"), SqlValue::Bool(true));
        assert_eq!(infer_value("2.5"), SqlValue::Float(2.5));
        assert_eq!(infer_value("inf"), SqlValue::Text(String::from("inf")));
        assert_eq!(infer_value("a=b"), SqlValue::Text(String::from("a=b")));
    }

    #[test]
    fn test_select_with_paging() {
        let rewriter = NamedParameterRewriter::new(Placeholder::QuestionNumbered);
        let page = Page::new(2, 10).ok();
        let output = select(rewriter, "users", Some("id, name"), Some("{age:gt:18}"), page).unwrap();
        assert_eq!(
            output["sql"],
            "SELECT id, name FROM users WHERE (age > ?1 ) LIMIT ?2 OFFSET ?3"
        );
        assert_eq!(output["values"], json!(["18", 10, 10]));
        assert_eq!(
            output["count"]["sql"],
            "SELECT COUNT(*) AS count FROM users WHERE (age > ?1 )"
        );
    }

    #[test]
    fn test_select_reports_bad_filter() {
        let rewriter = NamedParameterRewriter::default();
        assert!(select(rewriter, "users", None, Some("{age:gt}"), None).is_err());
    }

    #[test]
    fn test_cli_parses_select() {
        let cli = Cli::try_parse_from([
            "oxide-query",
            "--style",
            "numbered",
            "select",
            "--table",
            "users",
            "--filter",
            "{age:gt:18}",
            "--page",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.style, Placeholder::QuestionNumbered);
        assert!(matches!(
            cli.command,
            Commands::Select { page: Some(2), page_size: 20, .. }
        ));
    }
}
