//! `strata` — command-line front end for the Strata record store.
//!
//! # Usage
//!
//! ```
//! strata create-table people --cols "name:text, email:text"
//! strata insert people --values "name='Ada', email='ada@example.com'"
//! strata select people --where "active = true" --order "name ASC"
//! strata show-history people 1
//! ```
//!
//! Every write appends a version record; nothing is ever rewritten. Output
//! is JSON by default; `--output table` renders a bordered table.

mod parse;
mod render;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use strata_core::{
  record::NewVersion,
  schema::Schema,
  store::{Projection, RecordStore as _, SelectQuery},
};
use strata_store_ndjson::NdjsonStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use parse::{
  parse_column_defs, parse_order, parse_projection, parse_values, parse_where,
};
use render::{display_value, render_table, rows_from_fields};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
  name = "strata",
  about = "Append-only, multi-version record store with a small SQL-like surface"
)]
struct Cli {
  /// Directory holding table files.
  #[arg(long, default_value = "data")]
  data_dir: PathBuf,

  /// Output format.
  #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
  output: OutputFormat,

  /// Indent JSON output.
  #[arg(long)]
  pretty: bool,

  /// ASCII table borders instead of box-drawing characters.
  #[arg(long)]
  ascii: bool,

  /// Maximum rendered column width in table output.
  #[arg(long, default_value_t = 48)]
  max_col_width: usize,

  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
  Json,
  Table,
}

#[derive(Subcommand)]
enum Command {
  /// Create a table (system columns id, timestamp, user, active are added
  /// automatically).
  CreateTable {
    table: String,
    /// Column definitions, e.g. "name:text, age:int".
    #[arg(long)]
    cols:  String,
  },

  /// List tables.
  ListTables,

  /// Show a table's schema.
  ShowSchema { table: String },

  /// Append a row version. With an explicit id in --values this writes a
  /// new version of that identity; otherwise the id is auto-assigned.
  Insert {
    table:  String,
    /// Field values, e.g. "name='Ada', email='ada@example.com'".
    #[arg(long)]
    values: String,
    /// Override the recorded user for this write.
    #[arg(long)]
    user:   Option<String>,
  },

  /// Soft-delete: append a version with active=false.
  Deactivate {
    table: String,
    id:    i64,
    /// Override the recorded user for this write.
    #[arg(long)]
    user:  Option<String>,
  },

  /// Query the latest state per identity (or every version with --history).
  Select {
    table:   String,
    /// Projected columns, e.g. "id,name", or "*".
    #[arg(long, default_value = "*")]
    cols:    String,
    /// Filter, e.g. "active = true AND age >= 18".
    #[arg(long)]
    r#where: Option<String>,
    /// Sort keys, e.g. "name ASC, timestamp DESC".
    #[arg(long)]
    order:   Option<String>,
    /// Return every historical snapshot instead of current state.
    #[arg(long)]
    history: bool,
  },

  /// Show the cumulative version history of one identity.
  ShowHistory { table: String, id: i64 },

  /// Build an exact-match index on a column.
  CreateIndex { table: String, column: String },

  /// Drop an index.
  DropIndex { table: String, column: String },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() {
  // Diagnostics go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  if let Err(err) = run(cli) {
    eprintln!("{}", serde_json::json!({ "ok": false, "error": format!("{err:#}") }));
    std::process::exit(1);
  }
}

/// Rendering options shared by every subcommand.
struct Output {
  format:        OutputFormat,
  pretty:        bool,
  ascii:         bool,
  max_col_width: usize,
}

impl Output {
  fn json(&self, value: &serde_json::Value) {
    if self.pretty {
      println!("{value:#}");
    } else {
      println!("{value}");
    }
  }

  fn table(&self, headers: &[String], rows: &[Vec<String>]) {
    let term_width = crossterm::terminal::size()
      .ok()
      .map(|(w, _)| w as usize);
    println!(
      "{}",
      render_table(headers, rows, self.max_col_width, self.ascii, term_width)
    );
  }
}

fn run(cli: Cli) -> Result<()> {
  let store = NdjsonStore::open(&cli.data_dir).with_context(|| {
    format!("opening data directory {}", cli.data_dir.display())
  })?;
  let out = Output {
    format:        cli.output,
    pretty:        cli.pretty,
    ascii:         cli.ascii,
    max_col_width: cli.max_col_width,
  };

  match cli.command {
    Command::CreateTable { table, cols } => {
      let columns = parse_column_defs(&cols)?;
      store.create_table(&table, columns)?;
      out.json(&serde_json::json!({ "ok": true, "table": table }));
    }

    Command::ListTables => {
      let tables = store.list_tables()?;
      match out.format {
        OutputFormat::Json => out.json(&serde_json::json!(tables)),
        OutputFormat::Table => {
          let rows: Vec<Vec<String>> =
            tables.into_iter().map(|t| vec![t]).collect();
          out.table(&["table".to_owned()], &rows);
        }
      }
    }

    Command::ShowSchema { table } => {
      let schema = store.schema(&table)?;
      match out.format {
        OutputFormat::Json => out.json(&serde_json::to_value(&schema)?),
        OutputFormat::Table => {
          let rows: Vec<Vec<String>> = schema
            .columns()
            .iter()
            .map(|c| vec![c.name.clone(), c.ty.to_string()])
            .collect();
          out.table(&["column".to_owned(), "type".to_owned()], &rows);
        }
      }
    }

    Command::Insert { table, values, user } => {
      let fields = parse_values(&values)?;
      let record =
        store.append(&table, NewVersion::new(fields, resolve_actor(user)))?;
      out.json(&serde_json::json!({
        "ok": true,
        "inserted": serde_json::to_value(&record)?,
      }));
    }

    Command::Deactivate { table, id, user } => {
      let record = store.deactivate(&table, id, &resolve_actor(user))?;
      out.json(&serde_json::json!({
        "ok": true,
        "deactivated": serde_json::to_value(&record)?,
      }));
    }

    Command::Select { table, cols, r#where, order, history } => {
      let schema = store.schema(&table)?;
      let projection = parse_projection(&cols);
      let predicate = r#where.as_deref().map(parse_where).transpose()?;
      let order = order
        .as_deref()
        .map(|o| parse_order(o, &schema))
        .transpose()?
        .unwrap_or_default();

      let rows = store.select(&table, &SelectQuery {
        projection: projection.clone(),
        predicate,
        order,
        history,
      })?;

      match out.format {
        OutputFormat::Json => out.json(&serde_json::to_value(&rows)?),
        OutputFormat::Table => {
          let headers = projected_headers(&projection, &schema);
          let cells =
            rows_from_fields(&headers, rows.iter().map(|r| &r.fields));
          out.table(&headers, &cells);
        }
      }
    }

    Command::ShowHistory { table, id } => {
      let history = store.history(&table, id)?;
      match out.format {
        OutputFormat::Json => out.json(&serde_json::to_value(&history)?),
        OutputFormat::Table => {
          let schema = store.schema(&table)?;
          let mut headers = vec!["line".to_owned()];
          headers.extend(schema.column_names().map(str::to_owned));
          let cells: Vec<Vec<String>> = history
            .iter()
            .map(|snapshot| {
              let mut row = vec![snapshot.position.to_string()];
              row.extend(
                schema
                  .column_names()
                  .map(|c| display_value(snapshot.record.get(c))),
              );
              row
            })
            .collect();
          out.table(&headers, &cells);
        }
      }
    }

    Command::CreateIndex { table, column } => {
      store.create_index(&table, &column)?;
      out.json(&serde_json::json!({
        "ok": true,
        "index": { "table": table, "column": column },
      }));
    }

    Command::DropIndex { table, column } => {
      store.drop_index(&table, &column)?;
      out.json(&serde_json::json!({
        "ok": true,
        "dropped": { "table": table, "column": column },
      }));
    }
  }

  Ok(())
}

/// The `user` recorded on writes: explicit flag, then the STRATA_USER
/// override, then the OS-reported identity.
fn resolve_actor(flag: Option<String>) -> String {
  flag
    .or_else(|| std::env::var("STRATA_USER").ok())
    .or_else(|| std::env::var("USER").ok())
    .or_else(|| std::env::var("USERNAME").ok())
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| "unknown".to_owned())
}

/// Table headers for a select: the projected columns, or every schema
/// column for `*`.
fn projected_headers(projection: &Projection, schema: &Schema) -> Vec<String> {
  match projection {
    Projection::All => schema.column_names().map(str::to_owned).collect(),
    Projection::Columns(names) => names.clone(),
  }
}
