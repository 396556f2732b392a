//! oxide-dal CLI
//!
//! Runs named-parameter SQL against a SQLite database.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dal_cli::report::{ExecReport, ParseReport, QueryReport, ScriptReport};
use oxide_dal_cli::{params, CliError};
use oxide_dal_core::{split_script, Connection, DataParam, DataType, Params, Query};
use oxide_dal_sqlite::{open, SqliteOptions};

/// Named-parameter SQL over SQLite.
#[derive(Parser)]
#[command(name = "oxide-dal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// Do not create the database file if it is missing.
    #[arg(long)]
    no_create: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the driver text and marker ordinals of a query.
    Parse {
        /// Query text with `:name` and `&name` markers.
        sql: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a query and print its rows.
    Query {
        /// Query text with `:name` markers.
        sql: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Run one update, DDL statement or call.
    Exec {
        /// Statement text with `:name` and `&name` markers.
        sql: String,

        /// Declare the type of an output parameter, as NAME:TYPE.
        #[arg(long = "out", value_name = "NAME:TYPE")]
        outputs: Vec<String>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Execute a script whose statements are separated by `/` lines.
    Run {
        /// Script file, or `-` for standard input.
        script: PathBuf,

        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args)]
struct ParamArgs {
    /// Parameter as NAME=VALUE or NAME:TYPE=VALUE.
    #[arg(short = 'p', long = "param", value_name = "NAME[:TYPE]=VALUE")]
    values: Vec<String>,

    /// JSON file of parameters.
    #[arg(long)]
    params_file: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

impl ParamArgs {
    fn collect(&self) -> oxide_dal_cli::Result<Params> {
        params::collect(&self.values, self.params_file.as_deref())
    }
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
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Parse { sql, json } = &cli.command {
        let report = ParseReport::new(&Query::parse(sql)?);
        return print(&report, *json, ParseReport::to_text);
    }

    let options = SqliteOptions::new(&cli.database).create_if_missing(!cli.no_create);
    let mut conn = open(&options)?;
    debug!(database = %cli.database, "Connected");

    let outcome = run(&mut conn, cli.command);
    conn.close()?;
    outcome
}

fn run(conn: &mut Connection, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Parse { .. } => Ok(()),

        Commands::Query { sql, params } => {
            let values = params.collect()?;
            let mut table = conn.query(&sql, &values)?;
            let report = QueryReport::collect(&mut table)?;
            print(&report, params.json, QueryReport::to_text)
        }

        Commands::Exec {
            sql,
            outputs,
            params,
        } => {
            let mut values = params.collect()?;
            for spec in &outputs {
                let (name, data_type) = output_spec(spec)?;
                values.set(&name, DataParam::null(data_type));
            }
            let names = out_names(&sql);
            let count = conn.execute(&sql, &mut values)?;
            let report = ExecReport::new(count, &names, &values);
            print(&report, params.json, ExecReport::to_text)
        }

        Commands::Run { script, params } => {
            let text = read_script(&script)?;
            let mut values = params.collect()?;
            let names: Vec<String> = split_script(&text)
                .into_iter()
                .flat_map(out_names)
                .collect();
            info!(script = %script.display(), "Running script");
            let counts = conn.execute_script(&text, &mut values)?;
            let report = ScriptReport::new(counts, &names, &values);
            print(&report, params.json, ScriptReport::to_text)
        }
    }
}

fn print<T: Serialize>(report: &T, json: bool, text: fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", text(report));
    }
    Ok(())
}

/// Parses `NAME:TYPE` for `--out`.
fn output_spec(spec: &str) -> Result<(String, DataType), CliError> {
    let (name, type_name) = spec.split_once(':').ok_or_else(|| CliError::InvalidParam {
        spec: spec.to_string(),
        message: "expected NAME:TYPE".to_string(),
    })?;
    let data_type =
        DataType::from_name(type_name).ok_or_else(|| CliError::UnknownType(type_name.to_string()))?;
    Ok((name.trim().to_uppercase(), data_type))
}

/// Output names of a statement. Unparseable text is reported when it runs.
fn out_names(sql: &str) -> Vec<String> {
    Query::parse(sql)
        .map(|q| q.out_param_names().into_iter().map(String::from).collect())
        .unwrap_or_default()
}

fn read_script(path: &Path) -> Result<String, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(io_error)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(io_error)
    }
}
