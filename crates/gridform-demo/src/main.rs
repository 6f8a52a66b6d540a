#![forbid(unsafe_code)]

//! Render a JSON Schema document as a gridform tree.
//!
//! ```text
//! gridform-demo schema.json --columns 6 --values values.json
//! RUST_LOG=gridform=debug gridform-demo schema.json --json
//! ```

use std::path::{Path, PathBuf};
use std::result::Result;

use clap::Parser;
use gridform::prelude::*;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gridform-demo",
    about = "Render a JSON Schema document through gridform",
    version
)]
struct Cli {
    /// JSON Schema document (an object schema with `properties`).
    schema: PathBuf,

    /// Form configuration file (`.toml` or `.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width; overrides the configuration file.
    #[arg(long)]
    columns: Option<u8>,

    /// Initial values as a JSON object; schema defaults otherwise.
    #[arg(long)]
    values: Option<PathBuf>,

    /// Render the submit and cancel buttons.
    #[arg(long)]
    submit: bool,

    /// Print the render tree as JSON instead of an outline.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: initial values must be a JSON object")]
    Values { path: PathBuf },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Form(#[from] FormError),
}

impl DemoError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Read { .. } => 2,
            Self::Values { .. } | Self::Json(_) => 3,
            Self::Form(_) => 4,
        }
    }
}

fn read(path: &Path) -> Result<String, DemoError> {
    std::fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), DemoError> {
    let mut config = match &cli.config {
        Some(path) => FormConfig::from_file(path).map_err(FormError::from)?,
        None => FormConfig::default(),
    };
    if let Some(columns) = cli.columns {
        config = config.with_columns(columns);
    }
    config.show_submit |= cli.submit;

    let document = read(&cli.schema)?;
    let mut builder = Form::builder()
        .json_schema(&document)
        .map_err(FormError::from)?
        .config(config);
    if let Some(path) = &cli.values {
        let values: Map<String, Value> = match serde_json::from_str(&read(path)?)? {
            Value::Object(map) => map,
            _ => return Err(DemoError::Values { path: path.clone() }),
        };
        builder = builder.initial_values(values);
    }

    let form = builder.build()?;
    tracing::info!(
        rows = form.rows().len(),
        detached = form.report().detached.len(),
        "form ready"
    );
    let tree = form.render()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", tree.outline());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
