//! Main entry point of the Lambda function.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use clap::Parser;
use graphql_lambda::CompilerEngine;
use graphql_lambda::Configuration;
use graphql_lambda::GraphqlHandler;
use graphql_lambda::configuration::LogFormat;
use graphql_lambda::configuration::generate_config_schema;
use tracing_subscriber::EnvFilter;

/// Options for the function
#[derive(Parser, Debug)]
#[clap(
    name = "graphql-lambda",
    about = "Serve a GraphQL schema from an AWS Lambda function"
)]
struct Opt {
    /// Log level (off|error|warn|info|debug|trace). Overrides `logging.level`.
    #[clap(long = "log", env = "GRAPHQL_LAMBDA_LOG")]
    log_level: Option<String>,

    /// Configuration location relative to the working directory.
    #[clap(short, long = "config", env = "GRAPHQL_LAMBDA_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Prints the configuration schema.
    #[clap(long)]
    schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    if opt.schema {
        let schema = generate_config_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let configuration = match &opt.config_path {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };

    let log_level = opt
        .log_level
        .as_deref()
        .unwrap_or(&configuration.logging.level);
    let builder = tracing_subscriber::fmt::fmt().with_env_filter(
        EnvFilter::try_new(log_level).context("could not parse log configuration")?,
    );
    match configuration.logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    let schema = configuration
        .load_schema()
        .context("graphql-lambda requires a schema, set `schema` or `schema_path` in --config")?;
    let handler = GraphqlHandler::builder()
        .engine(Arc::new(CompilerEngine::new()))
        .schema(schema)
        .resolvers(configuration.resolvers())
        .build()?;

    tracing::info!(
        "GraphQL Lambda v{} waiting for invocations",
        std::env!("CARGO_PKG_VERSION")
    );
    lambda_runtime::run(handler).await.map_err(|error| anyhow!(error))
}
