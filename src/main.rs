use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use inkpost::config::{self, Config};
use inkpost::server;

/// Serves a directory of markdown pages as a blog.
#[derive(Parser)]
#[command(name = "inkpost", version, about)]
struct Cli {
    /// Project file to load instead of searching for `inkpost.yaml` from the
    /// current directory upwards.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the markdown pages.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Address to bind to.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Log at INFO level, including every request.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<Config, config::Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_project_file(path)?,
            None => Config::from_directory(&std::env::current_dir().map_err(|err| {
                config::Error::Open {
                    path: PathBuf::from("."),
                    err,
                }
            })?)?,
        };
        if let Some(content) = &self.content {
            config.content_directory = content.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),

    #[error("creating runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Server(#[from] server::Error),
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = cli.config()?;
    let runtime = tokio::runtime::Runtime::new().map_err(Error::Runtime)?;
    Ok(runtime.block_on(server::serve(config))?)
}

fn main() {
    let cli = Cli::parse();

    // --verbose means INFO, otherwise RUST_LOG or WARN.
    let filter = match cli.verbose {
        true => EnvFilter::new("info"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
