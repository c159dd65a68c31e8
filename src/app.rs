use std::path::PathBuf;

use tokio::runtime::Runtime;

use crate::api::HttpSearchClient;
use crate::cli::{Cli, OutputFormat};
use crate::coalescer::RequestCoalescer;
use crate::config::Config;
use crate::error::Result;

/// Everything a command needs: resolved configuration, output format and
/// the tokio runtime that drives search calls.
pub struct AppContext {
    pub project_root: PathBuf,
    /// Explicit config file, if one was given.
    pub config_path: Option<PathBuf>,
    pub config: Config,
    pub output_format: OutputFormat,
    pub verbosity: u8,
    runtime: Runtime,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let mut config = Config::load(cli.config.as_deref(), &project_root)?;
        if let Some(endpoint) = &cli.endpoint {
            config.api.endpoint.clone_from(endpoint);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sitesearch-worker")
            .enable_all()
            .build()?;

        Ok(Self {
            project_root,
            config_path: cli.config.clone(),
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
            runtime,
        })
    }

    #[must_use]
    pub const fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// HTTP backend built from `[api]`.
    pub fn search_client(&self) -> Result<HttpSearchClient> {
        HttpSearchClient::from_config(&self.config.api)
    }

    /// A fresh coalescer over the HTTP backend, tuned by `[coalescer]`.
    pub fn coalescer(&self) -> Result<RequestCoalescer<HttpSearchClient>> {
        Ok(RequestCoalescer::new(
            self.search_client()?,
            self.config.coalescer_config(),
        ))
    }

    #[must_use]
    pub const fn machine_mode(&self) -> bool {
        self.output_format.is_machine_readable()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("project_root", &self.project_root)
            .field("config_path", &self.config_path)
            .field("output_format", &self.output_format)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}
