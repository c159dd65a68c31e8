//! sitesearch config - Show the resolved configuration

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{self, HumanLayout, OutputFormat};
use crate::config::Config;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the merged configuration (default)
    #[arg(long)]
    pub show: bool,

    /// Print the config file locations that are consulted
    #[arg(long, conflicts_with = "show")]
    pub paths: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Merged,
    Paths,
}

impl ConfigArgs {
    /// `--show` is the default view; `--paths` switches to file locations.
    const fn view(&self) -> View {
        if self.paths && !self.show {
            View::Paths
        } else {
            View::Merged
        }
    }
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match args.view() {
        View::Merged => emit_config(ctx),
        View::Paths => emit_paths(ctx),
    }
}

fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.api.auth_token.is_some() {
        config.api.auth_token = Some("********".to_string());
    }
    config
}

fn emit_config(ctx: &AppContext) -> Result<()> {
    let config = redacted(&ctx.config);
    if ctx.machine_mode() {
        return output::emit_json(&output::robot_ok(&config));
    }

    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

fn emit_paths(ctx: &AppContext) -> Result<()> {
    let explicit = ctx.config_path.as_ref().map(|path| path.display().to_string());
    let global = Config::global_path().map(|path| path.display().to_string());
    let project = Config::project_path(&ctx.project_root).display().to_string();

    if ctx.output_format == OutputFormat::Human || ctx.output_format == OutputFormat::Plain {
        let mut layout = HumanLayout::new();
        layout.title("Config files");
        if let Some(explicit) = &explicit {
            layout.kv("explicit", explicit);
        }
        layout.kv("global", global.as_deref().unwrap_or("-"));
        layout.kv("project", &project);
        output::emit_human(layout);
        return Ok(());
    }

    output::emit_json(&output::robot_ok(serde_json::json!({
        "explicit": explicit,
        "global": global,
        "project": project,
    })))
}
