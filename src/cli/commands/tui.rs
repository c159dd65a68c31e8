//! sitesearch tui - Interactive search panel

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{self, robot_ok};
use crate::error::{Result, SiteError};
use crate::panel::{RowKind, SearchRow};
use crate::tui::run_search_tui;

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Open the panel already searching for this keyword
    #[arg(long, short)]
    pub keyword: Option<String>,

    /// Open the chosen row in the browser (needs panel.site_url)
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Serialize)]
struct Selection {
    kind: RowKind,
    title: String,
    link: String,
}

pub fn run(ctx: &AppContext, args: &TuiArgs) -> Result<()> {
    let site_url = ctx.config.panel.site_url.as_deref();
    if args.open && site_url.is_none() {
        return Err(SiteError::MissingConfig("panel.site_url".to_string()));
    }

    let Some(row) = run_search_tui(ctx, args.keyword.as_deref())? else {
        return Ok(());
    };
    let selection = selection(row, site_url);

    if args.open {
        info!(link = %selection.link, "opening selection");
        open::that(&selection.link)?;
    }

    if ctx.machine_mode() {
        output::emit_json(&robot_ok(&selection))
    } else {
        println!("{}", selection.link);
        Ok(())
    }
}

fn selection(row: SearchRow, site_url: Option<&str>) -> Selection {
    let link = row.absolute_url(site_url);
    Selection {
        kind: row.kind,
        title: row.title,
        link,
    }
}
