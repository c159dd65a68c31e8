//! sitesearch query - Run one search and print the rows

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{self, HumanLayout, OutputFormat, robot_ok, tsv_field};
use crate::error::Result;
use crate::panel::{RowKind, SearchRow, rows_from_response};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Search keyword (an empty keyword prints nothing)
    pub keyword: String,

    /// Maximum number of rows
    #[arg(long, short, default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    keyword: String,
    count: usize,
    rows: Vec<RowOutput>,
}

#[derive(Debug, Serialize)]
struct RowOutput {
    kind: RowKind,
    id: String,
    title: String,
    subtitle: String,
    url: String,
    link: String,
}

impl RowOutput {
    fn new(row: SearchRow, site_url: Option<&str>) -> Self {
        let link = row.absolute_url(site_url);
        Self {
            kind: row.kind,
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            url: row.url,
            link,
        }
    }
}

pub fn run(ctx: &AppContext, args: &QueryArgs) -> Result<()> {
    let coalescer = ctx.coalescer()?;
    let keyword = args.keyword.clone();
    let reply = ctx
        .runtime()
        .block_on(async move { coalescer.submit(keyword).await })?;

    let labels = ctx.config.row_labels();
    let mut rows = reply
        .as_ref()
        .and_then(|record| record.value())
        .and_then(|response| rows_from_response(response, &labels))
        .unwrap_or_default();
    rows.truncate(args.limit);

    let site_url = ctx.config.panel.site_url.as_deref();
    let report = QueryOutput {
        keyword: args.keyword.clone(),
        count: rows.len(),
        rows: rows
            .into_iter()
            .map(|row| RowOutput::new(row, site_url))
            .collect(),
    };

    emit(ctx, &report)
}

fn emit(ctx: &AppContext, report: &QueryOutput) -> Result<()> {
    match ctx.output_format {
        OutputFormat::Json => output::emit_json(&robot_ok(report)),
        OutputFormat::Jsonl => output::emit_jsonl(&report.rows),
        OutputFormat::Tsv => {
            output::emit_tsv(&["kind", "title", "subtitle", "link"], &report.rows, |row| {
                vec![
                    row.kind.as_str().to_string(),
                    tsv_field(&row.title),
                    tsv_field(&row.subtitle),
                    row.link.clone(),
                ]
            });
            Ok(())
        }
        OutputFormat::Plain => {
            for row in &report.rows {
                println!("{} | {} | {}", row.title, row.subtitle, row.link);
            }
            Ok(())
        }
        OutputFormat::Human => {
            if report.keyword.is_empty() {
                return Ok(());
            }
            let mut layout = HumanLayout::new();
            layout.title(&format!("Results for \"{}\"", report.keyword));
            if report.rows.is_empty() {
                layout.push_line(ctx.config.panel.empty_label.dimmed().to_string());
            }
            for row in &report.rows {
                layout.push_line(format!(
                    "{}  {}",
                    row.title.bold(),
                    row.subtitle.dimmed()
                ));
                layout.push_line(format!("  {}", row.link.cyan()));
            }
            output::emit_human(layout);
            Ok(())
        }
    }
}
