//! Scan and analyze command handlers.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;

use rare_router_lib::{AnalyzeRequest, RouteEvaluator, ScanRequest};

use super::{AppContext, OutputFormat};
use crate::output::{render_json, TextRenderer};

fn evaluator(ctx: &AppContext) -> Result<RouteEvaluator> {
    let catalog = ctx.load_catalog()?;
    Ok(
        RouteEvaluator::new(Arc::new(catalog), Arc::clone(ctx.resolver()))
            .with_max_concurrency(ctx.config.max_concurrency),
    )
}

/// Evaluate every rare good as seen from the current system.
pub async fn handle_scan(ctx: &AppContext, request: &ScanRequest) -> Result<()> {
    let records = evaluator(ctx)?.scan(request).await?;

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &records)?,
        OutputFormat::Text => {
            TextRenderer::new(ctx.palette).render_scan(&mut stdout, request, &records)?
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Evaluate every rare good carried from its origin to the target system.
pub async fn handle_analyze(ctx: &AppContext, request: &AnalyzeRequest) -> Result<()> {
    let records = evaluator(ctx)?.analyze(request).await?;

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &records)?,
        OutputFormat::Text => {
            TextRenderer::new(ctx.palette).render_analyze(&mut stdout, request, &records)?
        }
    }
    stdout.flush()?;
    Ok(())
}
