//! Rares command handler for listing the catalog.

use std::io::{self, Write};

use anyhow::{bail, Result};

use rare_router_lib::fuzzy;
use rare_router_lib::RareGood;

use super::{AppContext, OutputFormat};
use crate::output::{render_json, TextRenderer};

/// List catalog goods, optionally filtered by a fuzzy name query.
///
/// Without a query the catalog is listed in file order; with one, goods are
/// ordered best match first.
pub fn handle_rares(ctx: &AppContext, query: Option<&str>) -> Result<()> {
    let catalog = ctx.load_catalog()?;

    let goods: Vec<&RareGood> = match query {
        None => catalog.goods().iter().collect(),
        Some(query) => {
            let ranked = fuzzy::rank_by(query, catalog.goods(), fuzzy::DEFAULT_MIN_SCORE, |good| {
                good.name.as_str()
            });
            if ranked.is_empty() {
                bail!("no rare goods match '{}'", query.trim());
            }
            ranked.into_iter().map(|(good, _)| good).collect()
        }
    };

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &goods)?,
        OutputFormat::Text => TextRenderer::new(ctx.palette).render_rares(&mut stdout, &goods)?,
    }
    stdout.flush()?;
    Ok(())
}
