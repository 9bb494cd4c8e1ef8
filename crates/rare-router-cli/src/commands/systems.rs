//! System lookup and search command handlers.

use std::io::{self, Write};

use anyhow::{bail, Result};

use rare_router_lib::fuzzy;
use rare_router_lib::{format_suggestions, Resolution};

use super::{AppContext, OutputFormat, MAX_SUGGESTIONS};
use crate::output::{render_json, SearchHit, TextRenderer};

/// Resolve one system by exact name.
pub async fn handle_lookup(ctx: &AppContext, name: &str) -> Result<()> {
    let resolver = ctx.resolver();
    let system = match resolver.resolve_exact(name).await {
        Resolution::Found(system) => system,
        Resolution::NotFound => {
            let suggestions = resolver.suggest_names(name, MAX_SUGGESTIONS).await;
            bail!(
                "system '{}' not found{}",
                name.trim(),
                format_suggestions(&suggestions)
            );
        }
        Resolution::Unavailable { message } => {
            bail!("system directory unavailable while resolving '{}': {message}", name.trim())
        }
    };

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &system)?,
        OutputFormat::Text => TextRenderer::new(ctx.palette).render_system(&mut stdout, &system)?,
    }
    stdout.flush()?;
    Ok(())
}

/// Prefix search, re-ranked so the closest names come first.
pub async fn handle_search(ctx: &AppContext, query: &str, limit: usize) -> Result<()> {
    let systems = ctx.resolver().search_prefix(query).await;
    let hits: Vec<SearchHit> = fuzzy::rank_by(query, &systems, fuzzy::DEFAULT_MIN_SCORE, |system| {
        system.name.as_str()
    })
    .into_iter()
    .take(limit)
    .map(|(system, score)| SearchHit {
        system: system.clone(),
        score,
    })
    .collect();

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &hits)?,
        OutputFormat::Text => {
            TextRenderer::new(ctx.palette).render_search(&mut stdout, query, &hits)?
        }
    }
    stdout.flush()?;
    Ok(())
}
