//! Status command handler for the system cache.

use std::io::{self, Write};

use anyhow::Result;

use super::{AppContext, OutputFormat};
use crate::output::{render_json, TextRenderer};

/// Report cache sizes, origin table metadata and persistence state.
pub fn handle_status(ctx: &AppContext) -> Result<()> {
    let status = ctx.resolver().status();

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => render_json(&mut stdout, &status)?,
        OutputFormat::Text => TextRenderer::new(ctx.palette).render_status(&mut stdout, &status)?,
    }
    stdout.flush()?;
    Ok(())
}
