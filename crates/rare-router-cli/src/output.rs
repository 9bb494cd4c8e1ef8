//! Output formatting for scan, analyze and cache reports.
//!
//! Every renderer writes to a caller-supplied writer so the same code serves
//! stdout and the unit tests below.

use std::io::{self, Write};

use serde::Serialize;

use rare_router_lib::{
    AnalyzeRecord, AnalyzeRequest, CacheStatus, PadSize, RareGood, RareRecord, ResolvedSystem,
    ScanRecord, ScanRequest,
};

use crate::terminal::{format_credits, ColorPalette};

/// Profit used to express the CP yield of a trade.
const REFERENCE_PROFIT_CR: f64 = 1_000_000.0;

/// Render any serializable value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// A system search hit, re-ranked against the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub system: ResolvedSystem,
    pub score: f64,
}

fn pad_label(pad: PadSize) -> &'static str {
    match pad {
        PadSize::Small => "S",
        PadSize::Medium => "M",
        PadSize::Large => "L",
    }
}

fn faction_label(system: &ResolvedSystem) -> String {
    match (system.allegiance.as_deref(), system.government.as_deref()) {
        (None, None) => "no faction data".to_string(),
        (allegiance, government) => format!(
            "{} / {}",
            allegiance.unwrap_or("?"),
            government.unwrap_or("?")
        ),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Plain-text renderer with optional ANSI colors.
pub struct TextRenderer {
    palette: ColorPalette,
}

impl TextRenderer {
    #[must_use]
    pub const fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    /// Render scan records in catalog order.
    pub fn render_scan<W: Write>(
        &self,
        out: &mut W,
        request: &ScanRequest,
        records: &[ScanRecord],
    ) -> io::Result<()> {
        let p = &self.palette;
        writeln!(
            out,
            "Rare goods from {}{}{} (system type: {}, finance ethos: {})",
            p.emphasis,
            request.current.trim(),
            p.reset,
            request.system_type,
            yes_no(request.has_finance_ethos)
        )?;
        for record in records {
            writeln!(out)?;
            self.render_header(out, record)?;
            if !record.system_not_found {
                writeln!(
                    out,
                    "    {:.2} ly away, sell beyond {} ly",
                    record.leg.distance_from_current_ly, record.sell_hint_ly
                )?;
            }
            self.render_verdict(out, record)?;
        }
        self.render_summary(out, records)
    }

    /// Render analyze records in catalog order.
    pub fn render_analyze<W: Write>(
        &self,
        out: &mut W,
        request: &AnalyzeRequest,
        records: &[AnalyzeRecord],
    ) -> io::Result<()> {
        let p = &self.palette;
        writeln!(
            out,
            "Rare goods from {}{}{} to {}{}{} (system type: {}, finance ethos: {})",
            p.emphasis,
            request.current.trim(),
            p.reset,
            p.emphasis,
            request.target.trim(),
            p.reset,
            request.system_type,
            yes_no(request.has_finance_ethos)
        )?;
        for record in records {
            writeln!(out)?;
            self.render_header(out, record)?;
            if !record.system_not_found {
                let (color, range) = if record.leg.in_profit_range {
                    (p.in_range, "in profit range")
                } else {
                    (p.detail, "too close to sell")
                };
                writeln!(
                    out,
                    "    {:.2} ly to origin, {:.2} ly to target ({color}{range}{}, sell beyond {} ly)",
                    record.leg.distance_current_to_origin_ly,
                    record.leg.distance_origin_to_target_ly,
                    p.reset,
                    record.sell_hint_ly
                )?;
            }
            self.render_verdict(out, record)?;
        }
        self.render_summary(out, records)
    }

    fn render_header<W: Write, L>(&self, out: &mut W, record: &RareRecord<L>) -> io::Result<()> {
        let p = &self.palette;
        let mut line = format!(
            "{}{}{} {}{} / {} [pad {}]{}",
            p.emphasis,
            record.rare,
            p.reset,
            p.detail,
            record.origin_system,
            record.origin_station,
            pad_label(record.pad),
            p.reset
        );
        if let Some(cost) = record.cost {
            line.push_str(&format!(" {} cr", format_credits(cost)));
        }
        writeln!(out, "{line}")
    }

    fn render_verdict<W: Write, L>(&self, out: &mut W, record: &RareRecord<L>) -> io::Result<()> {
        let p = &self.palette;
        if record.system_not_found {
            return writeln!(out, "    {}", p.paint(p.not_found, &record.legal_reason));
        }
        let verdict = if record.legal { p.legal } else { p.illegal };
        let legality = p.paint(verdict, &record.legal_reason);
        let powerplay = match record.cp_divisors {
            Some(divisors) => p.paint(
                p.powerplay,
                format!(
                    "PowerPlay eligible, CP divisor {} ({:.0} CP per 1M cr profit)",
                    format_credits(u64::from(divisors.effective)),
                    divisors.contribution_points(REFERENCE_PROFIT_CR)
                ),
            ),
            None => p.paint(p.detail, "not PowerPlay eligible"),
        };
        writeln!(out, "    {legality} | {powerplay}")
    }

    fn render_summary<W: Write, L>(&self, out: &mut W, records: &[RareRecord<L>]) -> io::Result<()> {
        let legal = records
            .iter()
            .filter(|r| r.legal && !r.system_not_found)
            .count();
        let eligible = records.iter().filter(|r| r.pp_eligible).count();
        let unresolved = records.iter().filter(|r| r.system_not_found).count();
        writeln!(out)?;
        writeln!(
            out,
            "{} goods: {} legal, {} PowerPlay eligible, {} unresolved",
            records.len(),
            legal,
            eligible,
            unresolved
        )
    }

    /// Render one resolved system.
    pub fn render_system<W: Write>(&self, out: &mut W, system: &ResolvedSystem) -> io::Result<()> {
        let p = &self.palette;
        writeln!(
            out,
            "{}{}{} [{}, {}, {}] {}{}{}",
            p.emphasis,
            system.name,
            p.reset,
            system.coords.x,
            system.coords.y,
            system.coords.z,
            p.detail,
            faction_label(system),
            p.reset
        )
    }

    /// Render search hits, best match first.
    pub fn render_search<W: Write>(
        &self,
        out: &mut W,
        query: &str,
        hits: &[SearchHit],
    ) -> io::Result<()> {
        if hits.is_empty() {
            return writeln!(out, "No systems match '{}'.", query.trim());
        }
        for hit in hits {
            self.render_system(out, &hit.system)?;
        }
        Ok(())
    }

    /// Render catalog entries.
    pub fn render_rares<W: Write>(&self, out: &mut W, goods: &[&RareGood]) -> io::Result<()> {
        let p = &self.palette;
        for good in goods {
            let mut line = format!(
                "{}{}{} {}{} / {} [pad {}]{} sell beyond {} ly",
                p.emphasis,
                good.name,
                p.reset,
                p.detail,
                good.origin_system,
                good.origin_station,
                pad_label(good.pad_size),
                p.reset,
                good.sell_hint_ly
            );
            if let Some(cost) = good.cost {
                line.push_str(&format!(", {} cr", format_credits(cost)));
            }
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{} rare goods", goods.len())
    }

    /// Render the resolver's cache status.
    pub fn render_status<W: Write>(&self, out: &mut W, status: &CacheStatus) -> io::Result<()> {
        let p = &self.palette;
        writeln!(out, "{}System cache{}", p.emphasis, p.reset)?;
        match &status.snapshot_path {
            Some(path) => writeln!(out, "  snapshot:        {}", path.display())?,
            None => writeln!(out, "  snapshot:        (memory only)")?,
        }
        writeln!(out, "  exact entries:   {}", status.exact_entries)?;
        writeln!(out, "  search entries:  {}", status.search_entries)?;
        writeln!(out, "  origin systems:  {}", status.origin_entries)?;
        if let Some(updated) = status
            .origin_metadata
            .as_ref()
            .and_then(|metadata| metadata.last_updated)
        {
            writeln!(
                out,
                "  origin table:    updated {}",
                updated.format("%Y-%m-%d %H:%M UTC")
            )?;
        }
        writeln!(out, "  pending write:   {}", yes_no(status.pending_write))?;
        writeln!(out, "  snapshot writes: {}", status.snapshot_writes)?;
        writeln!(
            out,
            "  directory calls: {} lookups, {} searches",
            status.directory_lookups, status.directory_searches
        )
    }
}
