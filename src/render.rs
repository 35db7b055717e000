use crate::{
    gel::Gel,
    oligonucleotide::OligoId,
    pool::{Pool, StrandPair},
};
use adleman_protocol::{DuplexReport, GelReport, StrandReport, StrandToken};
use itertools::Itertools;

const TOKEN_SEPARATOR: &str = " - ";

pub fn strand_tokens(pool: &Pool, start: OligoId) -> Vec<StrandToken> {
    pool.strand(start)
        .into_iter()
        .filter_map(|id| pool.get(id))
        .map(|oligo| StrandToken {
            label: oligo.label().to_string(),
            sequence: oligo.sequence(),
        })
        .collect()
}

pub fn strand_report(pool: &Pool, start: OligoId) -> StrandReport {
    StrandReport {
        start_id: start.index(),
        tokens: strand_tokens(pool, start),
    }
}

pub fn duplex_report(pool: &Pool, (upper, lower): StrandPair) -> DuplexReport {
    let upper = strand_report(pool, upper);
    let lower = strand_report(pool, lower);
    DuplexReport {
        size: upper.len().max(lower.len()),
        upper,
        lower,
    }
}

/// Summarizes a gel that has been run, keeping the duplexes of `target_size`.
pub fn gel_report(pool: &Pool, gel: &Gel, target_size: usize) -> GelReport {
    GelReport {
        target_size,
        band_counts: gel.size_histogram(),
        selected: gel
            .get_strand_with_size(target_size)
            .into_iter()
            .map(|pair| duplex_report(pool, pair))
            .collect(),
    }
}

/// `0-co - 1-co - 2-co`
pub fn render_labels(report: &StrandReport) -> String {
    report.tokens.iter().map(|t| t.label.as_str()).join(TOKEN_SEPARATOR)
}

/// `0-co:TTTTGTTTGT - 1-co:TTGTTTGTTT`
pub fn render_strand(report: &StrandReport) -> String {
    report
        .tokens
        .iter()
        .map(|t| format!("{}:{}", t.label, t.sequence))
        .join(TOKEN_SEPARATOR)
}

pub fn render_duplex(report: &DuplexReport) -> String {
    format!(
        "duplex of {} segment(s)\n  #{}: {}\n  #{}: {}",
        report.size,
        report.upper.start_id,
        render_strand(&report.upper),
        report.lower.start_id,
        render_strand(&report.lower)
    )
}

pub fn render_duplexes(pool: &Pool, pairs: &[StrandPair]) -> String {
    pairs
        .iter()
        .map(|pair| render_duplex(&duplex_report(pool, *pair)))
        .join("\n")
}
