use crate::{
    pool::{Pool, StrandPair},
    render::duplex_report,
};
use adleman_protocol::StrandReport;
use anyhow::{Context, Result};
use bio::io::fasta;
use itertools::Itertools;
use std::path::Path;

fn write_strand<W: std::io::Write>(
    writer: &mut fasta::Writer<W>,
    id: &str,
    report: &StrandReport,
) -> Result<()> {
    let description = report.labels().iter().join(",");
    writer
        .write(id, Some(description.as_str()), report.joined_sequence().as_bytes())
        .with_context(|| format!("Could not write FASTA record '{id}'"))
}

/// Writes both sides of every duplex, one record per strand. Returns the
/// number of records written.
pub fn export_fasta<P: AsRef<Path>>(pool: &Pool, pairs: &[StrandPair], path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = fasta::Writer::to_file(path)
        .with_context(|| format!("Could not create FASTA file '{}'", path.display()))?;
    let mut records = 0;
    for (idx, pair) in pairs.iter().enumerate() {
        let report = duplex_report(pool, *pair);
        let n = idx + 1;
        write_strand(&mut writer, &format!("duplex{n}_upper"), &report.upper)?;
        write_strand(&mut writer, &format!("duplex{n}_lower"), &report.lower)?;
        records += 2;
    }
    writer
        .flush()
        .with_context(|| format!("Could not flush FASTA file '{}'", path.display()))?;
    Ok(records)
}
