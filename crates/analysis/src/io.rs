//! CSV loaders and writers for the reference, abundance and metadata tables.

use crate::community::{AbundanceTable, Classification, Otu, SampleMetadata};
use crate::community::metrics::{WMCN_COLUMNS, WMGR_COLUMNS};
use crate::errors::TableError;
use crate::taxonomy::{Rank, ReferenceTable, ResolutionReport, UnresolvedReason};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

pub const OTU_ID: &str = "OTU ID";
pub const GROWTH_RATE: &str = "Growth Rate";
pub const PHOTOTROPH: &str = "Phototroph";
pub const COPY_NUMBER: &str = "Copy Number";
pub const CLASSIFICATION_LEVEL: &str = "Copy Number Classification Level";
pub const TEMPERATURE: &str = "Temperature";

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    rank: String,
    name: String,
    mean: Option<f64>,
}

/// Read a reference table (`taxid,rank,name,mean`; extra columns ignored).
///
/// Rows with a rank outside species..phylum or without a finite mean are
/// skipped.
pub fn read_reference_table<R: io::Read>(reader: R) -> Result<ReferenceTable, TableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = ReferenceTable::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize() {
        let row: ReferenceRow = row?;
        let rank = row.rank.parse::<Rank>();
        match (rank, row.mean) {
            (Ok(rank), Some(mean)) if mean.is_finite() => table.insert(rank, &row.name, mean),
            _ => skipped += 1,
        }
    }

    log::debug!(
        "Loaded {} reference entries ({skipped} rows skipped)",
        table.len()
    );
    Ok(table)
}

pub fn load_reference_table(path: impl AsRef<Path>) -> Result<ReferenceTable, TableError> {
    read_reference_table(BufReader::new(File::open(path)?))
}

fn is_missing(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("na")
        || value.eq_ignore_ascii_case("none")
}

fn invalid(line: u64, column: &str, value: &str) -> TableError {
    TableError::InvalidValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_optional_f64(value: &str, line: u64, column: &str) -> Result<Option<f64>, TableError> {
    let value = value.trim();
    if is_missing(value) {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| invalid(line, column, value))
}

fn parse_optional_bool(value: &str, line: u64, column: &str) -> Result<Option<bool>, TableError> {
    let value = value.trim();
    if is_missing(value) {
        return Ok(None);
    }
    match value.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Ok(Some(true)),
        "0" | "0.0" | "false" | "no" => Ok(Some(false)),
        _ => Err(invalid(line, column, value)),
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Column layout of an abundance CSV.
struct AbundanceColumns {
    id: usize,
    ranks: Vec<(Rank, usize)>,
    growth_rate: Option<usize>,
    phototroph: Option<usize>,
    copy_number: Option<usize>,
    level: Option<usize>,
    samples: Vec<(String, usize)>,
    text: Vec<(String, usize)>,
}

fn is_number(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}

impl AbundanceColumns {
    fn from_headers(
        headers: &csv::StringRecord,
        records: &[csv::StringRecord],
    ) -> Result<Self, TableError> {
        if headers.is_empty() {
            return Err(TableError::MissingColumn(OTU_ID.to_string()));
        }
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        // Without an explicit id column the first column is the OTU index
        let id = find(OTU_ID).unwrap_or(0);
        let ranks: Vec<(Rank, usize)> = Rank::ALL
            .into_iter()
            .filter_map(|r| find(r.label()).map(|i| (r, i)))
            .collect();
        let growth_rate = find(GROWTH_RATE);
        let phototroph = find(PHOTOTROPH);
        let copy_number = find(COPY_NUMBER);
        let level = find(CLASSIFICATION_LEVEL);

        let known: Vec<usize> = std::iter::once(id)
            .chain(ranks.iter().map(|&(_, i)| i))
            .chain([growth_rate, phototroph, copy_number, level].into_iter().flatten())
            .collect();
        // A column with no numeric cell but some text is annotation, not a sample
        let (text, samples): (Vec<_>, Vec<_>) = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !known.contains(i))
            .map(|(i, h)| (h.trim().to_string(), i))
            .partition(|&(_, i)| {
                let cells = || records.iter().map(move |r| r.get(i).unwrap_or("").trim());
                !cells().any(is_number) && cells().any(|c| !is_missing(c))
            });
        if !text.is_empty() {
            log::debug!(
                "Carrying {} text column(s) through: {}",
                text.len(),
                text.iter().map(|(h, _)| h.as_str()).collect::<Vec<_>>().join(", ")
            );
        }

        Ok(Self {
            id,
            ranks,
            growth_rate,
            phototroph,
            copy_number,
            level,
            samples,
            text,
        })
    }
}

/// Read an abundance table.
///
/// `OTU ID` (or the first column), the rank columns `Species`..`Phylum`,
/// `Growth Rate`, `Phototroph`, `Copy Number` and
/// `Copy Number Classification Level` are recognized. Of the remaining
/// columns, those holding text and no numbers (`Kingdom`, `Taxonomy`, ...)
/// are carried through unchanged and every other one is a sample. Empty
/// abundance cells count as zero.
pub fn read_abundance_table<R: io::Read>(reader: R) -> Result<AbundanceTable, TableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let records = csv_reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;
    let columns = AbundanceColumns::from_headers(&headers, &records)?;

    let mut table = AbundanceTable::new(columns.samples.iter().map(|(s, _)| s.clone()).collect())
        .with_text_columns(columns.text.iter().map(|(h, _)| h.clone()).collect());
    table.set_growth_rates_annotated(columns.growth_rate.is_some());

    for record in &records {
        let line = record.position().map_or(0, |p| p.line());
        let field = |i: usize| record.get(i).unwrap_or("");

        let mut classification = Classification::new();
        for &(rank, i) in &columns.ranks {
            classification.set(rank, Some(field(i)));
        }

        let abundances = columns
            .samples
            .iter()
            .map(|(name, i)| Ok(parse_optional_f64(field(*i), line, name)?.unwrap_or(0.0)))
            .collect::<Result<Vec<f64>, TableError>>()?;

        let text = columns
            .text
            .iter()
            .map(|&(_, i)| field(i).to_string())
            .collect();
        let mut otu =
            Otu::new(field(columns.id).trim(), classification, abundances).with_text(text);
        if let Some(i) = columns.growth_rate {
            otu.growth_rate = parse_optional_f64(field(i), line, GROWTH_RATE)?;
        }
        if let Some(i) = columns.phototroph {
            otu.phototroph = parse_optional_bool(field(i), line, PHOTOTROPH)?;
        }
        if let Some(i) = columns.copy_number {
            otu.copy_number = parse_optional_f64(field(i), line, COPY_NUMBER)?;
        }
        if let Some(i) = columns.level {
            let value = field(i).trim();
            if !is_missing(value) {
                otu.classification_level = Some(
                    value
                        .parse::<Rank>()
                        .map_err(|_| invalid(line, CLASSIFICATION_LEVEL, value))?,
                );
            }
        }
        table.push(otu);
    }

    log::debug!(
        "Loaded {} OTUs across {} samples",
        table.len(),
        table.samples().len()
    );
    Ok(table)
}

pub fn load_abundance_table(path: impl AsRef<Path>) -> Result<AbundanceTable, TableError> {
    read_abundance_table(BufReader::new(File::open(path)?))
}

/// Write an annotated abundance table.
pub fn write_abundance_table<W: io::Write>(
    table: &AbundanceTable,
    writer: W,
) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let ranks: Vec<Rank> = Rank::ALL
        .into_iter()
        .filter(|&r| r != Rank::Species || table.has_species())
        .collect();
    let with_growth = table.has_growth_rates();
    let with_phototroph = table.has_phototroph_flags();

    let mut header: Vec<String> = vec![OTU_ID.to_string()];
    header.extend(table.text_columns().iter().cloned());
    header.extend(ranks.iter().map(|r| r.label().to_string()));
    if with_growth {
        header.push(GROWTH_RATE.to_string());
    }
    if with_phototroph {
        header.push(PHOTOTROPH.to_string());
    }
    header.push(COPY_NUMBER.to_string());
    header.push(CLASSIFICATION_LEVEL.to_string());
    header.extend(table.samples().iter().cloned());
    csv_writer.write_record(&header)?;

    for otu in table.otus() {
        let mut row: Vec<String> = vec![otu.id.clone()];
        row.extend((0..table.text_columns().len()).map(|i| otu.text_at(i).to_string()));
        row.extend(
            ranks
                .iter()
                .map(|&r| otu.classification.get(r).unwrap_or_default().to_string()),
        );
        if with_growth {
            row.push(format_optional(otu.growth_rate));
        }
        if with_phototroph {
            row.push(match otu.phototroph {
                Some(true) => "1".to_string(),
                Some(false) => "0".to_string(),
                None => String::new(),
            });
        }
        row.push(format_optional(otu.copy_number));
        row.push(
            otu.classification_level
                .map(|r| r.label().to_string())
                .unwrap_or_default(),
        );
        row.extend(otu.abundances.iter().map(f64::to_string));
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_abundance_table(table: &AbundanceTable, path: impl AsRef<Path>) -> Result<(), TableError> {
    write_abundance_table(table, BufWriter::new(File::create(path)?))
}

fn is_metric_column(name: &str) -> bool {
    WMCN_COLUMNS
        .iter()
        .chain(WMGR_COLUMNS.iter())
        .any(|(column, _)| *column == name)
}

/// Read sample metadata: first column is the sample id, `Temperature` is
/// parsed when present, known metric columns are parsed as numbers and
/// everything else is carried through as text.
pub fn read_sample_metadata<R: io::Read>(reader: R) -> Result<SampleMetadata, TableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let Some(first) = headers.get(0) else {
        return Err(TableError::MissingColumn("sample id".to_string()));
    };
    let id_header = if first.trim().is_empty() {
        "Sample"
    } else {
        first.trim()
    };
    let mut metadata = SampleMetadata::new().with_id_header(id_header);
    let temperature_col = headers.iter().position(|h| h.trim() == TEMPERATURE);

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let id = record.get(0).unwrap_or("").trim().to_string();

        let temperature = match temperature_col {
            Some(i) => parse_optional_f64(record.get(i).unwrap_or(""), line, TEMPERATURE)?,
            None => None,
        };
        if !metadata.push_sample(id.clone(), temperature) {
            return Err(TableError::DuplicateSample(id));
        }

        for (i, header) in headers.iter().enumerate().skip(1) {
            if Some(i) == temperature_col {
                continue;
            }
            let header = header.trim();
            let value = record.get(i).unwrap_or("");
            if is_metric_column(header) {
                let parsed = parse_optional_f64(value, line, header)?;
                metadata.set_metric(&id, header, parsed);
            } else {
                metadata.set_text(&id, header, value);
            }
        }
    }
    Ok(metadata)
}

pub fn load_sample_metadata(path: impl AsRef<Path>) -> Result<SampleMetadata, TableError> {
    read_sample_metadata(BufReader::new(File::open(path)?))
}

/// Write metadata: id, `Temperature` (when any sample has one), pass-through
/// columns, then metric columns. Undefined metrics are written empty.
pub fn write_sample_metadata<W: io::Write>(
    metadata: &SampleMetadata,
    writer: W,
) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let with_temperature = metadata.has_temperature();
    let passthrough: Vec<&str> = metadata.passthrough_columns().collect();
    let metrics: Vec<&str> = metadata.metric_columns().collect();

    let mut header = vec![metadata.id_header()];
    if with_temperature {
        header.push(TEMPERATURE);
    }
    header.extend(&passthrough);
    header.extend(&metrics);
    csv_writer.write_record(&header)?;

    for sample in metadata.samples() {
        let mut row = vec![sample.clone()];
        if with_temperature {
            row.push(format_optional(metadata.temperature(sample)));
        }
        row.extend(
            passthrough
                .iter()
                .map(|c| metadata.text(sample, c).unwrap_or_default().to_string()),
        );
        row.extend(metrics.iter().map(|c| format_optional(metadata.metric(sample, c))));
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_sample_metadata(metadata: &SampleMetadata, path: impl AsRef<Path>) -> Result<(), TableError> {
    write_sample_metadata(metadata, BufWriter::new(File::create(path)?))
}

/// Write the unresolved OTUs of a report (`OTU ID,Code,Reason`).
pub fn write_unresolved<W: io::Write>(report: &ResolutionReport, writer: W) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([OTU_ID, "Code", "Reason"])?;
    for otu in &report.unresolved {
        let reason = match otu.reason {
            UnresolvedReason::Exhausted => "no match".to_string(),
            UnresolvedReason::Ambiguous { rank, matches } => {
                format!("{matches} matches at {rank}")
            }
        };
        csv_writer.write_record([otu.otu_id.as_str(), &otu.code.to_string(), &reason])?;
    }
    csv_writer.flush()?;
    Ok(())
}
