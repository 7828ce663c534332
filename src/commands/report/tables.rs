use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;

use super::candidates::FrequencyIndex;
use super::types::{
    CandidateEntry, ClassifiedRecord, DocumentRecord, DocumentTable, PhraseAggregate, PhraseEntry,
    PhraseTable, TableError,
};

pub const PHRASE_HEADER: &str = "Phrase";

/// Offset of the indexer-review default within the reference table. Fixed by
/// the upstream export layout, independent of the header text.
pub const REVIEW_DEFAULT_OFFSET: usize = 4;

pub const MATCH_HEADERS: [&str; 6] = [
    "Member Match",
    "Summary Match",
    "DOS Match",
    "Signature Match",
    "Patient Match",
    "Provider Match",
];

pub const REVIEW_DEFAULT_HEADER: &str = "Indexer Review (Phrase Default)";

pub const NO_PHRASE_FREQ_HEADER: &str =
    "Documents Manually Indexed with No Phrase by HL7 Document Type and HL7 Summary Line";

pub const NO_PATIENT_FREQ_HEADER: &str = "Indexed Documents with Flag containing No Patient Found \
     and No Phrase Hit by HL7 Document Type and HL7 Summary Line";

pub const COUNTER_HEADERS: [&str; 7] = [
    "Total Hits in Reporting Period (Indexed)",
    "Count Member Changed",
    "Count Summary Changed",
    "Count DOS Changed",
    "Count Signature Changed",
    "Count Patient Found and Changed",
    "Count Provider Changed where Patient Found",
];

pub const BUILDING_HEADERS: [&str; 4] = [
    "HL7 Document Type",
    "HL7 Summary Line",
    NO_PHRASE_FREQ_HEADER,
    NO_PATIENT_FREQ_HEADER,
];

#[derive(Debug, Clone, Copy)]
struct DocumentColumns {
    phrase: usize,
    member_phrase: usize,
    member_indexed: usize,
    summary_phrase: usize,
    summary_indexed: usize,
    dos_phrase: usize,
    dos_indexed: usize,
    signature_phrase: usize,
    signature_indexed: usize,
    patient_phrase: usize,
    patient_indexed: usize,
    provider_phrase: usize,
    provider_indexed: usize,
    patient_flag: usize,
    document_type: usize,
    summary_line: usize,
    status: usize,
    indexer_review: usize,
    /// Rows narrower than this cannot be classified and are skipped.
    width: usize,
}

impl DocumentColumns {
    fn resolve(headers: &[String]) -> Result<Self, TableError> {
        let columns = Self {
            phrase: find_column(headers, PHRASE_HEADER)?,
            member_phrase: find_column(headers, "Member (Phrase)")?,
            member_indexed: find_column(headers, "Member (Indexed)")?,
            summary_phrase: find_column(headers, "Summary (Phrase)")?,
            summary_indexed: find_column(headers, "Summary (Indexed)")?,
            dos_phrase: find_column(headers, "DOS (Phrase)")?,
            dos_indexed: find_column(headers, "DOS (Indexed)")?,
            signature_phrase: find_column(headers, "Signature (Phrase)")?,
            signature_indexed: find_column(headers, "Signature (Indexed)")?,
            patient_phrase: find_column(headers, "Patient (Phrase)")?,
            patient_indexed: find_column(headers, "Patient (Indexed)")?,
            provider_phrase: find_column(headers, "Provider (Phrase)")?,
            provider_indexed: find_column(headers, "Provider (Indexed)")?,
            patient_flag: find_column(headers, "Patient Flag")?,
            document_type: find_column(headers, "HL7 Document Type")?,
            summary_line: find_column(headers, "HL7 Summary Line")?,
            status: find_column(headers, "Status")?,
            indexer_review: find_column(headers, "Indexer Review")?,
            width: 0,
        };

        let width = 1 + [
            columns.phrase,
            columns.member_phrase,
            columns.member_indexed,
            columns.summary_phrase,
            columns.summary_indexed,
            columns.dos_phrase,
            columns.dos_indexed,
            columns.signature_phrase,
            columns.signature_indexed,
            columns.patient_phrase,
            columns.patient_indexed,
            columns.provider_phrase,
            columns.provider_indexed,
            columns.patient_flag,
            columns.document_type,
            columns.summary_line,
            columns.status,
            columns.indexer_review,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        Ok(Self { width, ..columns })
    }

    fn record_from(&self, row: &StringRecord, header_count: usize) -> DocumentRecord {
        let field = |index: usize| row.get(index).unwrap_or("").to_string();

        DocumentRecord {
            phrase_id: row.get(self.phrase).unwrap_or("").trim().to_string(),
            member_phrase: field(self.member_phrase),
            member_indexed: field(self.member_indexed),
            summary_phrase: field(self.summary_phrase),
            summary_indexed: field(self.summary_indexed),
            dos_phrase: field(self.dos_phrase),
            dos_indexed: field(self.dos_indexed),
            signature_phrase: field(self.signature_phrase),
            signature_indexed: field(self.signature_indexed),
            patient_phrase: field(self.patient_phrase),
            patient_indexed: field(self.patient_indexed),
            provider_phrase: field(self.provider_phrase),
            provider_indexed: field(self.provider_indexed),
            patient_flag_text: field(self.patient_flag),
            document_type: field(self.document_type),
            summary_line: field(self.summary_line),
            indexing_status: field(self.status),
            indexer_review_flag: field(self.indexer_review),
            raw: rectangular_row(row, header_count),
        }
    }
}

fn find_column(headers: &[String], name: &str) -> Result<usize, TableError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| TableError::MissingColumn {
            name: name.to_string(),
        })
}

/// Row values normalized to exactly the header width: short rows padded with
/// blanks, overlong rows truncated. Keeps the re-emitted tables rectangular.
fn rectangular_row(row: &StringRecord, header_count: usize) -> Vec<String> {
    (0..header_count)
        .map(|index| row.get(index).unwrap_or("").to_string())
        .collect()
}

pub fn load_documents(path: &Path) -> Result<DocumentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open document table {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let columns = DocumentColumns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0_usize;

    for result in reader.records() {
        let row =
            result.with_context(|| format!("failed to read row in {}", path.display()))?;

        if row.len() < columns.width {
            skipped_rows += 1;
            continue;
        }

        records.push(columns.record_from(&row, headers.len()));
    }

    if records.is_empty() && skipped_rows == 0 {
        return Err(TableError::EmptyTable {
            table: "document".to_string(),
        }
        .into());
    }

    Ok(DocumentTable {
        headers,
        records,
        skipped_rows,
    })
}

pub fn load_phrases(path: &Path) -> Result<PhraseTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open phrase table {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    if headers.first().map(String::as_str) != Some(PHRASE_HEADER) {
        return Err(TableError::MissingColumn {
            name: PHRASE_HEADER.to_string(),
        }
        .into());
    }

    if headers.len() <= REVIEW_DEFAULT_OFFSET {
        return Err(TableError::MissingColumn {
            name: format!("indexer review default (column {})", REVIEW_DEFAULT_OFFSET + 1),
        }
        .into());
    }

    let mut entries = Vec::new();

    for result in reader.records() {
        let row =
            result.with_context(|| format!("failed to read row in {}", path.display()))?;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        entries.push(PhraseEntry {
            phrase_id: row.get(0).unwrap_or("").trim().to_string(),
            review_default: row.get(REVIEW_DEFAULT_OFFSET).unwrap_or("").to_string(),
            raw: rectangular_row(&row, headers.len()),
        });
    }

    if entries.is_empty() {
        return Err(TableError::EmptyTable {
            table: "phrase reference".to_string(),
        }
        .into());
    }

    Ok(PhraseTable::new(headers, entries)?)
}

pub fn write_augmented(
    path: &Path,
    documents: &DocumentTable,
    classified: &[ClassifiedRecord],
    frequencies: &FrequencyIndex,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut headers = documents.headers.clone();
    headers.extend(MATCH_HEADERS.iter().map(|header| header.to_string()));
    headers.push(REVIEW_DEFAULT_HEADER.to_string());
    headers.push(NO_PHRASE_FREQ_HEADER.to_string());
    headers.push(NO_PATIENT_FREQ_HEADER.to_string());

    writer
        .write_record(&headers)
        .with_context(|| format!("failed to write headers to {}", path.display()))?;

    for classified_record in classified {
        let record = &classified_record.record;
        let matches = &classified_record.matches;

        let mut row = record.raw.clone();
        row.push(matches.member.as_str().to_string());
        row.push(matches.summary.as_str().to_string());
        row.push(matches.dos.as_str().to_string());
        row.push(matches.signature.as_str().to_string());
        row.push(matches.patient.as_str().to_string());
        row.push(matches.provider.as_str().to_string());
        row.push(matches.review_default.clone());
        row.push(
            frequencies
                .no_phrase_count(&record.document_type, &record.summary_line)
                .to_string(),
        );
        row.push(
            frequencies
                .no_patient_count(&record.document_type, &record.summary_line)
                .to_string(),
        );

        writer
            .write_record(&row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}

pub fn write_maintenance(
    path: &Path,
    phrases: &PhraseTable,
    aggregates: &[PhraseAggregate],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut headers = phrases.headers.clone();
    headers.extend(COUNTER_HEADERS.iter().map(|header| header.to_string()));

    writer
        .write_record(&headers)
        .with_context(|| format!("failed to write headers to {}", path.display()))?;

    for aggregate in aggregates {
        let Some(entry) = phrases.entry(&aggregate.phrase_id) else {
            continue;
        };

        let mut row = entry.raw.clone();
        row.push(aggregate.total_hits.to_string());
        row.push(aggregate.member_changed.to_string());
        row.push(aggregate.summary_changed.to_string());
        row.push(aggregate.dos_changed.to_string());
        row.push(aggregate.signature_changed.to_string());
        row.push(aggregate.patient_changed.to_string());
        row.push(aggregate.provider_changed_patient_found.to_string());

        writer
            .write_record(&row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}

pub fn write_building(path: &Path, candidates: &[CandidateEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer
        .write_record(&BUILDING_HEADERS)
        .with_context(|| format!("failed to write headers to {}", path.display()))?;

    for candidate in candidates {
        let row = [
            candidate.document_type.clone(),
            candidate.summary_line.clone(),
            candidate.no_phrase_count.to_string(),
            candidate.no_patient_count.to_string(),
        ];

        writer
            .write_record(&row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}
