use std::collections::HashMap;

use thiserror::Error;

pub const MANUALLY_INDEXED: &str = "Manually Indexed";
pub const REVIEW_CONFIRMED: &str = "Yes";

/// Value written to the indexer-review column when the phrase id has no
/// entry in the reference table.
pub const LOOKUP_MISS: &str = "#N/A";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("required column missing: {name}")]
    MissingColumn { name: String },

    #[error("{table} table has no data rows")]
    EmptyTable { table: String },

    #[error("duplicate phrase id in reference table: {phrase_id}")]
    DuplicatePhrase { phrase_id: String },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchOutcome {
    ExactMatch,
    NeedsReview,
    NotFound,
    PtnfExactMatch,
    PtnfNeedsReview,
}

impl MatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactMatch => "EXACTMATCH",
            Self::NeedsReview => "NEEDSREVIEW",
            Self::NotFound => "NOTFOUND",
            Self::PtnfExactMatch => "PTNFEXACTMATCH",
            Self::PtnfNeedsReview => "PTNFNEEDSREVIEW",
        }
    }
}

/// A phrase id of "0" or blank means no phrase matched the document.
pub fn is_no_phrase(phrase_id: &str) -> bool {
    let trimmed = phrase_id.trim();
    trimmed.is_empty() || trimmed == "0"
}

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub phrase_id: String,
    pub member_phrase: String,
    pub member_indexed: String,
    pub summary_phrase: String,
    pub summary_indexed: String,
    pub dos_phrase: String,
    pub dos_indexed: String,
    pub signature_phrase: String,
    pub signature_indexed: String,
    pub patient_phrase: String,
    pub patient_indexed: String,
    pub provider_phrase: String,
    pub provider_indexed: String,
    pub patient_flag_text: String,
    pub document_type: String,
    pub summary_line: String,
    pub indexing_status: String,
    pub indexer_review_flag: String,
    /// Original column values in source order, re-emitted in the augmented
    /// report ahead of the derived columns.
    pub raw: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentTable {
    pub headers: Vec<String>,
    pub records: Vec<DocumentRecord>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct PhraseEntry {
    pub phrase_id: String,
    pub review_default: String,
    pub raw: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PhraseTable {
    pub headers: Vec<String>,
    pub entries: Vec<PhraseEntry>,
    index: HashMap<String, usize>,
}

impl PhraseTable {
    pub fn new(headers: Vec<String>, entries: Vec<PhraseEntry>) -> Result<Self, TableError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.phrase_id.clone(), position).is_some() {
                return Err(TableError::DuplicatePhrase {
                    phrase_id: entry.phrase_id.clone(),
                });
            }
        }

        Ok(Self {
            headers,
            entries,
            index,
        })
    }

    pub fn entry(&self, phrase_id: &str) -> Option<&PhraseEntry> {
        self.index
            .get(phrase_id)
            .map(|position| &self.entries[*position])
    }

    pub fn review_default(&self, phrase_id: &str) -> Option<&str> {
        self.entry(phrase_id)
            .map(|entry| entry.review_default.as_str())
    }

    pub fn contains(&self, phrase_id: &str) -> bool {
        self.index.contains_key(phrase_id)
    }
}

#[derive(Debug, Clone)]
pub struct MatchFields {
    pub member: MatchOutcome,
    pub summary: MatchOutcome,
    pub dos: MatchOutcome,
    pub signature: MatchOutcome,
    pub patient: MatchOutcome,
    pub provider: MatchOutcome,
    pub review_default: String,
}

#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub record: DocumentRecord,
    pub matches: MatchFields,
}

#[derive(Debug, Clone)]
pub struct PhraseAggregate {
    pub phrase_id: String,
    pub total_hits: u64,
    pub member_changed: u64,
    pub summary_changed: u64,
    pub dos_changed: u64,
    pub signature_changed: u64,
    pub patient_changed: u64,
    pub provider_changed_patient_found: u64,
}

impl PhraseAggregate {
    pub fn new(phrase_id: String) -> Self {
        Self {
            phrase_id,
            total_hits: 0,
            member_changed: 0,
            summary_changed: 0,
            dos_changed: 0,
            signature_changed: 0,
            patient_changed: 0,
            provider_changed_patient_found: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateEntry {
    pub document_type: String,
    pub summary_line: String,
    pub no_phrase_count: u64,
    pub no_patient_count: u64,
}
