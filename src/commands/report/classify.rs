use anyhow::{Context, Result};
use regex::Regex;

use super::types::{
    ClassifiedRecord, DocumentRecord, DocumentTable, LOOKUP_MISS, MatchFields, MatchOutcome,
    PhraseTable,
};

/// Matches the "no patient found" marker regardless of wording: "Not Found",
/// "NOT FOUND", "No patient found", and similar variants all contain "oun".
pub fn flag_pattern() -> Result<Regex> {
    Regex::new(r"(?i)oun").context("failed to compile patient flag pattern")
}

pub fn classify_documents(
    documents: &DocumentTable,
    phrases: &PhraseTable,
    flag_pattern: &Regex,
) -> Vec<ClassifiedRecord> {
    documents
        .records
        .iter()
        .map(|record| ClassifiedRecord {
            record: record.clone(),
            matches: classify_record(record, phrases, flag_pattern),
        })
        .collect()
}

pub fn classify_record(
    record: &DocumentRecord,
    phrases: &PhraseTable,
    flag_pattern: &Regex,
) -> MatchFields {
    let patient = patient_outcome(record, flag_pattern);
    let provider_equal = record.provider_phrase == record.provider_indexed;

    let review_default = phrases
        .review_default(&record.phrase_id)
        .unwrap_or(LOOKUP_MISS)
        .to_string();

    MatchFields {
        member: equality_outcome(&record.member_phrase, &record.member_indexed),
        summary: equality_outcome(&record.summary_phrase, &record.summary_indexed),
        dos: equality_outcome(&record.dos_phrase, &record.dos_indexed),
        signature: equality_outcome(&record.signature_phrase, &record.signature_indexed),
        patient,
        provider: provider_outcome(patient, provider_equal),
        review_default,
    }
}

fn equality_outcome(phrase_value: &str, indexed_value: &str) -> MatchOutcome {
    if phrase_value == indexed_value {
        MatchOutcome::ExactMatch
    } else {
        MatchOutcome::NeedsReview
    }
}

fn patient_outcome(record: &DocumentRecord, flag_pattern: &Regex) -> MatchOutcome {
    if flag_pattern.is_match(&record.patient_flag_text) {
        return MatchOutcome::NotFound;
    }

    equality_outcome(&record.patient_phrase, &record.patient_indexed)
}

/// Provider outcome depends on the patient outcome: when the patient was not
/// found the provider comparison reports through the PTNF states, otherwise
/// the plain equality check decides.
fn provider_outcome(patient: MatchOutcome, provider_equal: bool) -> MatchOutcome {
    match (patient, provider_equal) {
        (MatchOutcome::NotFound, true) => MatchOutcome::PtnfExactMatch,
        (MatchOutcome::NotFound, false) => MatchOutcome::PtnfNeedsReview,
        (_, true) => MatchOutcome::ExactMatch,
        (_, false) => MatchOutcome::NeedsReview,
    }
}
