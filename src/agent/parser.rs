//! Parser for the controller's two-subtask completion format.
//!
//! The model is instructed to answer in two segments separated by a
//! literal `---`: the reformulated query (labeled `Subtask 1:`) and one
//! score line per candidate source (labeled `Subtask 2:`). This module
//! treats that format as a strict mini-grammar with explicit failure
//! modes: a missing delimiter is fatal to the planning cycle, while a
//! single bad score line is dropped without aborting the plan.

use tracing::debug;

use super::source::SourceRegistry;
use crate::error::Error;

/// Delimiter between the reformulation segment and the score segment.
const SEGMENT_DELIMITER: &str = "---";
/// Label prefixing the reformulated query segment.
const QUERY_LABEL: &str = "Subtask 1:";
/// Label prefixing the score segment.
const SCORES_LABEL: &str = "Subtask 2:";
/// Literal answer the model gives when no source is relevant.
const NO_SOURCE_LITERAL: &str = "unknown";

/// A successfully split plan response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlanResponse {
    /// The reformulated user query.
    pub reformulated_query: String,
    /// Raw score lines, one per candidate source.
    pub score_lines: Vec<String>,
}

/// A source name paired with its model-assigned score.
///
/// Transient: produced by parsing, consumed immediately by
/// filtering and sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSource {
    /// Registered source name.
    pub name: String,
    /// Score out of 10 assigned by the model.
    pub score: f64,
}

/// Strips a segment label and surrounding whitespace.
///
/// Handles the label with or without a trailing space. Idempotent:
/// stripping an already-stripped segment leaves it unchanged.
fn strip_label<'a>(segment: &'a str, label: &str) -> &'a str {
    let trimmed = segment.trim();
    trimmed.strip_prefix(label).unwrap_or(trimmed).trim()
}

/// Splits a completion into the reformulated query and the score lines.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when the text lacks the
/// two-segment `---` delimiter. Callers recover by treating the
/// planning cycle as producing an empty plan.
pub fn parse_plan_response(raw: &str) -> Result<ParsedPlanResponse, Error> {
    let Some((query_segment, scores_segment)) = raw.split_once(SEGMENT_DELIMITER) else {
        return Err(Error::MalformedResponse {
            message: format!("expected two segments separated by {SEGMENT_DELIMITER:?}"),
            content: raw.to_string(),
        });
    };

    let reformulated_query = strip_label(query_segment, QUERY_LABEL).to_string();
    let score_lines = strip_label(scores_segment, SCORES_LABEL)
        .lines()
        .map(str::to_string)
        .collect();

    Ok(ParsedPlanResponse {
        reformulated_query,
        score_lines,
    })
}

/// Parses a single `name;score[;justification]` line.
///
/// Returns `None` — never an error — for anything that should simply
/// not become a plan candidate: the literal `unknown` answer, a line
/// with fewer than two fields, an unparsable score, or a name that does
/// not match a registered source. Fields past the score (e.g. a
/// justification) are ignored.
#[must_use]
pub fn parse_score_line(line: &str, sources: &SourceRegistry) -> Option<ScoredSource> {
    let line = line.trim();
    if line.is_empty() || line == NO_SOURCE_LITERAL {
        return None;
    }

    let mut fields = line.split(';');
    let name = fields.next()?.trim();
    let Some(score_field) = fields.next() else {
        debug!(line, "score line has fewer than two fields, dropped");
        return None;
    };

    let Ok(score) = score_field.trim().parse::<f64>() else {
        debug!(line, score_field, "unparsable score, line dropped");
        return None;
    };

    if !sources.contains(name) {
        debug!(line, name, "unresolved source name, line dropped");
        return None;
    }

    Some(ScoredSource {
        name: name.to_string(),
        score,
    })
}
