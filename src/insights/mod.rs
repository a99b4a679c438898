//! Insights: facts derived from result rows for presentation
//!
//! Pure functions, no database access.

use crate::catalog::TableRef;
use crate::connection::functions::contains_ignore_case;
use crate::connection::ResultRow;
use crate::search::{GroupRole, SearchResult};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Keywords marking a KYT decision row in `OUTRAS_INFO`
pub const DECISION_KEYWORDS: [&str; 6] = [
    "aprovado",
    "rejeitado",
    "approved",
    "rejected",
    "\"ALLOW\"",
    "\"DENY\"",
];

/// MIX100 `STATUS_MENSAGEM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mix100Status {
    Returned,
    Awaiting,
    Settled,
    Error,
    EmptyOrUnknown,
    Unrecognized(String),
}

impl Mix100Status {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "D" => Mix100Status::Returned,
            "A" => Mix100Status::Awaiting,
            "L" => Mix100Status::Settled,
            "E" => Mix100Status::Error,
            "V" => Mix100Status::EmptyOrUnknown,
            other => Mix100Status::Unrecognized(other.to_string()),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Mix100Status::Returned => "returned".to_string(),
            Mix100Status::Awaiting => "awaiting".to_string(),
            Mix100Status::Settled => "settled".to_string(),
            Mix100Status::Error => "error".to_string(),
            Mix100Status::EmptyOrUnknown => "empty or unknown value".to_string(),
            Mix100Status::Unrecognized(code) => format!("unrecognized status ({code})"),
        }
    }
}

/// Status of the newest MIX100 row (rows in ascending `ID` order).
pub fn latest_mix100_status(rows: &[ResultRow]) -> Option<Mix100Status> {
    rows.last()
        .and_then(|row| row.get_str("STATUS_MENSAGEM"))
        .map(Mix100Status::from_code)
}

/// Final KYT decision found in MCLOG CCT rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KytDecision {
    /// `action` from the embedded JSON, if it parsed
    pub action: Option<String>,
    /// Set when the embedded JSON is malformed
    pub json_error: bool,
    pub decided_at: Option<String>,
    pub details: JsonValue,
}

/// Newest row whose `OUTRAS_INFO` carries a decision keyword.
///
/// Rows are expected in ascending `ID` order, so the search runs backwards.
pub fn kyt_decision(rows: &[ResultRow]) -> Option<KytDecision> {
    let row = rows.iter().rev().find(|row| {
        row.get_str("OUTRAS_INFO").is_some_and(|info| {
            DECISION_KEYWORDS
                .iter()
                .any(|keyword| contains_ignore_case(info, keyword))
        })
    })?;
    let info = row.get_str("OUTRAS_INFO")?;

    let (action, json_error) = match info.find('{') {
        Some(start) => match serde_json::from_str::<JsonValue>(&info[start..]) {
            Ok(parsed) => (
                parsed
                    .get("action")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
                false,
            ),
            Err(_) => (None, true),
        },
        None => (None, false),
    };

    Some(KytDecision {
        action,
        json_error,
        decided_at: row.get_str("DATAHORA").map(str::to_string),
        details: extract_json(info),
    })
}

/// Insights attached to a search result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mix100_status: Option<Mix100Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyt_decision: Option<KytDecision>,
}

impl SearchInsights {
    pub fn is_empty(&self) -> bool {
        self.mix100_status.is_none() && self.kyt_decision.is_none()
    }
}

/// Derive insights from the primary MIX100 and MCLOG CCT groups of `result`.
pub fn for_search(result: &SearchResult) -> SearchInsights {
    let primary = |table| {
        result
            .group(table, GroupRole::Primary)
            .map(|g| g.rows.as_slice())
            .unwrap_or_default()
    };
    SearchInsights {
        mix100_status: latest_mix100_status(primary(TableRef::MIX100)),
        kyt_decision: kyt_decision(primary(TableRef::MCLOG_CCT)),
    }
}

/// Parse the JSON object starting at the first `{`, else the whole text.
///
/// Text that is not JSON at all comes back as a JSON string.
pub fn extract_json(text: &str) -> JsonValue {
    if let Some(start) = text.find('{') {
        if let Ok(parsed) = serde_json::from_str(&text[start..]) {
            return parsed;
        }
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}
