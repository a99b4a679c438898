//! Search modes and filter fields

use crate::errors::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::error;

/// Closed set of search modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// MIX100 + TIXLOG + MCLOG CAD by control number
    CrossTable360,
    Mix100ByEndToEndId,
    MclogCctByKytId,
    TixlogByControlNumber,
    TixlogByIdReqJdpi,
    TixlogByControlNumberList,
    TixlogByJsonContent,
    TixlogByOrigin,
    McadByFreeText,
}

impl SearchMode {
    pub const ALL: [SearchMode; 9] = [
        SearchMode::CrossTable360,
        SearchMode::Mix100ByEndToEndId,
        SearchMode::MclogCctByKytId,
        SearchMode::TixlogByControlNumber,
        SearchMode::TixlogByIdReqJdpi,
        SearchMode::TixlogByControlNumberList,
        SearchMode::TixlogByJsonContent,
        SearchMode::TixlogByOrigin,
        SearchMode::McadByFreeText,
    ];

    /// Stable command-line name
    pub fn name(self) -> &'static str {
        match self {
            SearchMode::CrossTable360 => "cross-table-360",
            SearchMode::Mix100ByEndToEndId => "mix100-end-to-end",
            SearchMode::MclogCctByKytId => "mclog-cct-kyt",
            SearchMode::TixlogByControlNumber => "tixlog-control-number",
            SearchMode::TixlogByIdReqJdpi => "tixlog-idreqjdpi",
            SearchMode::TixlogByControlNumberList => "tixlog-control-number-list",
            SearchMode::TixlogByJsonContent => "tixlog-json-content",
            SearchMode::TixlogByOrigin => "tixlog-origin",
            SearchMode::McadByFreeText => "mcad-free-text",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SearchMode::CrossTable360 => "360 search by control number across MIX100, TIXLOG and MCLOG CAD",
            SearchMode::Mix100ByEndToEndId => "MIX100 returns by end-to-end id",
            SearchMode::MclogCctByKytId => "MCLOG CCT risk screening by KYT transaction id",
            SearchMode::TixlogByControlNumber => "TIXLOG by control number",
            SearchMode::TixlogByIdReqJdpi => "TIXLOG by request id",
            SearchMode::TixlogByControlNumberList => "TIXLOG by a list of control numbers",
            SearchMode::TixlogByJsonContent => "TIXLOG by text inside the sent or returned JSON",
            SearchMode::TixlogByOrigin => "TIXLOG by origin",
            SearchMode::McadByFreeText => "MCLOG CAD by free text in OUTRAS_INFO",
        }
    }

    /// The one filter field the mode is keyed on
    pub fn lookup_field(self) -> FilterField {
        match self {
            SearchMode::CrossTable360 | SearchMode::TixlogByControlNumber => {
                FilterField::ControlNumber
            }
            SearchMode::Mix100ByEndToEndId => FilterField::EndToEndId,
            SearchMode::MclogCctByKytId => FilterField::KytId,
            SearchMode::TixlogByIdReqJdpi => FilterField::IdReqJdpi,
            SearchMode::TixlogByControlNumberList => FilterField::ControlNumbers,
            SearchMode::TixlogByJsonContent | SearchMode::McadByFreeText => FilterField::Text,
            SearchMode::TixlogByOrigin => FilterField::Origin,
        }
    }

    /// Modes whose primary table is TIXLOG
    pub fn is_tixlog(self) -> bool {
        matches!(
            self,
            SearchMode::TixlogByControlNumber
                | SearchMode::TixlogByIdReqJdpi
                | SearchMode::TixlogByControlNumberList
                | SearchMode::TixlogByJsonContent
                | SearchMode::TixlogByOrigin
        )
    }

    /// Modes that also report the TIXLOG transaction summary
    pub fn has_summary(self) -> bool {
        matches!(
            self,
            SearchMode::CrossTable360 | SearchMode::TixlogByControlNumber
        )
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                error!(mode = wanted, "unknown search mode");
                Error::UnknownMode(wanted.to_string())
            })
    }
}

impl Serialize for SearchMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Whether a field takes one value or a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Single,
    List,
}

/// Named search inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    ControlNumber,
    ControlNumbers,
    EndToEndId,
    KytId,
    IdReqJdpi,
    Text,
    Origin,
}

impl FilterField {
    pub fn name(self) -> &'static str {
        match self {
            FilterField::ControlNumber => "control_number",
            FilterField::ControlNumbers => "control_numbers",
            FilterField::EndToEndId => "end_to_end_id",
            FilterField::KytId => "kyt_id",
            FilterField::IdReqJdpi => "idreqjdpi",
            FilterField::Text => "text",
            FilterField::Origin => "origin",
        }
    }

    pub fn shape(self) -> FieldShape {
        match self {
            FilterField::ControlNumbers => FieldShape::List,
            _ => FieldShape::Single,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FilterField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
