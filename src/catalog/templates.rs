//! Static query templates
//!
//! Every template selects the newest `row_limit` rows by `ID` and returns
//! them in ascending `ID` order. `?1` is the lookup value (a JSON array for
//! list templates), `?2` the row limit.

use super::modes::{FilterField, SearchMode};
use super::tables::TableRef;

/// How the lookup value is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// One text parameter
    Single,
    /// One JSON array parameter, expanded with `json_each`
    JsonList,
}

/// A parameterized, read-only query against one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub table: TableRef,
    pub label: &'static str,
    pub required: &'static [FilterField],
    pub sql: &'static str,
    pub row_limit: u32,
    pub binding: Binding,
}

impl QueryTemplate {
    /// The field whose value is bound to `?1`
    pub fn lookup_field(&self) -> FilterField {
        self.required[0]
    }
}

pub const TIXLOG_LIMIT: u32 = 1000;
pub const MIX100_LIMIT: u32 = 500;
pub const MCLOG_CCT_LIMIT: u32 = 5000;
pub const MCLOG_CAD_LIMIT: u32 = 1000;

pub const MIX100_BY_CONTROL_NUMBER: QueryTemplate = QueryTemplate {
    table: TableRef::MIX100,
    label: "MIX100",
    required: &[FilterField::ControlNumber],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.MIX100 \
            WHERE NR_CONTROLE = ?1 \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: MIX100_LIMIT,
    binding: Binding::Single,
};

pub const MIX100_BY_END_TO_END_ID: QueryTemplate = QueryTemplate {
    table: TableRef::MIX100,
    label: "MIX100",
    required: &[FilterField::EndToEndId],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.MIX100 \
            WHERE ENDTOENDIDDEVOLUCAO = ?1 \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: MIX100_LIMIT,
    binding: Binding::Single,
};

pub const MCLOG_CCT_BY_KYT_ID: QueryTemplate = QueryTemplate {
    table: TableRef::MCLOG_CCT,
    label: "MCLOG CCT",
    required: &[FilterField::KytId],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_cct.MCLOG \
            WHERE icontains(OUTRAS_INFO, ?1) \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: MCLOG_CCT_LIMIT,
    binding: Binding::Single,
};

pub const TIXLOG_BY_CONTROL_NUMBER: QueryTemplate = QueryTemplate {
    table: TableRef::TIXLOG,
    label: "TIXLOG",
    required: &[FilterField::ControlNumber],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.TIXLOG \
            WHERE NR_CONTROLE = ?1 \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: TIXLOG_LIMIT,
    binding: Binding::Single,
};

pub const TIXLOG_BY_IDREQJDPI: QueryTemplate = QueryTemplate {
    table: TableRef::TIXLOG,
    label: "TIXLOG",
    required: &[FilterField::IdReqJdpi],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.TIXLOG \
            WHERE IDREQJDPI = ?1 \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: TIXLOG_LIMIT,
    binding: Binding::Single,
};

pub const TIXLOG_BY_CONTROL_NUMBER_LIST: QueryTemplate = QueryTemplate {
    table: TableRef::TIXLOG,
    label: "TIXLOG",
    required: &[FilterField::ControlNumbers],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.TIXLOG \
            WHERE NR_CONTROLE IN (SELECT value FROM json_each(?1)) \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: TIXLOG_LIMIT,
    binding: Binding::JsonList,
};

pub const TIXLOG_BY_JSON_CONTENT: QueryTemplate = QueryTemplate {
    table: TableRef::TIXLOG,
    label: "TIXLOG",
    required: &[FilterField::Text],
    sql: "SELECT * FROM (\
            SELECT *, \
              CASE \
                WHEN icontains(JSON, ?1) AND icontains(JSON_RETORNO, ?1) THEN 'BOTH' \
                WHEN icontains(JSON, ?1) THEN 'JSON' \
                ELSE 'JSON_RETORNO' \
              END AS MATCH_LOCATION \
            FROM indigo_pix.TIXLOG \
            WHERE icontains(JSON, ?1) OR icontains(JSON_RETORNO, ?1) \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: TIXLOG_LIMIT,
    binding: Binding::Single,
};

pub const TIXLOG_BY_ORIGIN: QueryTemplate = QueryTemplate {
    table: TableRef::TIXLOG,
    label: "TIXLOG",
    required: &[FilterField::Origin],
    sql: "SELECT * FROM (\
            SELECT * FROM indigo_pix.TIXLOG \
            WHERE ORIGEM = ?1 \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC",
    row_limit: TIXLOG_LIMIT,
    binding: Binding::Single,
};

const MCAD_FREE_TEXT_SQL: &str = "SELECT * FROM (\
            SELECT * FROM indigo_cad.MCLOG \
            WHERE icontains(OUTRAS_INFO, ?1) \
            ORDER BY ID DESC LIMIT ?2\
          ) ORDER BY ID ASC";

pub const MCAD_BY_FREE_TEXT: QueryTemplate = QueryTemplate {
    table: TableRef::MCLOG_CAD,
    label: "MCLOG CAD",
    required: &[FilterField::Text],
    sql: MCAD_FREE_TEXT_SQL,
    row_limit: MCLOG_CAD_LIMIT,
    binding: Binding::Single,
};

/// MCLOG CAD free-text search keyed on a control number (360 search)
pub const MCAD_BY_CONTROL_NUMBER: QueryTemplate = QueryTemplate {
    table: TableRef::MCLOG_CAD,
    label: "MCLOG CAD",
    required: &[FilterField::ControlNumber],
    sql: MCAD_FREE_TEXT_SQL,
    row_limit: MCLOG_CAD_LIMIT,
    binding: Binding::Single,
};

const CROSS_TABLE_360: [QueryTemplate; 3] = [
    MIX100_BY_CONTROL_NUMBER,
    TIXLOG_BY_CONTROL_NUMBER,
    MCAD_BY_CONTROL_NUMBER,
];

/// Templates run for `mode`, in execution order.
pub fn template_for(mode: SearchMode) -> &'static [QueryTemplate] {
    match mode {
        SearchMode::CrossTable360 => &CROSS_TABLE_360,
        SearchMode::Mix100ByEndToEndId => std::slice::from_ref(&MIX100_BY_END_TO_END_ID),
        SearchMode::MclogCctByKytId => std::slice::from_ref(&MCLOG_CCT_BY_KYT_ID),
        SearchMode::TixlogByControlNumber => std::slice::from_ref(&TIXLOG_BY_CONTROL_NUMBER),
        SearchMode::TixlogByIdReqJdpi => std::slice::from_ref(&TIXLOG_BY_IDREQJDPI),
        SearchMode::TixlogByControlNumberList => {
            std::slice::from_ref(&TIXLOG_BY_CONTROL_NUMBER_LIST)
        }
        SearchMode::TixlogByJsonContent => std::slice::from_ref(&TIXLOG_BY_JSON_CONTENT),
        SearchMode::TixlogByOrigin => std::slice::from_ref(&TIXLOG_BY_ORIGIN),
        SearchMode::McadByFreeText => std::slice::from_ref(&MCAD_BY_FREE_TEXT),
    }
}

/// Complementary template run once per lookup value of a TIXLOG mode.
pub fn complement_for(mode: SearchMode) -> Option<&'static QueryTemplate> {
    if mode.is_tixlog() {
        Some(&MCAD_BY_FREE_TEXT)
    } else {
        None
    }
}
