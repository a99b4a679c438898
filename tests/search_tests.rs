//! Search orchestrator tests against real SQLite catalogs
//!
//! Tests cover:
//! - 360 search across MIX100, TIXLOG and MCLOG CAD
//! - Control number lists (dedupe, complementary MCLOG)
//! - Case-insensitive free text and JSON content matching
//! - `%` and `_` in lookup values match literally
//! - Newest-N row limit returned in ascending order
//! - Validation before any query runs
//! - Read-only session

mod common;

use anyhow::Result;
use common::{Catalogs, TixlogRow};
use logscope::catalog::TableRef;
use logscope::insights::{self, Mix100Status};
use logscope::search::GroupRole;
use logscope::stats::Direction;
use logscope::{search, search_with, Error, FilterField, FilterInput, SearchMode, SearchOptions};

fn seeded() -> Result<Catalogs> {
    let catalogs = Catalogs::create()?;

    catalogs.mix100(1, "CTRL-001", "E2E-RET-1", "A")?;
    catalogs.mix100(2, "CTRL-002", "E2E-RET-2", "E")?;
    catalogs.mix100(3, "CTRL-001", "E2E-RET-1", "L")?;

    catalogs.tixlog(TixlogRow {
        id: 10,
        control_number: Some("CTRL-001"),
        datahora: "2024-05-01 10:00:00.000",
        usuario: "envia_pix_prod",
        descricao: "Envio PIX débito",
        idreqjdpi: "REQ-1",
        json: r#"{"valor": 10.5, "chave": "abc"}"#,
        ..TixlogRow::default()
    })?;
    catalogs.tixlog(TixlogRow {
        id: 11,
        control_number: Some("CTRL-002"),
        datahora: "2024-05-01 10:00:01.000",
        origem: "STR",
        json_retorno: r#"{"erro": "TIMEOUT"}"#,
        ..TixlogRow::default()
    })?;
    catalogs.tixlog(TixlogRow {
        id: 12,
        control_number: Some("CTRL-001"),
        datahora: "2024-05-01 10:00:02.500",
        json: r#"{"status": "timeout"}"#,
        json_retorno: r#"{"erro": "Timeout"}"#,
        ..TixlogRow::default()
    })?;

    catalogs.mclog("indigo_cad.db", 1, "2024-05-01 10:00:00.000", Some("ENVIO"), "I", "envio CTRL-001 iniciado")?;
    catalogs.mclog("indigo_cad.db", 2, "2024-05-01 10:00:01.000", Some("ENVIO"), "I", "sem relacao")?;
    catalogs.mclog("indigo_cad.db", 3, "2024-05-01 10:00:02.000", Some("RETORNO"), "E", "falha ctrl-001")?;
    catalogs.mclog("indigo_cad.db", 4, "2024-05-01 10:00:03.000", Some("ENVIO"), "I", "envio CTRL-002")?;

    catalogs.mclog("indigo_cct.db", 1, "2024-05-01 10:00:00.000", Some("KYT"), "I", "request KYT-9 sent")?;
    catalogs.mclog(
        "indigo_cct.db",
        2,
        "2024-05-01 10:00:01.000",
        Some("KYT"),
        "I",
        r#"response kyt-9 {"action": "ALLOW", "score": 12}"#,
    )?;

    Ok(catalogs)
}

fn ids(rows: &[logscope::ResultRow]) -> Vec<i64> {
    rows.iter().filter_map(|r| r.get_i64("ID")).collect()
}

#[test]
fn test_cross_table_finds_only_matching_rows() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let input = FilterInput::single(FilterField::ControlNumber, "CTRL-001");
    let result = search(&session, SearchMode::CrossTable360, &input)?;

    assert_eq!(result.groups.len(), 3);
    let mix = result.group(TableRef::MIX100, GroupRole::Primary).unwrap();
    assert_eq!(ids(&mix.rows), vec![1, 3]);
    let tix = result.group(TableRef::TIXLOG, GroupRole::Primary).unwrap();
    assert_eq!(ids(&tix.rows), vec![10, 12]);
    // free text match on OUTRAS_INFO ignores case
    let cad = result.group(TableRef::MCLOG_CAD, GroupRole::Primary).unwrap();
    assert_eq!(ids(&cad.rows), vec![1, 3]);

    let summary = result.summary.as_ref().unwrap();
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.duration_ms, 2500);
    assert_eq!(summary.direction, Direction::Out);

    let found = insights::for_search(&result);
    assert_eq!(found.mix100_status, Some(Mix100Status::Settled));

    session.close()?;
    Ok(())
}

#[test]
fn test_unknown_control_number_is_empty_not_error() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let input = FilterInput::single(FilterField::ControlNumber, "CTRL-999");
    let result = search(&session, SearchMode::CrossTable360, &input)?;

    assert!(result.is_empty());
    assert_eq!(result.total_rows(), 0);
    assert!(result.summary.is_none());
    Ok(())
}

#[test]
fn test_control_number_list_dedupes_and_complements() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let with_dupes = FilterInput::list(
        FilterField::ControlNumbers,
        ["CTRL-001", " CTRL-002 ", "", "CTRL-001"],
    );
    let result = search(&session, SearchMode::TixlogByControlNumberList, &with_dupes)?;

    let tix = result.group(TableRef::TIXLOG, GroupRole::Primary).unwrap();
    assert_eq!(ids(&tix.rows), vec![10, 11, 12]);
    let cad = result
        .group(TableRef::MCLOG_CAD, GroupRole::Complementary)
        .unwrap();
    let mut cad_ids = ids(&cad.rows);
    cad_ids.sort_unstable();
    assert_eq!(cad_ids, vec![1, 3, 4]);

    let clean = FilterInput::list(FilterField::ControlNumbers, ["CTRL-001", "CTRL-002"]);
    let again = search(&session, SearchMode::TixlogByControlNumberList, &clean)?;
    assert_eq!(again, result);
    Ok(())
}

#[test]
fn test_json_content_matches_case_insensitively() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let input = FilterInput::single(FilterField::Text, "TIMEOUT");
    let options = SearchOptions {
        complementary_mclog: false,
        ..SearchOptions::default()
    };
    let result = search_with(&session, SearchMode::TixlogByJsonContent, &input, options)?;

    assert_eq!(result.groups.len(), 1);
    let rows = &result.groups[0].rows;
    assert_eq!(ids(rows), vec![11, 12]);
    assert_eq!(rows[0].get_str("MATCH_LOCATION"), Some("JSON_RETORNO"));
    assert_eq!(rows[1].get_str("MATCH_LOCATION"), Some("BOTH"));
    Ok(())
}

#[test]
fn test_newest_rows_returned_ascending() -> Result<()> {
    let catalogs = Catalogs::create()?;
    catalogs.tixlog_bulk(1..=1005, "BULK")?;
    let session = catalogs.session()?;

    let input = FilterInput::single(FilterField::Origin, "BULK");
    let options = SearchOptions {
        complementary_mclog: false,
        ..SearchOptions::default()
    };
    let result = search_with(&session, SearchMode::TixlogByOrigin, &input, options)?;

    let got = ids(&result.groups[0].rows);
    assert_eq!(got.len(), 1000);
    assert_eq!(got.first(), Some(&6));
    assert_eq!(got.last(), Some(&1005));
    assert!(got.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

#[test]
fn test_free_text_wildcards_are_literal() -> Result<()> {
    let catalogs = Catalogs::create()?;
    catalogs.mclog("indigo_cad.db", 1, "2024-05-01 10:00:00.000", Some("ENVIO"), "E", "Operation TIMEOUT occurred")?;
    catalogs.mclog("indigo_cad.db", 2, "2024-05-01 10:00:01.000", Some("ENVIO"), "I", "desconto de 50% aplicado")?;
    catalogs.mclog("indigo_cad.db", 3, "2024-05-01 10:00:02.000", Some("ENVIO"), "I", "envio sem marcas")?;
    let session = catalogs.session()?;

    let cad_ids = |text: &str| -> Result<Vec<i64>> {
        let result = search(
            &session,
            SearchMode::McadByFreeText,
            &FilterInput::single(FilterField::Text, text),
        )?;
        Ok(result
            .group(TableRef::MCLOG_CAD, GroupRole::Primary)
            .map(|g| ids(&g.rows))
            .unwrap_or_default())
    };

    assert_eq!(cad_ids("timeout")?, vec![1]);
    assert!(cad_ids("_")?.is_empty());
    assert_eq!(cad_ids("%")?, vec![2]);
    assert_eq!(cad_ids("50%")?, vec![2]);
    Ok(())
}

#[test]
fn test_kyt_search_yields_decision() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let input = FilterInput::single(FilterField::KytId, "KYT-9");
    let result = search(&session, SearchMode::MclogCctByKytId, &input)?;

    let cct = result.group(TableRef::MCLOG_CCT, GroupRole::Primary).unwrap();
    assert_eq!(ids(&cct.rows), vec![1, 2]);
    let decision = insights::for_search(&result).kyt_decision.unwrap();
    assert_eq!(decision.action.as_deref(), Some("ALLOW"));
    assert_eq!(decision.details["score"], 12);
    Ok(())
}

#[test]
fn test_end_to_end_and_request_id_lookups() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let returns = search(
        &session,
        SearchMode::Mix100ByEndToEndId,
        &FilterInput::single(FilterField::EndToEndId, "E2E-RET-1"),
    )?;
    assert_eq!(ids(&returns.groups[0].rows), vec![1, 3]);

    let request = search(
        &session,
        SearchMode::TixlogByIdReqJdpi,
        &FilterInput::single(FilterField::IdReqJdpi, "REQ-1"),
    )?;
    let tix = request.group(TableRef::TIXLOG, GroupRole::Primary).unwrap();
    assert_eq!(ids(&tix.rows), vec![10]);
    Ok(())
}

#[test]
fn test_blank_value_is_validation_error() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    let err = search(
        &session,
        SearchMode::McadByFreeText,
        &FilterInput::single(FilterField::Text, "   "),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    Ok(())
}

#[test]
fn test_session_is_query_only() -> Result<()> {
    let catalogs = seeded()?;
    let session = catalogs.session()?;

    use logscope::QueryExecutor;
    let attempt = session.fetch("DELETE FROM indigo_pix.TIXLOG", &[]);
    assert!(attempt.is_err());

    let still_there = search(
        &session,
        SearchMode::TixlogByOrigin,
        &FilterInput::single(FilterField::Origin, "STR"),
    )?;
    assert_eq!(still_there.groups[0].rows.len(), 1);
    Ok(())
}
