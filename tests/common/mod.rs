//! Shared fixtures: the three log catalogs as SQLite files in a temp dir

#![allow(dead_code)]

use anyhow::Result;
use logscope::{ConnectionString, Session};
use rusqlite::{params, Connection};
use std::path::Path;
use tempfile::TempDir;

pub struct Catalogs {
    pub dir: TempDir,
}

pub struct TixlogRow<'a> {
    pub id: i64,
    pub control_number: Option<&'a str>,
    pub datahora: &'a str,
    pub usuario: &'a str,
    pub descricao: &'a str,
    pub origem: &'a str,
    pub idreqjdpi: &'a str,
    pub json: &'a str,
    pub json_retorno: &'a str,
}

impl Default for TixlogRow<'_> {
    fn default() -> Self {
        TixlogRow {
            id: 0,
            control_number: None,
            datahora: "2024-05-01 10:00:00.000",
            usuario: "",
            descricao: "",
            origem: "SPI",
            idreqjdpi: "",
            json: "",
            json_retorno: "",
        }
    }
}

impl Catalogs {
    /// Create empty `indigo_pix.db`, `indigo_cad.db` and `indigo_cct.db`.
    pub fn create() -> Result<Self> {
        let dir = tempfile::tempdir()?;

        let pix = Connection::open(dir.path().join("indigo_pix.db"))?;
        pix.execute_batch(
            "CREATE TABLE TIXLOG (
                ID INTEGER PRIMARY KEY,
                NR_CONTROLE TEXT,
                DATAHORA TEXT NOT NULL,
                USUARIO TEXT,
                DESCRICAO TEXT,
                ORIGEM TEXT,
                IDREQJDPI TEXT,
                JSON TEXT,
                JSON_RETORNO TEXT
            );
            CREATE TABLE MIX100 (
                ID INTEGER PRIMARY KEY,
                NR_CONTROLE TEXT,
                ENDTOENDIDDEVOLUCAO TEXT,
                STATUS_MENSAGEM TEXT,
                DATAHORA TEXT
            );",
        )?;

        let mclog_schema = "CREATE TABLE MCLOG (
                ID INTEGER PRIMARY KEY,
                USUARIO TEXT,
                DATAHORA TEXT NOT NULL,
                FUNCAO TEXT,
                IAE TEXT,
                OUTRAS_INFO TEXT,
                CODIGO_CLIENTE TEXT
            );";
        Connection::open(dir.path().join("indigo_cad.db"))?.execute_batch(mclog_schema)?;
        Connection::open(dir.path().join("indigo_cct.db"))?.execute_batch(mclog_schema)?;

        Ok(Catalogs { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn open(&self, file: &str) -> Result<Connection> {
        Ok(Connection::open(self.dir.path().join(file))?)
    }

    pub fn tixlog(&self, row: TixlogRow<'_>) -> Result<()> {
        self.open("indigo_pix.db")?.execute(
            "INSERT INTO TIXLOG (ID, NR_CONTROLE, DATAHORA, USUARIO, DESCRICAO, ORIGEM, IDREQJDPI, JSON, JSON_RETORNO)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.id,
                row.control_number,
                row.datahora,
                row.usuario,
                row.descricao,
                row.origem,
                row.idreqjdpi,
                row.json,
                row.json_retorno
            ],
        )?;
        Ok(())
    }

    /// Insert rows `ids` sharing one origin and control number, in one transaction.
    pub fn tixlog_bulk(&self, ids: std::ops::RangeInclusive<i64>, origem: &str) -> Result<()> {
        let mut conn = self.open("indigo_pix.db")?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO TIXLOG (ID, NR_CONTROLE, DATAHORA, ORIGEM) VALUES (?1, 'BULK', '2024-05-01 10:00:00.000', ?2)",
            )?;
            for id in ids {
                stmt.execute(params![id, origem])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn mix100(&self, id: i64, control_number: &str, end_to_end: &str, status: &str) -> Result<()> {
        self.open("indigo_pix.db")?.execute(
            "INSERT INTO MIX100 (ID, NR_CONTROLE, ENDTOENDIDDEVOLUCAO, STATUS_MENSAGEM, DATAHORA)
             VALUES (?1, ?2, ?3, ?4, '2024-05-01 10:00:00.000')",
            params![id, control_number, end_to_end, status],
        )?;
        Ok(())
    }

    /// Insert into MCLOG of `indigo_cad.db` or `indigo_cct.db`.
    pub fn mclog(
        &self,
        file: &str,
        id: i64,
        datahora: &str,
        funcao: Option<&str>,
        iae: &str,
        outras_info: &str,
    ) -> Result<()> {
        self.open(file)?.execute(
            "INSERT INTO MCLOG (ID, USUARIO, DATAHORA, FUNCAO, IAE, OUTRAS_INFO, CODIGO_CLIENTE)
             VALUES (?1, 'operator', ?2, ?3, ?4, ?5, '0001')",
            params![id, datahora, funcao, iae, outras_info],
        )?;
        Ok(())
    }

    pub fn session(&self) -> Result<Session> {
        Ok(Session::open(&ConnectionString::for_directory(self.path()))?)
    }
}
