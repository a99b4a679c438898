//! Catalogs and tables
//!
//! The log tables live in three catalogs, each a separate database file
//! attached under its catalog name. Table references are static; nothing
//! here is built from user input.

use serde::{Serialize, Serializer};
use std::fmt;

/// Attached catalog (one database file each)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Catalog {
    /// PIX messages and transactions (TIXLOG, MIX100)
    Pix,
    /// Registration operations (MCLOG)
    Cad,
    /// Risk screening / KYT (MCLOG)
    Cct,
}

impl Catalog {
    pub const ALL: [Catalog; 3] = [Catalog::Pix, Catalog::Cad, Catalog::Cct];

    /// Schema name used in qualified table names and as the file stem
    pub fn name(self) -> &'static str {
        match self {
            Catalog::Pix => "indigo_pix",
            Catalog::Cad => "indigo_cad",
            Catalog::Cct => "indigo_cct",
        }
    }

    /// File holding the catalog inside the server directory
    pub fn file_name(self) -> String {
        format!("{}.db", self.name())
    }

    pub fn from_name(name: &str) -> Option<Catalog> {
        Catalog::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Catalog-qualified table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub catalog: Catalog,
    pub table: &'static str,
}

impl TableRef {
    pub const TIXLOG: TableRef = TableRef {
        catalog: Catalog::Pix,
        table: "TIXLOG",
    };
    pub const MIX100: TableRef = TableRef {
        catalog: Catalog::Pix,
        table: "MIX100",
    };
    pub const MCLOG_CAD: TableRef = TableRef {
        catalog: Catalog::Cad,
        table: "MCLOG",
    };
    pub const MCLOG_CCT: TableRef = TableRef {
        catalog: Catalog::Cct,
        table: "MCLOG",
    };

    /// `catalog.TABLE`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.catalog.name(), self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog.name(), self.table)
    }
}

impl Serialize for TableRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_name_is_case_insensitive() {
        assert_eq!(Catalog::from_name("INDIGO_PIX"), Some(Catalog::Pix));
        assert_eq!(Catalog::from_name(" indigo_cct "), Some(Catalog::Cct));
        assert_eq!(Catalog::from_name("indigo_other"), None);
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(TableRef::TIXLOG.qualified(), "indigo_pix.TIXLOG");
        assert_eq!(TableRef::MCLOG_CAD.to_string(), "indigo_cad.MCLOG");
        assert_eq!(Catalog::Cct.file_name(), "indigo_cct.db");
    }
}
