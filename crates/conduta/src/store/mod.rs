//! Record store adapter: typed read/write of named tables as in-memory
//! relations. Columns are loosely typed strings; domain modules parse
//! what they need and tolerate what they cannot.

mod cache;
mod memory;

pub use cache::CachedStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical table names exposed by the backing store.
pub mod tables {
    pub const ALUNOS: &str = "Alunos";
    pub const ACOES: &str = "Acoes";
    pub const TIPOS_ACAO: &str = "Tipos_Acao";
    pub const CONFIG: &str = "Config";
    pub const PROGRAMACAO: &str = "Programacao";
    pub const ORDENS_DIARIAS: &str = "Ordens_Diarias";
    pub const TAREFAS: &str = "Tarefas";
    pub const USERS: &str = "Users";
    pub const PERMISSIONS: &str = "Permissions";
    pub const TRANSPORTE: &str = "auxilio_transporte_dados";
    pub const SOLDOS: &str = "soldos";
    pub const PERNOITE: &str = "pernoite";
    pub const DOCUMENTO_MODELOS: &str = "documento_modelos";
    pub const REGISTRATION_REQUESTS: &str = "RegistrationRequests";
}

/// Primary-key column for a table. Everything is keyed by `id` except
/// the config namespace and the permission registry.
pub fn primary_key(table: &str) -> &'static str {
    match table {
        tables::CONFIG => "chave",
        tables::PERMISSIONS => "feature_key",
        _ => "id",
    }
}

/// A single loosely typed record. Missing columns read as empty.
pub type Row = BTreeMap<String, String>;

/// An ordered set of rows with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Relation {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        for column in row.keys() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Looks up a row by the value of `key_column`.
    pub fn find(&self, key_column: &str, key: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| row.get(key_column).map(String::as_str) == Some(key))
    }

    pub fn find_mut(&mut self, key_column: &str, key: &str) -> Option<&mut Row> {
        self.rows
            .iter_mut()
            .find(|row| row.get(key_column).map(String::as_str) == Some(key))
    }
}

/// Convenience accessor: value of `column` in `row`, trimmed, empty if absent.
pub fn field<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("").trim()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("no row with key '{key}' in table '{table}'")]
    RowNotFound { table: String, key: String },
}

/// Storage abstraction over the tabular backend. `save` is a full
/// replace: rows whose primary key vanished since the prior snapshot
/// are deleted (snapshot set difference, per the backend contract).
pub trait TableStore: Send + Sync {
    fn load(&self, table: &str) -> Result<Relation, StoreError>;

    fn save(&self, table: &str, relation: &Relation) -> Result<(), StoreError>;

    /// Row-keyed upsert on the table's primary key.
    fn upsert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        let key_column = primary_key(table);
        let key = field(&row, key_column).to_string();
        let mut relation = self.load(table)?;
        match relation.find_mut(key_column, &key) {
            Some(existing) => *existing = row,
            None => relation.push(row),
        }
        self.save(table, &relation)
    }

    /// Deletes the row with the given primary key, if present.
    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        let key_column = primary_key(table);
        let mut relation = self.load(table)?;
        let before = relation.rows.len();
        relation
            .rows
            .retain(|row| field(row, key_column) != key);
        if relation.rows.len() == before {
            return Err(StoreError::RowNotFound {
                table: table.to_string(),
                key: key.to_string(),
            });
        }
        self.save(table, &relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn primary_key_depends_on_table() {
        assert_eq!(primary_key(tables::ALUNOS), "id");
        assert_eq!(primary_key(tables::CONFIG), "chave");
        assert_eq!(primary_key(tables::PERMISSIONS), "feature_key");
    }

    #[test]
    fn push_extends_columns_from_new_rows() {
        let mut relation = Relation::new(["id"]);
        relation.push(row(&[("id", "1"), ("nome", "X")]));
        assert_eq!(relation.columns, vec!["id", "nome"]);
        assert_eq!(relation.len(), 1);
    }

    #[test]
    fn find_matches_on_key_column() {
        let mut relation = Relation::new(["id", "nome"]);
        relation.push(row(&[("id", "a1"), ("nome", "SILVA")]));
        relation.push(row(&[("id", "a2"), ("nome", "SOUZA")]));
        let hit = relation.find("id", "a2").expect("row present");
        assert_eq!(field(hit, "nome"), "SOUZA");
        assert!(relation.find("id", "a3").is_none());
    }

    #[test]
    fn field_trims_and_defaults_to_empty() {
        let r = row(&[("nome", "  SILVA  ")]);
        assert_eq!(field(&r, "nome"), "SILVA");
        assert_eq!(field(&r, "ausente"), "");
    }
}
