use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Relation, StoreError, TableStore};

/// Process-local table store used by tests, the demo command, and any
/// deployment that has not wired a remote backend yet. Loading a table
/// that was never saved yields an empty relation; the caller decides
/// whether that is a degraded read or simply an empty table.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<String, Relation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table in one call, for fixtures.
    pub fn seed(&self, table: &str, relation: Relation) {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        guard.insert(table.to_string(), relation);
    }
}

impl TableStore for MemoryStore {
    fn load(&self, table: &str) -> Result<Relation, StoreError> {
        let guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard.get(table).cloned().unwrap_or_default())
    }

    fn save(&self, table: &str, relation: &Relation) -> Result<(), StoreError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        guard.insert(table.to_string(), relation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{field, tables, Row};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn load_of_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let relation = store.load(tables::ALUNOS).expect("load never fails");
        assert!(relation.is_empty());
    }

    #[test]
    fn upsert_inserts_then_replaces_whole_row() {
        let store = MemoryStore::new();
        store
            .upsert(tables::ALUNOS, row(&[("id", "a1"), ("nome_guerra", "SILVA")]))
            .expect("insert");
        store
            .upsert(tables::ALUNOS, row(&[("id", "a1"), ("nome_guerra", "SOUZA")]))
            .expect("replace");

        let relation = store.load(tables::ALUNOS).expect("load");
        assert_eq!(relation.len(), 1);
        assert_eq!(field(&relation.rows[0], "nome_guerra"), "SOUZA");
    }

    #[test]
    fn save_replaces_snapshot_and_drops_missing_keys() {
        let store = MemoryStore::new();
        let mut relation = Relation::new(["id"]);
        relation.push(row(&[("id", "a1")]));
        relation.push(row(&[("id", "a2")]));
        store.save(tables::ALUNOS, &relation).expect("save");

        relation.rows.retain(|r| field(r, "id") != "a1");
        store.save(tables::ALUNOS, &relation).expect("save edited");

        let loaded = store.load(tables::ALUNOS).expect("load");
        assert_eq!(loaded.len(), 1);
        assert!(loaded.find("id", "a1").is_none());
    }

    #[test]
    fn delete_of_absent_key_reports_row_not_found() {
        let store = MemoryStore::new();
        store.seed(tables::ALUNOS, Relation::new(["id"]));
        let error = store
            .delete(tables::ALUNOS, "ghost")
            .expect_err("nothing to delete");
        assert!(matches!(error, StoreError::RowNotFound { .. }));
    }

    #[test]
    fn poisoned_store_reports_unavailable() {
        let store = MemoryStore::new();
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.tables.lock().expect("first lock");
            panic!("poison the lock");
        })
        .join();

        let error = store.load(tables::ALUNOS).expect_err("lock is poisoned");
        assert!(matches!(error, StoreError::Unavailable(_)));
        let error = store
            .save(tables::ALUNOS, &Relation::new(["id"]))
            .expect_err("lock is poisoned");
        assert!(matches!(error, StoreError::Unavailable(_)));
    }

    #[test]
    fn config_table_upserts_on_chave() {
        let store = MemoryStore::new();
        store
            .upsert(tables::CONFIG, row(&[("chave", "fator_adaptacao"), ("valor", "0.25")]))
            .expect("insert");
        store
            .upsert(tables::CONFIG, row(&[("chave", "fator_adaptacao"), ("valor", "0.5")]))
            .expect("replace");

        let relation = store.load(tables::CONFIG).expect("load");
        assert_eq!(relation.len(), 1);
        assert_eq!(field(&relation.rows[0], "valor"), "0.5");
    }
}
