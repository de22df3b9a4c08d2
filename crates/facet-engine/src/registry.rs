//! Dataset registry: the named, read-only tables a dashboard works over.

use std::collections::HashMap;

use facet_model::Table;

use crate::error::{EngineError, EngineResult};

/// Owns every registered dataset. Tables are immutable once registered;
/// lookups hand out shared references only.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    tables: HashMap<String, Table>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        DatasetRegistry::default()
    }

    /// Registers `table` under its own name. Names are unique.
    pub fn register(&mut self, table: Table) -> EngineResult<()> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(EngineError::DuplicateTable(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> EngineResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Registered table names, sorted for stable output.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
