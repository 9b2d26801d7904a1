use crate::notes::NoteRecord;

/// Ordered collection of note records, at most one per id. Iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct NoteCatalog {
    records: Vec<NoteRecord>,
}

impl NoteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from persisted records. A later duplicate id replaces
    /// the earlier record in place.
    pub fn from_records(records: impl IntoIterator<Item = NoteRecord>) -> Self {
        let mut catalog = Self::new();
        for mut record in records {
            record.normalize();
            catalog.upsert(record);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&NoteRecord> {
        self.records.iter().find(|record| record.id.as_str() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut NoteRecord> {
        self.records
            .iter_mut()
            .find(|record| record.id.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NoteRecord> {
        self.records.iter_mut()
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<crate::notes::NoteId> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    /// Replaces the record with the same id in place, or appends it. Returns
    /// `true` when a new record was appended.
    pub fn upsert(&mut self, record: NoteRecord) -> bool {
        match self.position(record.id.as_str()) {
            Some(index) => {
                self.records[index] = record;
                false
            }
            None => {
                self.records.push(record);
                true
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<NoteRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.id.as_str() == id)
    }
}
