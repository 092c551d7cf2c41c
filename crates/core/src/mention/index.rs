use std::collections::{HashMap, HashSet};

use crate::catalog::{CatalogEntry, FreelancerRecord};

/// Normalise a name for lookup: lowercase, single spaces.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lookup structures over the catalog for one resolution.
///
/// Entries are ordered by ID descending and every map is filled in that
/// order with the first insert winning, so a name shared by several
/// freelancers resolves to the highest ID.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<u64, usize>,
    by_name: HashMap<String, usize>,
    match_ids: HashSet<u64>,
}

impl CatalogIndex {
    /// Index `catalog`, adding any reply `matches` the catalog does not know yet.
    pub fn new(catalog: &[CatalogEntry], matches: &[FreelancerRecord]) -> Self {
        let mut entries: Vec<CatalogEntry> = catalog.to_vec();
        let known: HashSet<u64> = catalog.iter().map(|e| e.id).collect();
        entries.extend(
            matches
                .iter()
                .filter(|record| !known.contains(&record.id))
                .map(CatalogEntry::from),
        );
        entries.sort_by(|a, b| b.id.cmp(&a.id));

        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_name = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            by_id.entry(entry.id).or_insert(position);
            for name in entry.names() {
                by_name.entry(name_key(name)).or_insert(position);
            }
        }

        Self {
            entries,
            by_id,
            by_name,
            match_ids: matches.iter().map(|r| r.id).collect(),
        }
    }

    /// Entries in lookup order (ID descending).
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&position| &self.entries[position])
    }

    /// Case-insensitive lookup by display name or username.
    pub fn find_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name
            .get(&name_key(name))
            .map(|&position| &self.entries[position])
    }

    pub fn in_match_list(&self, id: u64) -> bool {
        self.match_ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
