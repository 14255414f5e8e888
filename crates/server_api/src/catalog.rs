use shared::domain::{Property, SolutionEntry};

const DEFAULT_SOLUTIONS: [(&str, Property); 6] = [
    ("레몬즙", Property::Acidic),
    ("식초", Property::Acidic),
    ("사이다", Property::Acidic),
    ("비눗물", Property::Basic),
    ("치약 용액", Property::Basic),
    ("유리세정제", Property::Basic),
];

/// Known solutions and their ground-truth property, in the order they were
/// added.
#[derive(Debug, Clone, Default)]
pub struct SolutionCatalog {
    entries: Vec<SolutionEntry>,
}

impl SolutionCatalog {
    pub fn with_defaults() -> Self {
        Self::from_entries(DEFAULT_SOLUTIONS)
    }

    pub fn from_entries<N: Into<String>>(
        entries: impl IntoIterator<Item = (N, Property)>,
    ) -> Self {
        let mut catalog = Self::default();
        for (name, property) in entries {
            catalog.insert(name, property);
        }
        catalog
    }

    pub fn lookup(&self, name: &str) -> Option<Property> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.property)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Adds `name`, overwriting the property of an existing entry. Returns
    /// `true` when the name was new.
    pub fn insert(&mut self, name: impl Into<String>, property: Property) -> bool {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.name == name) {
            existing.property = property;
            return false;
        }
        self.entries.push(SolutionEntry { name, property });
        true
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn entries(&self) -> &[SolutionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
