use std::collections::{BTreeSet, HashMap};

use super::models::Inspiration;
use crate::{Error, Result};

const BUILTIN: &str = include_str!("../../data/inspirations.json");

/// Static in-memory content list keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Inspiration>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<Inspiration> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    pub fn from_items(mut items: Vec<Inspiration>) -> Result<Self> {
        // Newest first, ties broken by id for a stable listing
        items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(Error::Content(format!("duplicate id: {}", item.id)));
            }
        }

        Ok(Self { items, index })
    }

    pub fn get(&self, id: &str) -> Option<&Inspiration> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// All entries, newest first
    pub fn list(&self) -> &[Inspiration] {
        &self.items
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Inspiration> {
        self.items
            .iter()
            .filter(move |item| item.category.eq_ignore_ascii_case(category))
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.items.iter().map(|item| item.category.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
