use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{error::LoadError, models::Item};

/// Loaded catalogue. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalogue {
    shuffled: Vec<Item>,
    master: Vec<Item>,
    index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self {
            shuffled: Vec::new(),
            master: Vec::new(),
            index: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }
}

impl Catalogue {
    /// Build the catalogue from raw items, shuffling the working order with `rng`.
    ///
    /// `master` keeps the order the items were published in. Duplicate ids are
    /// `Malformed`.
    pub fn load<R: Rng + ?Sized>(raw: Vec<Item>, rng: &mut R) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(raw.len());
        for (position, item) in raw.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(LoadError::Malformed(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }

        let mut shuffled = raw.clone();
        shuffled.shuffle(rng);
        debug!(items = shuffled.len(), "catalogue shuffled");

        Ok(Self {
            shuffled,
            master: raw,
            index,
            loaded_at: Utc::now(),
        })
    }

    /// Working display order shared by every view's selection.
    pub fn shuffled(&self) -> &[Item] {
        &self.shuffled
    }

    /// Publication order, used for filtering and id lookups.
    pub fn master(&self) -> &[Item] {
        &self.master
    }

    pub fn len(&self) -> usize {
        self.shuffled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shuffled.is_empty()
    }

    /// Item at a working-order position.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.shuffled.get(index)
    }

    /// Look an item up by id in the master list.
    pub fn lookup_by_id(&self, id: &str) -> Option<&Item> {
        self.index.get(id).and_then(|position| self.master.get(*position))
    }

    /// Distinct tags in first-seen master order.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.master.iter().flat_map(|item| item.tags.iter()) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    pub(crate) fn item(id: &str, tags: &[&str]) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: format!("{id} description"),
            subtitle: None,
            emoji: None,
            author: None,
            preview: format!("{id}.png"),
            url: Some(format!("https://games.example/{id}")),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    #[test]
    fn shuffled_is_permutation_of_master() {
        let raw: Vec<Item> = (0..20).map(|n| item(&format!("g{n}"), &[])).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let catalogue = Catalogue::load(raw.clone(), &mut rng).expect("load");

        assert_eq!(catalogue.master(), raw.as_slice());
        let mut shuffled_ids: Vec<_> = catalogue.shuffled().iter().map(|i| &i.id).collect();
        let mut master_ids: Vec<_> = raw.iter().map(|i| &i.id).collect();
        shuffled_ids.sort();
        master_ids.sort();
        assert_eq!(shuffled_ids, master_ids);
    }

    #[test]
    fn lookup_by_id_uses_master() {
        let raw = vec![item("alpha", &[]), item("beta", &[])];
        let mut rng = StdRng::seed_from_u64(1);
        let catalogue = Catalogue::load(raw, &mut rng).expect("load");

        assert_eq!(catalogue.lookup_by_id("beta").map(|i| i.name.as_str()), Some("BETA"));
        assert!(catalogue.lookup_by_id("gamma").is_none());
    }

    #[test]
    fn duplicate_ids_are_malformed() {
        let raw = vec![item("alpha", &[]), item("alpha", &[])];
        let mut rng = StdRng::seed_from_u64(1);
        let err = Catalogue::load(raw, &mut rng).expect_err("duplicate");
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn tags_are_distinct_in_master_order() {
        let raw = vec![
            item("a", &["action", "retro"]),
            item("b", &["puzzle"]),
            item("c", &["retro", "action"]),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let catalogue = Catalogue::load(raw, &mut rng).expect("load");
        assert_eq!(catalogue.tags(), vec!["action", "retro", "puzzle"]);
    }

    #[test]
    fn empty_catalogue_is_valid() {
        let mut rng = StdRng::seed_from_u64(0);
        let catalogue = Catalogue::load(Vec::new(), &mut rng).expect("load");
        assert!(catalogue.is_empty());
        assert!(catalogue.get(0).is_none());
    }
}
