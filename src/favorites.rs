//! Persisted favorites, one id set per entity kind

use std::collections::BTreeSet;

use crate::error::BestEffort;
use crate::models::{EntityId, EntityKind};
use crate::storage::KeyValueStore;

pub type FavoriteSet = BTreeSet<EntityId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FavoriteCounts {
    pub characters: usize,
    pub episodes: usize,
    pub total: usize,
}

/// New set with the membership of `id` flipped; the input is left untouched
pub fn toggle(id: EntityId, set: &FavoriteSet) -> FavoriteSet {
    let mut next = set.clone();
    if !next.remove(&id) {
        next.insert(id);
    }
    next
}

pub struct FavoritesStore {
    store: Box<dyn KeyValueStore>,
    characters: FavoriteSet,
    episodes: FavoriteSet,
}

impl FavoritesStore {
    /// Load both sets once; they live in memory for the rest of the session
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut favorites = Self {
            store,
            characters: FavoriteSet::new(),
            episodes: FavoriteSet::new(),
        };
        favorites.characters = favorites.load(EntityKind::Character);
        favorites.episodes = favorites.load(EntityKind::Episode);
        favorites
    }

    /// Read the persisted set; missing or corrupt data reads as empty
    pub fn load(&self, kind: EntityKind) -> FavoriteSet {
        self.store
            .get(kind.favorites_key())
            .and_then(|raw| serde_json::from_str::<Vec<EntityId>>(&raw).ok())
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    }

    /// Write the whole set back. Callers may ignore the result: the session keeps its copy.
    pub fn save(&mut self, kind: EntityKind, set: &FavoriteSet) -> BestEffort {
        let ids: Vec<EntityId> = set.iter().copied().collect();
        let raw = serde_json::to_string(&ids)?;
        self.store.set(kind.favorites_key(), &raw)
    }

    pub fn set(&self, kind: EntityKind) -> &FavoriteSet {
        match kind {
            EntityKind::Character => &self.characters,
            EntityKind::Episode => &self.episodes,
        }
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.set(kind).contains(&id)
    }

    /// Flip membership, persist, and return the new membership
    pub fn toggle(&mut self, kind: EntityKind, id: EntityId) -> bool {
        let next = toggle(id, self.set(kind));
        if let Err(e) = self.save(kind, &next) {
            log::warn!("Favorites for {} not persisted: {}", kind, e);
        }

        let is_favorite = next.contains(&id);
        match kind {
            EntityKind::Character => self.characters = next,
            EntityKind::Episode => self.episodes = next,
        }
        is_favorite
    }

    /// Counts recomputed from what is persisted right now
    pub fn aggregate_counts(&self) -> FavoriteCounts {
        let characters = self.load(EntityKind::Character).len();
        let episodes = self.load(EntityKind::Episode).len();
        FavoriteCounts {
            characters,
            episodes,
            total: characters + episodes,
        }
    }
}
