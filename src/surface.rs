//! Retained render surface
//!
//! Each region holds the last fragment rendered into it together with a
//! revision counter bumped on every full re-render. Favorite icons are
//! patched in place across all regions without touching revisions, so a
//! toggle never rebuilds a grid (scroll offset and other transient UI state
//! survive it).

use std::collections::BTreeMap;

use crate::favorites::FavoriteCounts;
use crate::models::{EntityId, EntityKind, FavoritesTab};
use crate::view::{Card, Detail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    MainGrid,
    Detail,
    /// Episode roster on the episode detail page
    RelatedCharacters,
    FavoriteCharacters,
    FavoriteEpisodes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Cards(Vec<Card>),
    NoResults {
        icon: &'static str,
        message: String,
        /// Link offered under the message, e.g. back to a list page
        action: Option<(String, String)>,
    },
    Detail(Detail),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Hidden,
    Loading,
    Ready,
}

#[derive(Debug)]
struct Slot {
    fragment: Fragment,
    revision: u64,
}

#[derive(Debug, Default)]
pub struct Surface {
    slots: BTreeMap<Region, Slot>,
    revision: u64,
    pub loader: bool,
    pub error: Option<String>,
    pub load_more: bool,
    pub roster: SectionState,
    pub stats: Option<FavoriteCounts>,
    pub empty_state: bool,
    pub tab: FavoritesTab,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every region and banner, as on page navigation
    pub fn clear(&mut self) {
        *self = Self {
            revision: self.revision,
            ..Self::default()
        };
    }

    fn put(&mut self, region: Region, fragment: Fragment) {
        self.revision += 1;
        self.slots.insert(region, Slot { fragment, revision: self.revision });
    }

    /// Full render of a card list; an empty list becomes the placeholder
    pub fn render_cards(&mut self, region: Region, cards: Vec<Card>, placeholder: Placeholder) {
        if cards.is_empty() {
            self.put(region, placeholder.into_fragment());
        } else {
            self.put(region, Fragment::Cards(cards));
        }
    }

    pub fn render_detail(&mut self, detail: Detail) {
        self.put(Region::Detail, Fragment::Detail(detail));
    }

    pub fn render_placeholder(&mut self, region: Region, placeholder: Placeholder) {
        self.put(region, placeholder.into_fragment());
    }

    pub fn fragment(&self, region: Region) -> Option<&Fragment> {
        self.slots.get(&region).map(|slot| &slot.fragment)
    }

    pub fn revision(&self, region: Region) -> Option<u64> {
        self.slots.get(&region).map(|slot| slot.revision)
    }

    /// Patch every rendered icon of one entity; returns how many were touched
    pub fn update_favorite_icon(&mut self, kind: EntityKind, id: EntityId, filled: bool) -> usize {
        let mut touched = 0;
        for slot in self.slots.values_mut() {
            let icons: Vec<&mut crate::view::FavoriteIcon> = match &mut slot.fragment {
                Fragment::Cards(cards) => cards.iter_mut().map(Card::favorite_mut).collect(),
                Fragment::Detail(detail) => vec![detail.favorite_mut()],
                Fragment::NoResults { .. } => Vec::new(),
            };
            for icon in icons {
                if icon.kind == kind && icon.id == id {
                    icon.filled = filled;
                    touched += 1;
                }
            }
        }
        touched
    }

    /// Take one card out of a region, falling back to the placeholder when it empties
    pub fn remove_card(&mut self, region: Region, kind: EntityKind, id: EntityId, placeholder: Placeholder) {
        let remaining = match self.fragment(region) {
            Some(Fragment::Cards(cards)) => cards
                .iter()
                .filter(|card| {
                    let icon = card.favorite();
                    !(icon.kind == kind && icon.id == id)
                })
                .cloned()
                .collect::<Vec<_>>(),
            _ => return,
        };
        self.render_cards(region, remaining, placeholder);
    }

    /// Filled state of every rendered icon for an entity, region by region
    pub fn icon_states(&self, kind: EntityKind, id: EntityId) -> Vec<(Region, bool)> {
        let mut states = Vec::new();
        for (region, slot) in &self.slots {
            match &slot.fragment {
                Fragment::Cards(cards) => states.extend(
                    cards
                        .iter()
                        .map(Card::favorite)
                        .filter(|icon| icon.kind == kind && icon.id == id)
                        .map(|icon| (*region, icon.filled)),
                ),
                Fragment::Detail(detail) => {
                    let icon = detail.favorite();
                    if icon.kind == kind && icon.id == id {
                        states.push((*region, icon.filled));
                    }
                }
                Fragment::NoResults { .. } => {}
            }
        }
        states
    }
}

/// What an empty region shows instead of an empty container
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub icon: &'static str,
    pub message: &'static str,
    pub action: Option<(&'static str, &'static str)>,
}

impl Placeholder {
    pub const NO_CHARACTERS: Placeholder = Placeholder {
        icon: "🔍",
        message: "No se encontraron personajes",
        action: None,
    };
    pub const NO_EPISODES: Placeholder = Placeholder {
        icon: "🔍",
        message: "No se encontraron episodios",
        action: None,
    };
    pub const NO_FAVORITE_CHARACTERS: Placeholder = Placeholder {
        icon: "💫",
        message: "No tienes personajes favoritos",
        action: Some(("Explorar Personajes", "characters.html")),
    };
    pub const NO_FAVORITE_EPISODES: Placeholder = Placeholder {
        icon: "💫",
        message: "No tienes episodios favoritos",
        action: Some(("Explorar Episodios", "episodes.html")),
    };

    fn into_fragment(self) -> Fragment {
        Fragment::NoResults {
            icon: self.icon,
            message: self.message.to_string(),
            action: self.action.map(|(label, to)| (label.to_string(), to.to_string())),
        }
    }
}
