//! Page routing by location string, e.g. `episode.html?id=3`

use crate::error::CatalogError;
use crate::models::{EntityId, EntityKind};

/// The five pages of the browser. Detail pages keep the raw id parse result
/// so an invalid link still lands on the page and shows an error there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Characters,
    CharacterDetail(Option<EntityId>),
    Episodes,
    EpisodeDetail(Option<EntityId>),
    Favorites,
}

impl Route {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let page = path.rsplit('/').next().unwrap_or_default();

        match page {
            "character-detail.html" => Route::CharacterDetail(id_param(query)),
            "episodes.html" => Route::Episodes,
            "episode.html" => Route::EpisodeDetail(id_param(query)),
            "favorites.html" => Route::Favorites,
            "" | "index.html" | "characters.html" => Route::Characters,
            other => {
                log::warn!("Unknown page '{}', showing characters", other);
                Route::Characters
            }
        }
    }

    pub fn detail(kind: EntityKind, id: EntityId) -> Self {
        match kind {
            EntityKind::Character => Route::CharacterDetail(Some(id)),
            EntityKind::Episode => Route::EpisodeDetail(Some(id)),
        }
    }

    pub fn location(&self) -> String {
        match self {
            Route::Characters => "characters.html".to_string(),
            Route::CharacterDetail(Some(id)) => format!("character-detail.html?id={id}"),
            Route::CharacterDetail(None) => "character-detail.html".to_string(),
            Route::Episodes => "episodes.html".to_string(),
            Route::EpisodeDetail(Some(id)) => format!("episode.html?id={id}"),
            Route::EpisodeDetail(None) => "episode.html".to_string(),
            Route::Favorites => "favorites.html".to_string(),
        }
    }
}

fn id_param(query: &str) -> Option<EntityId> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id")
        .and_then(|(_, value)| value.trim().parse::<EntityId>().ok())
        .filter(|id| *id > 0)
}

/// The id of a detail page, or the error its page shows instead
pub fn require_id(id: Option<EntityId>, kind: EntityKind) -> Result<EntityId, CatalogError> {
    id.ok_or_else(|| CatalogError::InvalidInput(format!("missing or malformed {kind} id")))
}
