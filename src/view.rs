//! View-models for cards and detail panels
//!
//! Plain data built from catalog records plus the favorites set. Nothing
//! here knows how it is drawn.

use chrono::{Datelike, NaiveDate};

use crate::favorites::FavoriteSet;
use crate::models::{Character, EntityId, EntityKind, Episode, Gender, Status};

const MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

/// A favorite toggle control bound to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteIcon {
    pub kind: EntityKind,
    pub id: EntityId,
    pub filled: bool,
}

impl FavoriteIcon {
    pub fn new(kind: EntityKind, id: EntityId, favorites: &FavoriteSet) -> Self {
        Self { kind, id, filled: favorites.contains(&id) }
    }

    pub fn glyph(&self) -> &'static str {
        if self.filled { "★" } else { "☆" }
    }

    pub fn hint(&self) -> &'static str {
        match (self.kind, self.filled) {
            (_, true) => "Quitar de favoritos",
            (EntityKind::Character, false) => "Añadir a favoritos",
            (EntityKind::Episode, false) => "Añadir episodio a favoritos",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterCard {
    pub id: EntityId,
    pub name: String,
    pub image: String,
    pub status: Status,
    pub status_label: &'static str,
    pub species: String,
    pub gender_label: &'static str,
    pub favorite: FavoriteIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeCard {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub subtitle: String,
    pub air_date: String,
    pub character_count: usize,
    pub favorite: FavoriteIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Character(CharacterCard),
    Episode(EpisodeCard),
}

impl Card {
    pub fn favorite(&self) -> &FavoriteIcon {
        match self {
            Card::Character(card) => &card.favorite,
            Card::Episode(card) => &card.favorite,
        }
    }

    pub fn favorite_mut(&mut self) -> &mut FavoriteIcon {
        match self {
            Card::Character(card) => &mut card.favorite,
            Card::Episode(card) => &mut card.favorite,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDetail {
    pub card: CharacterCard,
    pub kind_label: String,
    pub origin: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeDetail {
    pub card: EpisodeCard,
    pub season_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Character(CharacterDetail),
    Episode(EpisodeDetail),
}

impl Detail {
    pub fn favorite_mut(&mut self) -> &mut FavoriteIcon {
        match self {
            Detail::Character(d) => &mut d.card.favorite,
            Detail::Episode(d) => &mut d.card.favorite,
        }
    }

    pub fn favorite(&self) -> &FavoriteIcon {
        match self {
            Detail::Character(d) => &d.card.favorite,
            Detail::Episode(d) => &d.card.favorite,
        }
    }
}

pub fn character_card(character: &Character, favorites: &FavoriteSet) -> CharacterCard {
    CharacterCard {
        id: character.id,
        name: character.name.clone(),
        image: character.image.clone(),
        status: character.status,
        status_label: status_label(character.status),
        species: character.species.clone(),
        gender_label: gender_label(character.gender),
        favorite: FavoriteIcon::new(EntityKind::Character, character.id, favorites),
    }
}

pub fn episode_card(episode: &Episode, favorites: &FavoriteSet) -> EpisodeCard {
    EpisodeCard {
        id: episode.id,
        code: episode.episode.clone(),
        name: episode.name.clone(),
        subtitle: format_episode_code(&episode.episode),
        air_date: format_air_date(episode.air_date.as_deref()),
        character_count: episode.characters.len(),
        favorite: FavoriteIcon::new(EntityKind::Episode, episode.id, favorites),
    }
}

pub fn character_cards(characters: &[Character], favorites: &FavoriteSet) -> Vec<Card> {
    characters
        .iter()
        .map(|c| Card::Character(character_card(c, favorites)))
        .collect()
}

pub fn episode_cards(episodes: &[Episode], favorites: &FavoriteSet) -> Vec<Card> {
    episodes
        .iter()
        .map(|e| Card::Episode(episode_card(e, favorites)))
        .collect()
}

pub fn character_detail(character: &Character, favorites: &FavoriteSet) -> CharacterDetail {
    let kind_label = match character.kind.as_deref().map(str::trim) {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => "N/A".to_string(),
    };

    CharacterDetail {
        card: character_card(character, favorites),
        kind_label,
        origin: character.origin.name.clone(),
        location: character.location.name.clone(),
    }
}

pub fn episode_detail(episode: &Episode, favorites: &FavoriteSet) -> EpisodeDetail {
    let season_label = match parse_episode_code(&episode.episode) {
        Some((season, _)) => format!("Temporada {season}"),
        None => "Temporada desconocida".to_string(),
    };

    EpisodeDetail {
        card: episode_card(episode, favorites),
        season_label,
    }
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Alive => "Vivo",
        Status::Dead => "Muerto",
        Status::Unknown => "Desconocido",
    }
}

pub fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Masculino",
        Gender::Female => "Femenino",
        Gender::Genderless => "Sin género",
        Gender::Unknown => "Desconocido",
    }
}

/// Season and episode numbers of an `S01E02` code
pub fn parse_episode_code(code: &str) -> Option<(u32, u32)> {
    let rest = code.trim().strip_prefix('S')?;
    let (season, episode) = rest.split_once('E')?;
    Some((season.parse().ok()?, episode.parse().ok()?))
}

pub fn format_episode_code(code: &str) -> String {
    match parse_episode_code(code) {
        Some((season, episode)) => format!("Temporada {season}, Episodio {episode}"),
        None => code.to_string(),
    }
}

/// `December 2, 2013` becomes `2 de Diciembre de 2013`
pub fn format_air_date(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return "Fecha desconocida".to_string(),
    };

    match NaiveDate::parse_from_str(raw, "%B %d, %Y") {
        Ok(date) => format!("{} de {} de {}", date.day(), MONTHS[date.month0() as usize], date.year()),
        Err(_) => raw.to_string(),
    }
}
