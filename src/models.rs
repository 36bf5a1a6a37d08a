//! Data models for the catalog browser

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog ids are positive and unique within their kind
pub type EntityId = u32;

/// The two entity kinds the catalog serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Character,
    Episode,
}

impl EntityKind {
    /// Path segment under the API base url
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Episode => "episode",
        }
    }

    /// Storage key of the persisted favorites blob
    pub fn favorites_key(&self) -> &'static str {
        match self {
            EntityKind::Character => "rick-morty-favorites",
            EntityKind::Episode => "rick-morty-favorites-episodes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Alive,
    Dead,
    Unknown,
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "alive" => Status::Alive,
            "dead" => Status::Dead,
            _ => Status::Unknown,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Dead => "Dead",
            Status::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Genderless,
    Unknown,
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            "genderless" => Gender::Genderless,
            _ => Gender::Unknown,
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Genderless => "Genderless",
            Gender::Unknown => "unknown",
        }
    }
}

/// Origin or current location of a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub species: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub gender: Gender,
    #[serde(default)]
    pub image: String,
    pub origin: LocationRef,
    pub location: LocationRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EntityId,
    pub name: String,
    /// Code of the form `S01E02`
    pub episode: String,
    #[serde(default)]
    pub air_date: Option<String>,
    /// Resource references, in source order
    #[serde(default)]
    pub characters: Vec<String>,
}

/// Pagination metadata; a non-null `next` is the only signal of more pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub count: u32,
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

impl Info {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "E: DeserializeOwned")]
pub struct Page<E> {
    pub results: Vec<E>,
    pub info: Info,
}

impl<E> Page<E> {
    /// What a 404 on a list query normalizes to
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            info: Info::default(),
        }
    }
}

/// Active filter values of one list view
pub trait FilterSet: Default + Clone + Send + 'static {
    type Field: Copy + fmt::Debug;

    /// Store a trimmed value; an empty value clears the filter
    fn set(&mut self, field: Self::Field, value: &str);

    fn get(&self, field: Self::Field) -> &str;

    /// Query parameters for the non-empty filters only
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// A record the catalog can list, look up and batch-fetch
pub trait Entity: DeserializeOwned + Clone + Send + 'static {
    const KIND: EntityKind;
    type Filters: FilterSet;

    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterField {
    Name,
    Status,
    Species,
    Type,
    Gender,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterFilters {
    pub name: String,
    pub status: String,
    pub species: String,
    pub kind: String,
    pub gender: String,
}

impl FilterSet for CharacterFilters {
    type Field = CharacterField;

    fn set(&mut self, field: CharacterField, value: &str) {
        let value = value.trim().to_string();
        match field {
            CharacterField::Name => self.name = value,
            CharacterField::Status => self.status = value,
            CharacterField::Species => self.species = value,
            CharacterField::Type => self.kind = value,
            CharacterField::Gender => self.gender = value,
        }
    }

    fn get(&self, field: CharacterField) -> &str {
        match field {
            CharacterField::Name => &self.name,
            CharacterField::Status => &self.status,
            CharacterField::Species => &self.species,
            CharacterField::Type => &self.kind,
            CharacterField::Gender => &self.gender,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("name", &self.name),
            ("status", &self.status),
            ("species", &self.species),
            ("type", &self.kind),
            ("gender", &self.gender),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k, v.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeField {
    Name,
    /// Substring of the `S01E02` code, the season select writes `S01`
    Code,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeFilters {
    pub name: String,
    pub episode: String,
}

impl FilterSet for EpisodeFilters {
    type Field = EpisodeField;

    fn set(&mut self, field: EpisodeField, value: &str) {
        let value = value.trim().to_string();
        match field {
            EpisodeField::Name => self.name = value,
            EpisodeField::Code => self.episode = value,
        }
    }

    fn get(&self, field: EpisodeField) -> &str {
        match field {
            EpisodeField::Name => &self.name,
            EpisodeField::Code => &self.episode,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [("name", &self.name), ("episode", &self.episode)]
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }
}

impl Entity for Character {
    const KIND: EntityKind = EntityKind::Character;
    type Filters = CharacterFilters;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Episode {
    const KIND: EntityKind = EntityKind::Episode;
    type Filters = EpisodeFilters;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Favorites page tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesTab {
    #[default]
    Characters,
    Episodes,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICK: &str = r#"{
        "id": 1,
        "name": "Rick Sanchez",
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": {"name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1"},
        "location": {"name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3"},
        "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
        "episode": ["https://rickandmortyapi.com/api/episode/1"],
        "url": "https://rickandmortyapi.com/api/character/1",
        "created": "2017-11-04T18:48:46.250Z"
    }"#;

    #[test]
    fn test_character_decodes_api_shape() {
        let rick: Character = serde_json::from_str(RICK).unwrap();
        assert_eq!(rick.id, 1);
        assert_eq!(rick.status, Status::Alive);
        assert_eq!(rick.gender, Gender::Male);
        assert_eq!(rick.kind.as_deref(), Some(""));
        assert_eq!(rick.origin.name, "Earth (C-137)");
    }

    #[test]
    fn test_status_and_gender_are_case_insensitive() {
        assert_eq!(Status::from("unknown".to_string()), Status::Unknown);
        assert_eq!(Status::from("DEAD".to_string()), Status::Dead);
        assert_eq!(Gender::from("genderless".to_string()), Gender::Genderless);
        assert_eq!(Gender::from("whatever".to_string()), Gender::Unknown);
    }

    #[test]
    fn test_query_pairs_skip_empty_filters() {
        let mut filters = CharacterFilters::default();
        filters.set(CharacterField::Name, "  rick ");
        filters.set(CharacterField::Gender, "   ");
        assert_eq!(filters.query_pairs(), vec![("name", "rick".to_string())]);

        let mut filters = EpisodeFilters::default();
        filters.set(EpisodeField::Code, "S02");
        assert_eq!(filters.query_pairs(), vec![("episode", "S02".to_string())]);
    }

    #[test]
    fn test_page_decodes_with_null_locators() {
        let body = r#"{"info":{"count":1,"pages":1,"next":null,"prev":null},"results":[]}"#;
        let page: Page<Episode> = serde_json::from_str(body).unwrap();
        assert!(!page.info.has_next());
        assert!(page.results.is_empty());
    }
}
