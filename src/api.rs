//! Rick and Morty catalog API client

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::models::{Entity, EntityId, FilterSet, Page};

pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Raw HTTP answer handed back by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: String::new() }
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET requests; non-2xx statuses are returned, not raised
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<HttpReply, CatalogError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
            user_agent: user_agent.to_string(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<HttpReply, CatalogError> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, value.as_str());
        }

        let mut response = request.call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpReply { status, body })
    }
}

/// Batch lookups answer with a bare object when exactly one id matched
#[derive(Deserialize)]
#[serde(untagged, bound = "E: DeserializeOwned")]
enum OneOrMany<E> {
    Many(Vec<E>),
    One(E),
}

impl<E> From<OneOrMany<E>> for Vec<E> {
    fn from(value: OneOrMany<E>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Uniform access to the remote catalog
pub struct CatalogClient<T: Transport> {
    base_url: String,
    transport: T,
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoint_url<E: Entity>(&self) -> String {
        format!("{}/{}", self.base_url, E::KIND.endpoint())
    }

    /// One page of a filtered listing. A 404 means "no matches" and yields an empty page.
    pub fn fetch_page<E: Entity>(&self, page: u32, filters: &E::Filters) -> Result<Page<E>, CatalogError> {
        let mut query = vec![("page", page.to_string())];
        query.extend(filters.query_pairs());

        let reply = self.transport.get(&self.endpoint_url::<E>(), &query)?;
        match reply.status {
            404 => Ok(Page::empty()),
            _ if reply.is_success() => Ok(serde_json::from_str(&reply.body)?),
            status => Err(CatalogError::Remote { status }),
        }
    }

    pub fn fetch_by_id<E: Entity>(&self, id: EntityId) -> Result<E, CatalogError> {
        let url = format!("{}/{}", self.endpoint_url::<E>(), id);
        let reply = self.transport.get(&url, &[])?;
        match reply.status {
            404 => Err(CatalogError::NotFound { kind: E::KIND, id }),
            _ if reply.is_success() => Ok(serde_json::from_str(&reply.body)?),
            status => Err(CatalogError::Remote { status }),
        }
    }

    /// Batch lookup; always a sequence, empty on 404 or when no ids are asked for
    pub fn fetch_by_ids<E: Entity>(&self, ids: &[EntityId]) -> Result<Vec<E>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        let url = format!("{}/{}", self.endpoint_url::<E>(), joined);
        let reply = self.transport.get(&url, &[])?;
        match reply.status {
            404 => Ok(Vec::new()),
            _ if reply.is_success() => {
                let parsed: OneOrMany<E> = serde_json::from_str(&reply.body)?;
                Ok(parsed.into())
            }
            status => Err(CatalogError::Remote { status }),
        }
    }
}

/// Id from the trailing path segment of a resource url such as `.../character/42`
pub fn resolve_reference_id(reference: &str) -> Result<EntityId, CatalogError> {
    let segment = reference.rsplit('/').next().unwrap_or_default();
    match segment.parse::<EntityId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CatalogError::InvalidInput(format!(
            "reference has no trailing numeric id: {reference}"
        ))),
    }
}

pub fn resolve_reference_ids(references: &[String]) -> Result<Vec<EntityId>, CatalogError> {
    references.iter().map(|r| resolve_reference_id(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, CharacterField, CharacterFilters, Episode, EpisodeFilters};
    use crate::test_support::{character_json, episode_json, page_json, ScriptedTransport, BASE};

    fn client() -> CatalogClient<ScriptedTransport> {
        CatalogClient::new(BASE, ScriptedTransport::new())
    }

    #[test]
    fn test_fetch_page_sends_only_non_empty_filters() {
        let client = client();
        let mut filters = CharacterFilters::default();
        filters.set(CharacterField::Name, "rick");
        filters.set(CharacterField::Status, "");
        client.transport().respond(
            &format!("{BASE}/character?page=2&name=rick"),
            HttpReply::ok(page_json(&[character_json(1, "Rick Sanchez")], Some(3))),
        );

        let page: Page<Character> = client.fetch_page(2, &filters).unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.info.has_next());
        assert_eq!(client.transport().requests(), vec![format!("{BASE}/character?page=2&name=rick")]);
    }

    #[test]
    fn test_fetch_page_normalizes_not_found_to_empty_page() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/episode?page=1&name=zzz"), HttpReply::status(404));
        let mut filters = EpisodeFilters::default();
        filters.name = "zzz".to_string();

        let page: Page<Episode> = client.fetch_page(1, &filters).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.info, crate::models::Info::default());
    }

    #[test]
    fn test_fetch_page_surfaces_other_statuses() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character?page=1"), HttpReply::status(500));

        let err = client
            .fetch_page::<Character>(1, &CharacterFilters::default())
            .unwrap_err();
        assert_eq!(err, CatalogError::Remote { status: 500 });
    }

    #[test]
    fn test_fetch_page_passes_transport_errors_through() {
        let client = client();
        client.transport().fail(
            &format!("{BASE}/character?page=1"),
            CatalogError::Transport("connection refused".to_string()),
        );

        let err = client
            .fetch_page::<Character>(1, &CharacterFilters::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[test]
    fn test_fetch_by_id_reports_not_found() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character/9999"), HttpReply::status(404));

        let err = client.fetch_by_id::<Character>(9999).unwrap_err();
        assert_eq!(
            err,
            CatalogError::NotFound { kind: crate::models::EntityKind::Character, id: 9999 }
        );
    }

    #[test]
    fn test_fetch_by_id_decodes_episode() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/episode/1"), HttpReply::ok(episode_json(1, "Pilot", &[1, 2])));

        let episode: Episode = client.fetch_by_id(1).unwrap();
        assert_eq!(episode.episode, "S01E01");
        assert_eq!(episode.characters.len(), 2);
    }

    #[test]
    fn test_fetch_by_ids_empty_makes_no_request() {
        let client = client();
        let characters: Vec<Character> = client.fetch_by_ids(&[]).unwrap();
        assert!(characters.is_empty());
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn test_fetch_by_ids_wraps_single_object() {
        let client = client();
        // Two ids requested, the source only knows one of them
        client.transport().respond(
            &format!("{BASE}/character/7,99999"),
            HttpReply::ok(character_json(7, "Abradolf Lincler")),
        );

        let characters: Vec<Character> = client.fetch_by_ids(&[7, 99999]).unwrap();
        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].id, 7);
    }

    #[test]
    fn test_fetch_by_ids_keeps_array_order_and_normalizes_404() {
        let client = client();
        client.transport().respond(
            &format!("{BASE}/character/2,1"),
            HttpReply::ok(format!("[{},{}]", character_json(2, "Morty"), character_json(1, "Rick"))),
        );
        client
            .transport()
            .respond(&format!("{BASE}/character/424242"), HttpReply::status(404));

        let characters: Vec<Character> = client.fetch_by_ids(&[2, 1]).unwrap();
        assert_eq!(characters.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1]);

        let missing: Vec<Character> = client.fetch_by_ids(&[424242]).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_malformed_body_is_a_decode_error() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/episode/3"), HttpReply::ok("<html>oops</html>"));

        let err = client.fetch_by_id::<Episode>(3).unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[test]
    fn test_resolve_reference_id() {
        assert_eq!(
            resolve_reference_id("https://rickandmortyapi.com/api/character/38").unwrap(),
            38
        );
        assert!(resolve_reference_id("https://rickandmortyapi.com/api/character/").is_err());
        assert!(resolve_reference_id("https://rickandmortyapi.com/api/character/abc").is_err());
        assert!(resolve_reference_id("").is_err());
        assert!(resolve_reference_id("character/0").is_err());
        assert!(resolve_reference_id("character/-4").is_err());
    }

    #[test]
    fn test_resolve_reference_ids_fails_on_any_bad_reference() {
        let refs = vec![
            format!("{BASE}/character/1"),
            format!("{BASE}/character/2"),
        ];
        assert_eq!(resolve_reference_ids(&refs).unwrap(), vec![1, 2]);

        let refs = vec![format!("{BASE}/character/1"), "nope".to_string()];
        assert!(resolve_reference_ids(&refs).is_err());
    }
}
