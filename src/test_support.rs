//! Shared fixtures for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::api::{HttpReply, Transport};
use crate::error::CatalogError;

pub const BASE: &str = "http://catalog.test/api";

/// In-memory transport answering from a script and recording every request
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Result<HttpReply, CatalogError>>>,
    held: Mutex<HashMap<String, Receiver<()>>>,
    panics: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, reply: HttpReply) {
        self.replies.lock().unwrap().insert(key.to_string(), Ok(reply));
    }

    pub fn fail(&self, key: &str, err: CatalogError) {
        self.replies.lock().unwrap().insert(key.to_string(), Err(err));
    }

    /// Block the next request for `key` until the returned sender fires
    pub fn hold(&self, key: &str) -> Sender<()> {
        let (tx, rx) = channel();
        self.held.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    /// Panic inside the next request for `key`, as a crashing worker would
    pub fn panic_on(&self, key: &str) {
        self.panics.lock().unwrap().insert(key.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn request_key(url: &str, query: &[(&'static str, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", url, pairs.join("&"))
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<HttpReply, CatalogError> {
        let key = request_key(url, query);
        self.requests.lock().unwrap().push(key.clone());

        let gate = self.held.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        let crash = self.panics.lock().unwrap().remove(&key);
        if crash {
            panic!("scripted crash on {key}");
        }

        self.replies
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(CatalogError::Transport(format!("unscripted request {key}"))))
    }
}

pub fn character_json(id: u32, name: &str) -> String {
    serde_json::json!({
        "id": id,
        "name": name,
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": {"name": "Earth (C-137)", "url": format!("{BASE}/location/1")},
        "location": {"name": "Citadel of Ricks", "url": format!("{BASE}/location/3")},
        "image": format!("{BASE}/character/avatar/{id}.jpeg"),
        "episode": [format!("{BASE}/episode/1")],
        "url": format!("{BASE}/character/{id}"),
        "created": "2017-11-04T18:48:46.250Z"
    })
    .to_string()
}

pub fn episode_json(id: u32, name: &str, character_ids: &[u32]) -> String {
    let characters: Vec<String> = character_ids
        .iter()
        .map(|c| format!("{BASE}/character/{c}"))
        .collect();
    serde_json::json!({
        "id": id,
        "name": name,
        "air_date": "December 2, 2013",
        "episode": format!("S01E{:02}", id),
        "characters": characters,
        "url": format!("{BASE}/episode/{id}"),
        "created": "2017-11-10T12:56:33.798Z"
    })
    .to_string()
}

/// A listing body; `next_page` fills the `next` locator
pub fn page_json(items: &[String], next_page: Option<u32>) -> String {
    let next = next_page.map(|p| format!("{BASE}/character?page={p}"));
    format!(
        r#"{{"info":{{"count":{},"pages":{},"next":{},"prev":null}},"results":[{}]}}"#,
        items.len(),
        next_page.unwrap_or(1),
        serde_json::to_string(&next).unwrap(),
        items.join(",")
    )
}

pub fn characters_page(ids: std::ops::RangeInclusive<u32>, next_page: Option<u32>) -> String {
    let items: Vec<String> = ids.map(|id| character_json(id, &format!("Character {id}"))).collect();
    page_json(&items, next_page)
}
