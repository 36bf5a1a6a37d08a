//! Page controller: user events in, surface updates out
//!
//! All state lives here and is only touched on the UI thread. Network calls
//! run on worker threads and report back through the task channel; results
//! tagged with an older navigation number belong to a page that is gone and
//! are dropped.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::api::{resolve_reference_ids, CatalogClient, Transport};
use crate::debounce::Debouncer;
use crate::error::CatalogError;
use crate::favorites::FavoritesStore;
use crate::list_state::{ListState, LoadOutcome, LoadTicket};
use crate::models::{
    Character, CharacterField, CharacterFilters, EntityId, EntityKind, Episode, EpisodeField,
    EpisodeFilters, FavoritesTab, Page,
};
use crate::route::{require_id, Route};
use crate::surface::{Placeholder, Region, SectionState, Surface};
use crate::view;

const MAX_CONSOLE_LINES: usize = 500;

const ERR_CHARACTERS: &str = "Error al cargar los personajes. Por favor, intenta de nuevo.";
const ERR_EPISODES: &str = "Error al cargar los episodios. Por favor, intenta de nuevo.";
const ERR_CHARACTER: &str = "Error al cargar el personaje. Por favor, intenta de nuevo.";
const ERR_EPISODE: &str = "Error al cargar el episodio. Por favor, intenta de nuevo.";
const ERR_FAVORITE_CHARACTERS: &str = "Error al cargar personajes favoritos";
const ERR_FAVORITE_EPISODES: &str = "Error al cargar episodios favoritos";
const ERR_CHARACTER_ID: &str = "ID de personaje no válido";
const ERR_EPISODE_ID: &str = "ID de episodio no válido";

/// Background task messages
pub enum TaskResult {
    CharactersPage {
        nav: u64,
        ticket: LoadTicket<CharacterFilters>,
        result: Result<Page<Character>, CatalogError>,
    },
    EpisodesPage {
        nav: u64,
        ticket: LoadTicket<EpisodeFilters>,
        result: Result<Page<Episode>, CatalogError>,
    },
    CharacterLoaded {
        nav: u64,
        result: Result<Character, CatalogError>,
    },
    EpisodeLoaded {
        nav: u64,
        result: Result<Episode, CatalogError>,
    },
    /// Roster of the episode detail page; failures are absorbed
    RosterLoaded {
        nav: u64,
        result: Result<Vec<Character>, CatalogError>,
    },
    FavoriteCharactersLoaded {
        nav: u64,
        result: Result<Vec<Character>, CatalogError>,
    },
    FavoriteEpisodesLoaded {
        nav: u64,
        result: Result<Vec<Episode>, CatalogError>,
    },
}

impl TaskResult {
    fn nav(&self) -> u64 {
        match self {
            TaskResult::CharactersPage { nav, .. }
            | TaskResult::EpisodesPage { nav, .. }
            | TaskResult::CharacterLoaded { nav, .. }
            | TaskResult::EpisodeLoaded { nav, .. }
            | TaskResult::RosterLoaded { nav, .. }
            | TaskResult::FavoriteCharactersLoaded { nav, .. }
            | TaskResult::FavoriteEpisodesLoaded { nav, .. } => *nav,
        }
    }

    /// Whether the page loader waits on this task
    fn is_primary(&self) -> bool {
        !matches!(self, TaskResult::RosterLoaded { .. })
    }
}

/// Debounced text inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInput {
    CharacterName,
    Species,
    EpisodeName,
}

pub struct Controller<T: Transport + 'static> {
    client: Arc<CatalogClient<T>>,
    favorites: FavoritesStore,
    route: Route,
    nav: u64,

    characters: ListState<Character>,
    episodes: ListState<Episode>,
    surface: Surface,

    name_search: Debouncer<String>,
    species_search: Debouncer<String>,
    episode_search: Debouncer<String>,

    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,
    pending: usize,
    primary_pending: usize,

    console_log: Vec<String>,
}

impl<T: Transport + 'static> Controller<T> {
    pub fn new(client: CatalogClient<T>, favorites: FavoritesStore, quiet: Duration) -> Self {
        let (task_sender, task_receiver) = channel();
        Self {
            client: Arc::new(client),
            favorites,
            route: Route::Characters,
            nav: 0,
            characters: ListState::new(),
            episodes: ListState::new(),
            surface: Surface::new(),
            name_search: Debouncer::new(quiet),
            species_search: Debouncer::new(quiet),
            episode_search: Debouncer::new(quiet),
            task_sender,
            task_receiver,
            pending: 0,
            primary_pending: 0,
            console_log: Vec::new(),
        }
    }

    pub fn client(&self) -> &CatalogClient<T> {
        &self.client
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn characters(&self) -> &ListState<Character> {
        &self.characters
    }

    pub fn episodes(&self) -> &ListState<Episode> {
        &self.episodes
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn console_log(&self) -> &[String] {
        &self.console_log
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.console_log.push(format!("[{}] {}", timestamp, message));
        if self.console_log.len() > MAX_CONSOLE_LINES {
            self.console_log.remove(0);
        }
    }

    /// Run `job` on a worker thread and report its outcome through `wrap`.
    /// A panicking job still reports back, as a transport error.
    fn spawn<R, J, W>(&mut self, primary: bool, job: J, wrap: W)
    where
        R: Send + 'static,
        J: FnOnce(&CatalogClient<T>) -> Result<R, CatalogError> + Send + 'static,
        W: FnOnce(Result<R, CatalogError>) -> TaskResult + Send + 'static,
    {
        self.pending += 1;
        if primary {
            self.primary_pending += 1;
            self.surface.loader = true;
        }

        let client = Arc::clone(&self.client);
        let sender = self.task_sender.clone();
        thread::spawn(move || {
            let worker = thread::spawn(move || job(client.as_ref()));
            let result = match worker.join() {
                Ok(result) => result,
                Err(_) => {
                    log::error!("Worker thread panicked");
                    Err(CatalogError::Transport("worker thread panicked".to_string()))
                }
            };
            let _ = sender.send(wrap(result));
        });
    }

    // ---- navigation -------------------------------------------------------

    /// Replace the current page. Everything page-scoped starts over.
    pub fn navigate(&mut self, route: Route) {
        self.nav += 1;
        self.route = route;
        self.surface.clear();
        self.characters = ListState::new();
        self.episodes = ListState::new();
        self.name_search.cancel();
        self.species_search.cancel();
        self.episode_search.cancel();
        self.log(&format!("[INFO] Opening {}", route.location()));

        match route {
            Route::Characters => self.load_characters(false),
            Route::Episodes => self.load_episodes(false),
            Route::CharacterDetail(id) => self.load_character_detail(id),
            Route::EpisodeDetail(id) => self.load_episode_detail(id),
            Route::Favorites => self.load_favorites_page(),
        }
    }

    pub fn open(&mut self, kind: EntityKind, id: EntityId) {
        self.navigate(Route::detail(kind, id));
    }

    // ---- list pages -------------------------------------------------------

    fn load_characters(&mut self, append: bool) {
        let Some(ticket) = self.characters.begin_load(append) else {
            return;
        };
        self.surface.error = None;
        let nav = self.nav;
        let (page, filters) = (ticket.page, ticket.filters.clone());
        self.spawn(
            true,
            move |client| client.fetch_page::<Character>(page, &filters),
            move |result| TaskResult::CharactersPage { nav, ticket, result },
        );
    }

    fn load_episodes(&mut self, append: bool) {
        let Some(ticket) = self.episodes.begin_load(append) else {
            return;
        };
        self.surface.error = None;
        let nav = self.nav;
        let (page, filters) = (ticket.page, ticket.filters.clone());
        self.spawn(
            true,
            move |client| client.fetch_page::<Episode>(page, &filters),
            move |result| TaskResult::EpisodesPage { nav, ticket, result },
        );
    }

    /// Keystroke in a search box; the fetch happens once the box goes quiet
    pub fn on_search_input(&mut self, input: SearchInput, text: &str, now: Instant) {
        let debouncer = match input {
            SearchInput::CharacterName => &mut self.name_search,
            SearchInput::Species => &mut self.species_search,
            SearchInput::EpisodeName => &mut self.episode_search,
        };
        debouncer.input(text.to_string(), now);
    }

    /// Select filters apply immediately
    pub fn on_character_filter(&mut self, field: CharacterField, value: &str) {
        self.characters.set_filter(field, value);
        self.load_characters(false);
    }

    /// The season select narrows the episode code, e.g. `S02`
    pub fn on_season_filter(&mut self, season: &str) {
        self.episodes.set_filter(EpisodeField::Code, season);
        self.load_episodes(false);
    }

    pub fn on_load_more(&mut self) {
        match self.route {
            Route::Characters => {
                if !self.characters.is_loading() && self.characters.next_page() {
                    self.load_characters(true);
                }
            }
            Route::Episodes => {
                if !self.episodes.is_loading() && self.episodes.next_page() {
                    self.load_episodes(true);
                }
            }
            _ => {}
        }
    }

    /// Fire debounced searches whose quiet interval has elapsed
    pub fn tick(&mut self, now: Instant) {
        if let Some(name) = self.name_search.poll(now) {
            self.on_character_filter(CharacterField::Name, &name);
        }
        if let Some(species) = self.species_search.poll(now) {
            self.on_character_filter(CharacterField::Species, &species);
        }
        if let Some(name) = self.episode_search.poll(now) {
            self.episodes.set_filter(EpisodeField::Name, &name);
            self.load_episodes(false);
        }
    }

    /// Earliest moment a pending debounce fires
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [&self.name_search, &self.species_search, &self.episode_search]
            .iter()
            .filter_map(|d| d.remaining(now))
            .min()
    }

    fn render_characters_grid(&mut self) {
        let cards = view::character_cards(
            self.characters.items(),
            self.favorites.set(EntityKind::Character),
        );
        self.surface
            .render_cards(Region::MainGrid, cards, Placeholder::NO_CHARACTERS);
        self.surface.load_more = self.characters.has_next_page();
    }

    fn render_episodes_grid(&mut self) {
        let cards = view::episode_cards(self.episodes.items(), self.favorites.set(EntityKind::Episode));
        self.surface
            .render_cards(Region::MainGrid, cards, Placeholder::NO_EPISODES);
        self.surface.load_more = self.episodes.has_next_page();
    }

    // ---- detail pages -----------------------------------------------------

    fn load_character_detail(&mut self, id: Option<EntityId>) {
        let id = match require_id(id, EntityKind::Character) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("{}", e);
                self.surface.error = Some(ERR_CHARACTER_ID.to_string());
                return;
            }
        };

        let nav = self.nav;
        self.spawn(
            true,
            move |client| client.fetch_by_id::<Character>(id),
            move |result| TaskResult::CharacterLoaded { nav, result },
        );
    }

    fn load_episode_detail(&mut self, id: Option<EntityId>) {
        let id = match require_id(id, EntityKind::Episode) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("{}", e);
                self.surface.error = Some(ERR_EPISODE_ID.to_string());
                return;
            }
        };

        let nav = self.nav;
        self.spawn(
            true,
            move |client| client.fetch_by_id::<Episode>(id),
            move |result| TaskResult::EpisodeLoaded { nav, result },
        );
    }

    /// Follow-up fetch for the roster; the detail is already on screen
    fn load_roster(&mut self, references: Vec<String>) {
        if references.is_empty() {
            return;
        }
        self.surface.roster = SectionState::Loading;

        let nav = self.nav;
        self.spawn(
            false,
            move |client| {
                resolve_reference_ids(&references).and_then(|ids| client.fetch_by_ids::<Character>(&ids))
            },
            move |result| TaskResult::RosterLoaded { nav, result },
        );
    }

    // ---- favorites page ---------------------------------------------------

    fn load_favorites_page(&mut self) {
        let counts = self.favorites.aggregate_counts();
        self.surface.stats = Some(counts);
        self.surface.empty_state = counts.total == 0;
        if counts.total == 0 {
            return;
        }

        let nav = self.nav;
        let character_ids: Vec<EntityId> = self
            .favorites
            .set(EntityKind::Character)
            .iter()
            .copied()
            .collect();
        if character_ids.is_empty() {
            self.surface
                .render_placeholder(Region::FavoriteCharacters, Placeholder::NO_FAVORITE_CHARACTERS);
        } else {
            self.spawn(
                true,
                move |client| client.fetch_by_ids::<Character>(&character_ids),
                move |result| TaskResult::FavoriteCharactersLoaded { nav, result },
            );
        }

        let episode_ids: Vec<EntityId> = self.favorites.set(EntityKind::Episode).iter().copied().collect();
        if episode_ids.is_empty() {
            self.surface
                .render_placeholder(Region::FavoriteEpisodes, Placeholder::NO_FAVORITE_EPISODES);
        } else {
            self.spawn(
                true,
                move |client| client.fetch_by_ids::<Episode>(&episode_ids),
                move |result| TaskResult::FavoriteEpisodesLoaded { nav, result },
            );
        }
    }

    pub fn switch_tab(&mut self, tab: FavoritesTab) {
        self.surface.tab = tab;
    }

    fn refresh_stats(&mut self) {
        let counts = self.favorites.aggregate_counts();
        self.surface.stats = Some(counts);
        self.surface.empty_state = counts.total == 0;
    }

    // ---- favorites --------------------------------------------------------

    /// Flip, persist, then patch every visible icon of that entity
    pub fn toggle_favorite(&mut self, kind: EntityKind, id: EntityId) {
        let is_favorite = self.favorites.toggle(kind, id);
        let touched = self.surface.update_favorite_icon(kind, id, is_favorite);
        log::debug!("Favorite {} {} -> {} ({} icons)", kind, id, is_favorite, touched);

        if self.route == Route::Favorites {
            if !is_favorite {
                let (region, placeholder) = match kind {
                    EntityKind::Character => (Region::FavoriteCharacters, Placeholder::NO_FAVORITE_CHARACTERS),
                    EntityKind::Episode => (Region::FavoriteEpisodes, Placeholder::NO_FAVORITE_EPISODES),
                };
                self.surface.remove_card(region, kind, id, placeholder);
            }
            self.refresh_stats();
        }
    }

    // ---- task results -----------------------------------------------------

    /// Apply every finished background task (non-blocking)
    pub fn process_results(&mut self) {
        while let Ok(result) = self.task_receiver.try_recv() {
            self.handle(result);
        }
    }

    fn handle(&mut self, result: TaskResult) {
        self.pending = self.pending.saturating_sub(1);
        if result.is_primary() {
            self.primary_pending = self.primary_pending.saturating_sub(1);
        }
        self.surface.loader = self.primary_pending > 0;

        if result.nav() != self.nav {
            log::debug!("Dropping result for a page that was left");
            return;
        }

        match result {
            TaskResult::CharactersPage { ticket, result, .. } => {
                match self.characters.complete(&ticket, result) {
                    LoadOutcome::Applied { added } => {
                        log::info!("Loaded {} characters (page {})", added, ticket.page);
                        self.log(&format!("[INFO] Loaded {} characters (page {})", added, ticket.page));
                        self.render_characters_grid();
                    }
                    LoadOutcome::Stale => {}
                    LoadOutcome::Failed(e) => {
                        log::error!("Character list failed: {}", e);
                        self.log(&format!("[ERROR] {}", e));
                        self.surface.error = Some(ERR_CHARACTERS.to_string());
                    }
                }
            }
            TaskResult::EpisodesPage { ticket, result, .. } => {
                match self.episodes.complete(&ticket, result) {
                    LoadOutcome::Applied { added } => {
                        log::info!("Loaded {} episodes (page {})", added, ticket.page);
                        self.log(&format!("[INFO] Loaded {} episodes (page {})", added, ticket.page));
                        self.render_episodes_grid();
                    }
                    LoadOutcome::Stale => {}
                    LoadOutcome::Failed(e) => {
                        log::error!("Episode list failed: {}", e);
                        self.log(&format!("[ERROR] {}", e));
                        self.surface.error = Some(ERR_EPISODES.to_string());
                    }
                }
            }
            TaskResult::CharacterLoaded { result, .. } => match result {
                Ok(character) => {
                    let detail = view::character_detail(&character, self.favorites.set(EntityKind::Character));
                    self.surface.render_detail(view::Detail::Character(detail));
                }
                Err(e) => {
                    log::error!("Character detail failed: {}", e);
                    self.log(&format!("[ERROR] {}", e));
                    self.surface.error = Some(ERR_CHARACTER.to_string());
                }
            },
            TaskResult::EpisodeLoaded { result, .. } => match result {
                Ok(episode) => {
                    let detail = view::episode_detail(&episode, self.favorites.set(EntityKind::Episode));
                    self.surface.render_detail(view::Detail::Episode(detail));
                    self.load_roster(episode.characters);
                }
                Err(e) => {
                    log::error!("Episode detail failed: {}", e);
                    self.log(&format!("[ERROR] {}", e));
                    self.surface.error = Some(ERR_EPISODE.to_string());
                }
            },
            TaskResult::RosterLoaded { result, .. } => {
                self.surface.roster = SectionState::Ready;
                match result {
                    Ok(characters) => {
                        let cards =
                            view::character_cards(&characters, self.favorites.set(EntityKind::Character));
                        self.surface
                            .render_cards(Region::RelatedCharacters, cards, Placeholder::NO_CHARACTERS);
                    }
                    Err(e) => log::warn!("Episode roster not loaded: {}", e),
                }
            }
            TaskResult::FavoriteCharactersLoaded { result, .. } => match result {
                Ok(characters) => {
                    let cards = view::character_cards(&characters, self.favorites.set(EntityKind::Character));
                    self.surface.render_cards(
                        Region::FavoriteCharacters,
                        cards,
                        Placeholder::NO_FAVORITE_CHARACTERS,
                    );
                }
                Err(e) => {
                    log::error!("Favorite characters failed: {}", e);
                    self.surface.error = Some(ERR_FAVORITE_CHARACTERS.to_string());
                }
            },
            TaskResult::FavoriteEpisodesLoaded { result, .. } => match result {
                Ok(episodes) => {
                    let cards = view::episode_cards(&episodes, self.favorites.set(EntityKind::Episode));
                    self.surface.render_cards(
                        Region::FavoriteEpisodes,
                        cards,
                        Placeholder::NO_FAVORITE_EPISODES,
                    );
                }
                Err(e) => {
                    log::error!("Favorite episodes failed: {}", e);
                    self.surface.error = Some(ERR_FAVORITE_EPISODES.to_string());
                }
            },
        }
    }

    /// Block until one background task has reported back
    #[cfg(test)]
    pub(crate) fn wait_one(&mut self) {
        let result = self
            .task_receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("background task did not report back");
        self.handle(result);
    }

    /// Block until no background task is left
    #[cfg(test)]
    pub(crate) fn wait_idle(&mut self) {
        while self.pending > 0 {
            self.wait_one();
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
