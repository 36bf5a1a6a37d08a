//! Portal Catalog - Rick and Morty catalog browser
//! Characters and episodes from the public API, with local favorites

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::time::{Duration, Instant};

mod api;
mod config;
mod controller;
mod debounce;
mod error;
mod favorites;
mod list_state;
mod models;
mod route;
mod storage;
mod surface;
mod view;

#[cfg(test)]
mod test_support;

use api::{CatalogClient, UreqTransport};
use config::AppConfig;
use controller::{Controller, SearchInput};
use favorites::FavoritesStore;
use models::{CharacterField, EntityId, EntityKind, FavoritesTab};
use route::Route;
use storage::FileStore;
use surface::{Fragment, Region, SectionState, Surface};
use view::{Card, Detail, FavoriteIcon};

const STATUS_OPTIONS: &[(&str, &str)] = &[
    ("", "Todos los estados"),
    ("alive", "Vivo"),
    ("dead", "Muerto"),
    ("unknown", "Desconocido"),
];

const GENDER_OPTIONS: &[(&str, &str)] = &[
    ("", "Todos los géneros"),
    ("male", "Masculino"),
    ("female", "Femenino"),
    ("genderless", "Sin género"),
    ("unknown", "Desconocido"),
];

const SEASON_OPTIONS: &[(&str, &str)] = &[
    ("", "Todas las temporadas"),
    ("S01", "Temporada 1"),
    ("S02", "Temporada 2"),
    ("S03", "Temporada 3"),
    ("S04", "Temporada 4"),
    ("S05", "Temporada 5"),
];

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();
    let start = std::env::args()
        .nth(1)
        .map(|location| Route::parse(&location))
        .unwrap_or(Route::Characters);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([760.0, 480.0]),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Portal Catalog",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if config.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            cc.egui_ctx.set_zoom_factor(config.font_size as f32 / 14.0);
            Ok(Box::new(CatalogApp::new(config, start)))
        }),
    )
}

/// What the user did this frame; applied once drawing is done
enum UiAction {
    Navigate(Route),
    Open(EntityKind, EntityId),
    ToggleFavorite(EntityKind, EntityId),
    Search(SearchInput, String),
    CharacterFilter(CharacterField, String),
    Season(String),
    LoadMore,
    SwitchTab(FavoritesTab),
}

/// Text and select values bound to the filter widgets
#[derive(Default)]
struct Inputs {
    name: String,
    species: String,
    status: String,
    gender: String,
    episode_name: String,
    season: String,
}

struct CatalogApp {
    controller: Controller<UreqTransport>,
    inputs: Inputs,
    show_console: bool,
    config: AppConfig,
}

impl CatalogApp {
    fn new(config: AppConfig, start: Route) -> Self {
        let transport = UreqTransport::new(&config.user_agent, config.request_timeout());
        let client = CatalogClient::new(&config.base_url, transport);
        let favorites = FavoritesStore::open(Box::new(FileStore::open(&config::storage_path())));
        log::info!("Catalog at {}, favorites at {}", config.base_url, config::storage_path().display());

        let mut controller = Controller::new(client, favorites, config.debounce());
        controller.navigate(start);

        Self {
            controller,
            inputs: Inputs::default(),
            show_console: false,
            config,
        }
    }

    fn apply(&mut self, action: UiAction) {
        let now = Instant::now();
        match action {
            UiAction::Navigate(route) => {
                self.inputs = Inputs::default();
                self.controller.navigate(route);
            }
            UiAction::Open(kind, id) => {
                self.inputs = Inputs::default();
                self.controller.open(kind, id);
            }
            UiAction::ToggleFavorite(kind, id) => self.controller.toggle_favorite(kind, id),
            UiAction::Search(input, text) => self.controller.on_search_input(input, &text, now),
            UiAction::CharacterFilter(field, value) => self.controller.on_character_filter(field, &value),
            UiAction::Season(code) => self.controller.on_season_filter(&code),
            UiAction::LoadMore => self.controller.on_load_more(),
            UiAction::SwitchTab(tab) => self.controller.switch_tab(tab),
        }
    }
}

impl eframe::App for CatalogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        self.controller.process_results();
        self.controller.tick(Instant::now());

        let mut actions: Vec<UiAction> = Vec::new();
        let route = self.controller.route();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Portal Catalog");
                ui.separator();
                for (label, target) in [
                    ("Personajes", Route::Characters),
                    ("Episodios", Route::Episodes),
                    ("Favoritos", Route::Favorites),
                ] {
                    if ui.selectable_label(route == target, label).clicked() {
                        actions.push(UiAction::Navigate(target));
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_console, "Console");
                    let theme = if self.config.dark_mode { "☀" } else { "🌙" };
                    if ui.button(theme).on_hover_text("Cambiar tema").clicked() {
                        self.config.dark_mode = !self.config.dark_mode;
                        ctx.set_visuals(if self.config.dark_mode {
                            egui::Visuals::dark()
                        } else {
                            egui::Visuals::light()
                        });
                        self.config.save();
                    }
                });
            });
        });

        if self.show_console {
            egui::TopBottomPanel::bottom("console")
                .resizable(true)
                .default_height(140.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            for line in self.controller.console_log() {
                                ui.monospace(line);
                            }
                        });
                });
        }

        let surface = self.controller.surface();
        let inputs = &mut self.inputs;
        egui::CentralPanel::default().show(ctx, |ui| {
            match route {
                Route::Characters => character_filters(ui, inputs, &mut actions),
                Route::Episodes => episode_filters(ui, inputs, &mut actions),
                _ => {}
            }

            banners(ui, surface);

            egui::ScrollArea::vertical()
                .id_salt(route.location())
                .auto_shrink([false, false])
                .show(ui, |ui| match route {
                    Route::Characters | Route::Episodes => {
                        region(ui, surface, Region::MainGrid, &mut actions);
                        if surface.load_more {
                            ui.add_space(8.0);
                            if ui.button("Cargar más").clicked() {
                                actions.push(UiAction::LoadMore);
                            }
                        }
                    }
                    Route::CharacterDetail(_) => region(ui, surface, Region::Detail, &mut actions),
                    Route::EpisodeDetail(_) => {
                        region(ui, surface, Region::Detail, &mut actions);
                        roster(ui, surface, &mut actions);
                    }
                    Route::Favorites => favorites_page(ui, surface, &mut actions),
                });
        });

        for action in actions {
            self.apply(action);
        }

        if self.controller.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some(wait) = self.controller.next_deadline(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}

fn select(ui: &mut egui::Ui, id: &str, value: &mut String, options: &[(&str, &str)]) -> bool {
    let before = value.clone();
    let selected = options
        .iter()
        .find(|(v, _)| *v == value.as_str())
        .map(|(_, label)| *label)
        .unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for (v, label) in options {
                ui.selectable_value(&mut *value, v.to_string(), *label);
            }
        });
    *value != before
}

fn character_filters(ui: &mut egui::Ui, inputs: &mut Inputs, actions: &mut Vec<UiAction>) {
    ui.horizontal_wrapped(|ui| {
        let search = ui.add(egui::TextEdit::singleline(&mut inputs.name).hint_text("Buscar personaje..."));
        if search.changed() {
            actions.push(UiAction::Search(SearchInput::CharacterName, inputs.name.clone()));
        }
        if select(ui, "status_filter", &mut inputs.status, STATUS_OPTIONS) {
            actions.push(UiAction::CharacterFilter(CharacterField::Status, inputs.status.clone()));
        }
        let species = ui.add(
            egui::TextEdit::singleline(&mut inputs.species)
                .hint_text("Especie")
                .desired_width(120.0),
        );
        if species.changed() {
            actions.push(UiAction::Search(SearchInput::Species, inputs.species.clone()));
        }
        if select(ui, "gender_filter", &mut inputs.gender, GENDER_OPTIONS) {
            actions.push(UiAction::CharacterFilter(CharacterField::Gender, inputs.gender.clone()));
        }
    });
    ui.separator();
}

fn episode_filters(ui: &mut egui::Ui, inputs: &mut Inputs, actions: &mut Vec<UiAction>) {
    ui.horizontal_wrapped(|ui| {
        let search = ui.add(
            egui::TextEdit::singleline(&mut inputs.episode_name).hint_text("Buscar episodio..."),
        );
        if search.changed() {
            actions.push(UiAction::Search(SearchInput::EpisodeName, inputs.episode_name.clone()));
        }
        if select(ui, "season_filter", &mut inputs.season, SEASON_OPTIONS) {
            actions.push(UiAction::Season(inputs.season.clone()));
        }
    });
    ui.separator();
}

fn banners(ui: &mut egui::Ui, surface: &Surface) {
    if surface.loader {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Cargando...");
        });
    }
    if let Some(error) = &surface.error {
        ui.colored_label(egui::Color32::from_rgb(230, 80, 80), error);
    }
}

fn favorite_button(ui: &mut egui::Ui, icon: &FavoriteIcon, size: f32, actions: &mut Vec<UiAction>) {
    let color = if icon.filled { egui::Color32::GOLD } else { egui::Color32::GRAY };
    let text = egui::RichText::new(icon.glyph()).size(size).color(color);
    if ui.button(text).on_hover_text(icon.hint()).clicked() {
        actions.push(UiAction::ToggleFavorite(icon.kind, icon.id));
    }
}

fn status_color(status: models::Status) -> egui::Color32 {
    match status {
        models::Status::Alive => egui::Color32::from_rgb(85, 204, 68),
        models::Status::Dead => egui::Color32::from_rgb(214, 61, 46),
        models::Status::Unknown => egui::Color32::GRAY,
    }
}

fn region(ui: &mut egui::Ui, surface: &Surface, region: Region, actions: &mut Vec<UiAction>) {
    match surface.fragment(region) {
        Some(Fragment::Cards(cards)) => {
            ui.horizontal_wrapped(|ui| {
                for card in cards {
                    card_view(ui, card, actions);
                }
            });
        }
        Some(Fragment::NoResults { icon, message, action }) => {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(egui::RichText::new(*icon).size(32.0));
                ui.label(message);
                if let Some((label, location)) = action {
                    if ui.button(label).clicked() {
                        actions.push(UiAction::Navigate(Route::parse(location)));
                    }
                }
            });
        }
        Some(Fragment::Detail(detail)) => detail_view(ui, detail, actions),
        None => {}
    }
}

fn card_view(ui: &mut egui::Ui, card: &Card, actions: &mut Vec<UiAction>) {
    ui.group(|ui| {
        ui.set_width(230.0);
        ui.vertical(|ui| match card {
            Card::Character(c) => {
                ui.horizontal(|ui| {
                    if ui.link(egui::RichText::new(&c.name).strong()).clicked() {
                        actions.push(UiAction::Open(EntityKind::Character, c.id));
                    }
                    favorite_button(ui, &c.favorite, 18.0, actions);
                });
                ui.horizontal(|ui| {
                    ui.colored_label(status_color(c.status), "●");
                    ui.label(c.status_label);
                });
                ui.label(format!("Especie: {}", c.species));
                ui.label(format!("Género: {}", c.gender_label));
                if !c.image.is_empty() {
                    ui.hyperlink_to("Imagen", &c.image);
                }
            }
            Card::Episode(e) => {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&e.code).monospace().strong());
                    favorite_button(ui, &e.favorite, 18.0, actions);
                });
                if ui.link(egui::RichText::new(&e.name).strong()).clicked() {
                    actions.push(UiAction::Open(EntityKind::Episode, e.id));
                }
                ui.label(&e.subtitle);
                ui.label(format!("📅 Fecha de emisión: {}", e.air_date));
                ui.label(format!("👥 Personajes: {}", e.character_count));
                if ui.button("Ver detalle →").clicked() {
                    actions.push(UiAction::Open(EntityKind::Episode, e.id));
                }
            }
        });
    });
}

fn detail_view(ui: &mut egui::Ui, detail: &Detail, actions: &mut Vec<UiAction>) {
    match detail {
        Detail::Character(d) => {
            ui.horizontal(|ui| {
                ui.heading(&d.card.name);
                favorite_button(ui, &d.card.favorite, 28.0, actions);
            });
            if !d.card.image.is_empty() {
                ui.hyperlink_to("Imagen", &d.card.image);
            }
            egui::Grid::new("character_detail").num_columns(2).striped(true).show(ui, |ui| {
                ui.label("Estado");
                ui.colored_label(status_color(d.card.status), d.card.status_label);
                ui.end_row();
                for (label, value) in [
                    ("Especie", d.card.species.as_str()),
                    ("Tipo", d.kind_label.as_str()),
                    ("Género", d.card.gender_label),
                    ("Origen", d.origin.as_str()),
                    ("Ubicación", d.location.as_str()),
                ] {
                    ui.label(label);
                    ui.label(value);
                    ui.end_row();
                }
            });
        }
        Detail::Episode(d) => {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&d.card.code).monospace().size(20.0));
                ui.heading(&d.card.name);
                favorite_button(ui, &d.card.favorite, 28.0, actions);
            });
            ui.label(&d.card.subtitle);
            egui::Grid::new("episode_detail").num_columns(2).striped(true).show(ui, |ui| {
                ui.label("Código del Episodio");
                ui.label(&d.card.code);
                ui.end_row();
                ui.label("Fecha de Emisión");
                ui.label(&d.card.air_date);
                ui.end_row();
                ui.label("Personajes");
                ui.label(format!("{} personajes", d.card.character_count));
                ui.end_row();
                ui.label("Temporada");
                ui.label(&d.season_label);
                ui.end_row();
            });
        }
    }
}

fn roster(ui: &mut egui::Ui, surface: &Surface, actions: &mut Vec<UiAction>) {
    if surface.roster == SectionState::Hidden {
        return;
    }
    ui.add_space(12.0);
    ui.separator();
    ui.heading("Personajes del episodio");
    if surface.roster == SectionState::Loading {
        ui.spinner();
    }
    region(ui, surface, Region::RelatedCharacters, actions);
}

fn favorites_page(ui: &mut egui::Ui, surface: &Surface, actions: &mut Vec<UiAction>) {
    if let Some(stats) = surface.stats {
        ui.horizontal(|ui| {
            ui.label(format!("Personajes: {}", stats.characters));
            ui.separator();
            ui.label(format!("Episodios: {}", stats.episodes));
            ui.separator();
            ui.label(egui::RichText::new(format!("Total: {}", stats.total)).strong());
        });
    }

    if surface.empty_state {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(egui::RichText::new("💫").size(32.0));
            ui.label("Aún no tienes favoritos");
            if ui.button("Explorar Personajes").clicked() {
                actions.push(UiAction::Navigate(Route::Characters));
            }
        });
        return;
    }

    ui.horizontal(|ui| {
        for (label, tab) in [("Personajes", FavoritesTab::Characters), ("Episodios", FavoritesTab::Episodes)] {
            if ui.selectable_label(surface.tab == tab, label).clicked() {
                actions.push(UiAction::SwitchTab(tab));
            }
        }
    });
    ui.separator();

    match surface.tab {
        FavoritesTab::Characters => region(ui, surface, Region::FavoriteCharacters, actions),
        FavoritesTab::Episodes => region(ui, surface, Region::FavoriteEpisodes, actions),
    }
}
