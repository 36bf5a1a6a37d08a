//! Pagination and filter state of one list view
//!
//! At most one request is live per list. `begin_load` raises the loading
//! guard and issues a numbered ticket before anything is dispatched, and
//! `complete` only accepts the ticket that is still current. A filter
//! change retires the live ticket, so a slow answer for an abandoned
//! filter can never be applied on top of the fresh results.

use crate::api::{CatalogClient, Transport};
use crate::error::CatalogError;
use crate::models::{Entity, FilterSet, Info, Page};

/// Everything a worker needs to perform one list fetch
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket<F> {
    pub seq: u64,
    pub append: bool,
    pub page: u32,
    pub filters: F,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied { added: usize },
    /// Answer for a retired ticket; nothing changed
    Stale,
    /// Items and info untouched
    Failed(CatalogError),
}

pub struct ListState<E: Entity> {
    page: u32,
    filters: E::Filters,
    items: Vec<E>,
    info: Option<Info>,
    last_seq: u64,
    in_flight: Option<u64>,
}

impl<E: Entity> Default for ListState<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ListState<E> {
    pub fn new() -> Self {
        Self {
            page: 1,
            filters: E::Filters::default(),
            items: Vec::new(),
            info: None,
            last_seq: 0,
            in_flight: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filters(&self) -> &E::Filters {
        &self.filters
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_next_page(&self) -> bool {
        self.info.as_ref().is_some_and(Info::has_next)
    }

    /// Store a trimmed filter value and start over from page 1.
    /// The caller triggers the fetch.
    pub fn set_filter(&mut self, field: <E::Filters as FilterSet>::Field, value: &str) {
        self.filters.set(field, value);
        self.reset();
    }

    fn reset(&mut self) {
        self.page = 1;
        self.items.clear();
        self.info = None;
        if let Some(seq) = self.in_flight.take() {
            log::debug!("Retiring {} request #{} after filter change", E::KIND, seq);
        }
    }

    /// Advance to the next page if the source reported one
    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Raise the loading guard and issue a ticket; `None` while a request is live
    pub fn begin_load(&mut self, append: bool) -> Option<LoadTicket<E::Filters>> {
        if let Some(seq) = self.in_flight {
            log::debug!("Dropping {} load, request #{} still in flight", E::KIND, seq);
            return None;
        }

        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        Some(LoadTicket {
            seq: self.last_seq,
            append,
            page: self.page,
            filters: self.filters.clone(),
        })
    }

    pub fn complete(
        &mut self,
        ticket: &LoadTicket<E::Filters>,
        result: Result<Page<E>, CatalogError>,
    ) -> LoadOutcome {
        if self.in_flight != Some(ticket.seq) {
            log::debug!("Discarding stale {} response #{}", E::KIND, ticket.seq);
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let added = page.results.len();
                if ticket.append {
                    self.items.extend(page.results);
                } else {
                    self.items = page.results;
                }
                self.info = Some(page.info);
                LoadOutcome::Applied { added }
            }
            Err(e) => {
                // The page counter was advanced for this request; give it back
                if ticket.append && self.page == ticket.page && self.page > 1 {
                    self.page -= 1;
                }
                LoadOutcome::Failed(e)
            }
        }
    }

    /// `begin_load` + fetch + `complete` on the calling thread.
    /// `Ok(false)` when dropped by the guard.
    pub fn load<T: Transport>(
        &mut self,
        client: &CatalogClient<T>,
        append: bool,
    ) -> Result<bool, CatalogError> {
        let Some(ticket) = self.begin_load(append) else {
            return Ok(false);
        };
        let result = client.fetch_page::<E>(ticket.page, &ticket.filters);
        match self.complete(&ticket, result) {
            LoadOutcome::Failed(e) => Err(e),
            LoadOutcome::Applied { .. } => Ok(true),
            LoadOutcome::Stale => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "list_state_tests.rs"]
mod tests;
