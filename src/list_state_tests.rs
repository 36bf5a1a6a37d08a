//! Tests for list pagination and filter state

#[cfg(test)]
mod tests {
    use crate::api::{CatalogClient, HttpReply};
    use crate::error::CatalogError;
    use crate::list_state::*;
    use crate::models::{Character, CharacterField, Episode, EpisodeField, Info, Page};
    use crate::test_support::{characters_page, episode_json, page_json, ScriptedTransport, BASE};

    fn client() -> CatalogClient<ScriptedTransport> {
        CatalogClient::new(BASE, ScriptedTransport::new())
    }

    fn ids(list: &ListState<Character>) -> Vec<u32> {
        list.items().iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_initial_load_then_load_more_appends_in_order() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character?page=1"), HttpReply::ok(characters_page(1..=20, Some(2))));
        client
            .transport()
            .respond(&format!("{BASE}/character?page=2"), HttpReply::ok(characters_page(21..=27, None)));

        let mut list = ListState::<Character>::new();
        assert!(list.load(&client, false).unwrap());
        assert_eq!(list.items().len(), 20);
        assert!(list.has_next_page());

        assert!(list.next_page());
        assert_eq!(list.page(), 2);
        assert!(list.load(&client, true).unwrap());
        assert_eq!(ids(&list), (1..=27).collect::<Vec<_>>());
        assert!(!list.has_next_page());
    }

    #[test]
    fn test_next_page_without_next_locator_is_a_no_op() {
        let mut list = ListState::<Character>::new();
        assert!(!list.next_page());
        assert_eq!(list.page(), 1);

        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character?page=1"), HttpReply::ok(characters_page(1..=3, None)));
        list.load(&client, false).unwrap();

        assert!(!list.next_page());
        assert_eq!(list.page(), 1);
        assert_eq!(list.items().len(), 3);
    }

    #[test]
    fn test_set_filter_resets_accumulated_pages() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character?page=1"), HttpReply::ok(characters_page(1..=20, Some(2))));
        client
            .transport()
            .respond(&format!("{BASE}/character?page=2"), HttpReply::ok(characters_page(21..=40, Some(3))));
        client.transport().respond(
            &format!("{BASE}/character?page=1&status=dead"),
            HttpReply::ok(characters_page(100..=101, None)),
        );

        let mut list = ListState::<Character>::new();
        list.load(&client, false).unwrap();
        list.next_page();
        list.load(&client, true).unwrap();
        assert_eq!(list.items().len(), 40);

        list.set_filter(CharacterField::Status, " dead ");
        assert_eq!(list.page(), 1);
        assert!(list.items().is_empty());
        assert!(list.info().is_none());
        assert_eq!(list.filters().status, "dead");

        list.load(&client, false).unwrap();
        assert_eq!(ids(&list), vec![100, 101]);
        assert_eq!(
            client.transport().requests().last().unwrap(),
            &format!("{BASE}/character?page=1&status=dead")
        );
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/character?page=1"), HttpReply::ok(characters_page(1..=20, Some(2))));
        client
            .transport()
            .respond(&format!("{BASE}/character?page=2"), HttpReply::status(503));

        let mut list = ListState::<Character>::new();
        list.load(&client, false).unwrap();
        let items_before = list.items().to_vec();
        let info_before = list.info().cloned();

        list.next_page();
        let err = list.load(&client, true).unwrap_err();
        assert_eq!(err, CatalogError::Remote { status: 503 });
        assert_eq!(list.items(), items_before.as_slice());
        assert_eq!(list.info().cloned(), info_before);
        assert!(!list.is_loading());
        // Retrying load more asks for page 2 again
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn test_not_found_listing_is_an_empty_success() {
        let client = client();
        client
            .transport()
            .respond(&format!("{BASE}/episode?page=1&name=xyz"), HttpReply::status(404));

        let mut list = ListState::<Episode>::new();
        list.set_filter(EpisodeField::Name, "xyz");
        assert!(list.load(&client, false).unwrap());
        assert!(list.items().is_empty());
        assert_eq!(list.info(), Some(&Info::default()));
        assert!(!list.has_next_page());
    }

    #[test]
    fn test_second_begin_while_loading_is_dropped() {
        let mut list = ListState::<Character>::new();
        let ticket = list.begin_load(false).unwrap();
        assert!(list.is_loading());
        assert!(list.begin_load(true).is_none());

        let outcome = list.complete(&ticket, Ok(Page::empty()));
        assert_eq!(outcome, LoadOutcome::Applied { added: 0 });
        assert!(!list.is_loading());
        assert!(list.begin_load(false).is_some());
    }

    #[test]
    fn test_filter_change_retires_in_flight_request() {
        let client = client();
        client.transport().respond(
            &format!("{BASE}/character?page=1&name=rick"),
            HttpReply::ok(characters_page(1..=5, None)),
        );
        client.transport().respond(
            &format!("{BASE}/character?page=1&name=morty"),
            HttpReply::ok(characters_page(50..=52, None)),
        );

        let mut list = ListState::<Character>::new();
        list.set_filter(CharacterField::Name, "rick");
        let rick = list.begin_load(false).unwrap();

        // "morty" typed before the "rick" answer arrives
        list.set_filter(CharacterField::Name, "morty");
        let morty = list.begin_load(false).unwrap();
        assert!(morty.seq > rick.seq);

        let morty_page = client.fetch_page::<Character>(morty.page, &morty.filters);
        assert_eq!(list.complete(&morty, morty_page), LoadOutcome::Applied { added: 3 });

        let rick_page = client.fetch_page::<Character>(rick.page, &rick.filters);
        assert_eq!(list.complete(&rick, rick_page), LoadOutcome::Stale);
        assert_eq!(ids(&list), vec![50, 51, 52]);
        assert_eq!(list.filters().name, "morty");
    }

    #[test]
    fn test_stale_answer_arriving_while_newer_request_pending_is_ignored() {
        let mut list = ListState::<Episode>::new();
        let old = list.begin_load(false).unwrap();
        list.set_filter(EpisodeField::Code, "S02");
        let new = list.begin_load(false).unwrap();

        let body = page_json(&[episode_json(1, "Pilot", &[])], None);
        let old_page: Page<Episode> = serde_json::from_str(&body).unwrap();
        assert_eq!(list.complete(&old, Ok(old_page)), LoadOutcome::Stale);
        assert!(list.is_loading(), "newer request keeps the guard");
        assert!(list.items().is_empty());

        assert_eq!(list.complete(&new, Ok(Page::empty())), LoadOutcome::Applied { added: 0 });
        assert!(!list.is_loading());
    }
}
