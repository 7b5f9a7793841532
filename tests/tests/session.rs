use chrono::{TimeZone, Utc};
use notes_client::{
    api::{Entry, EntryId, Error as ApiError, NewEntry, SubmitResponse},
    DraftState, FetchError, Session, SessionError, SubmitError, ValidationError,
};
use notes_mock_server::{MockServer, MockService};

fn entry(id: u64, title: &str, tags: &[&str], parent: Option<u64>) -> Entry {
    Entry {
        id: EntryId::Num(id),
        title: String::from(title),
        text: format!("text of {title}"),
        tags: tags.iter().map(|t| String::from(*t)).collect(),
        parent_id: parent.map(EntryId::Num),
        timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, id as u32).unwrap()),
    }
}

fn ids(entries: &[std::sync::Arc<Entry>]) -> Vec<EntryId> {
    entries.iter().map(|e| e.id.clone()).collect()
}

async fn session_with(entries: Vec<Entry>) -> (MockService, Session<MockService>) {
    let svc = MockService::new(MockServer::with_entries(entries));
    let mut session = Session::new(svc.clone());
    session.refresh().await.expect("initial fetch");
    (svc, session)
}

#[tokio::test]
async fn reply_lands_in_the_thread_and_the_tag() {
    let (svc, mut session) = session_with(vec![entry(1, "A", &["x"], None)]).await;

    let draft = session.start_reply(&EntryId::Num(1)).expect("entry 1 is stored");
    assert_eq!(draft.title, "Re: A");
    assert_eq!(draft.tags, "x");
    assert_eq!(session.state(), DraftState::Composing);
    assert_eq!(session.replying_to().map(|e| e.id.clone()), Some(EntryId::Num(1)));

    session.set_text("t2");
    assert_eq!(session.submit().await, Ok(SubmitResponse::saved()));

    assert_eq!(
        svc.submitted(),
        vec![NewEntry {
            title: String::from("Re: A"),
            text: String::from("t2"),
            tags: String::from("x"),
            parent_id: Some(EntryId::Num(1)),
        }]
    );
    assert_eq!(session.store().len(), 2);
    assert_eq!(
        ids(&session.tag_index().entries_for("x", session.store())),
        vec![EntryId::Num(1), EntryId::Num(2)]
    );
    assert_eq!(
        ids(session.store().children_of(&EntryId::Num(1))),
        vec![EntryId::Num(2)]
    );
    assert!(session.draft().is_empty());
    assert_eq!(session.state(), DraftState::Idle);
    assert_eq!(session.message(), Some("Entry saved."));
    assert!(!session.is_stale());
    assert_eq!(svc.num_fetches(), 2);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_service() {
    let (svc, mut session) = session_with(Vec::new()).await;

    assert_eq!(
        session.submit().await,
        Err(SessionError::Validation(ValidationError::EmptyTitle))
    );
    session.set_title("A");
    session.set_text("  \n ");
    assert_eq!(
        session.submit().await,
        Err(SessionError::Validation(ValidationError::EmptyText))
    );

    assert!(svc.submitted().is_empty());
    assert_eq!(session.draft().title, "A");
    assert_eq!(session.state(), DraftState::Composing);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn failed_fetch_keeps_the_previous_snapshot() {
    let (svc, mut session) =
        session_with(vec![entry(1, "A", &["x"], None), entry(2, "B", &[], None)]).await;

    svc.with_server(|s| {
        s.submit(NewEntry {
            title: String::from("C"),
            text: String::from("t"),
            tags: String::from("y"),
            parent_id: None,
        })
    })
    .expect("mock accepts entry");
    svc.fail_next_fetch(FetchError::Status(503));
    assert_eq!(session.refresh().await, Err(FetchError::Status(503)));

    assert_eq!(session.store().len(), 2);
    assert!(!session.tag_index().contains("y"));
    assert_eq!(session.tag_index().count("x"), 1);

    session.refresh().await.expect("second fetch");
    assert_eq!(session.store().len(), 3);
    assert_eq!(session.tag_index().count("y"), 1);
}

#[tokio::test]
async fn failed_submission_keeps_the_draft() {
    let (svc, mut session) = session_with(vec![entry(1, "A", &["x"], None)]).await;

    session.start_reply(&EntryId::Num(1));
    session.set_text("t2");
    let draft = session.draft().clone();

    svc.fail_next_submit(SubmitError::Network(String::from("connection reset")));
    assert_eq!(
        session.submit().await,
        Err(SessionError::Submit(SubmitError::Network(String::from(
            "connection reset"
        ))))
    );
    assert_eq!(session.draft(), &draft);
    assert_eq!(session.state(), DraftState::Composing);
    assert_eq!(session.store().len(), 1);
    assert_eq!(svc.num_fetches(), 1);

    // retrying the same draft succeeds
    assert_eq!(session.submit().await, Ok(SubmitResponse::saved()));
    assert_eq!(session.store().len(), 2);
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn service_rejection_is_reported() {
    let (svc, mut session) = session_with(Vec::new()).await;
    session.set_title("A");
    session.set_text("t");
    svc.fail_next_submit(SubmitError::Rejected(ApiError::MissingTitleOrText));
    assert_eq!(
        session.submit().await,
        Err(SessionError::Submit(SubmitError::Rejected(
            ApiError::MissingTitleOrText
        )))
    );
    assert_eq!(session.draft().title, "A");
}

#[tokio::test]
async fn failed_refetch_after_submit_leaves_session_stale() {
    let (svc, mut session) = session_with(Vec::new()).await;
    session.set_title("A");
    session.set_text("t");
    svc.fail_next_fetch(FetchError::Network(String::from("timeout")));

    assert_eq!(session.submit().await, Ok(SubmitResponse::saved()));
    assert!(session.is_stale());
    assert!(session.store().is_empty());
    assert!(session.draft().is_empty());

    session.refresh_if_stale().await.expect("fetch after outage");
    assert!(!session.is_stale());
    assert_eq!(session.store().len(), 1);

    let fetches = svc.num_fetches();
    session.refresh_if_stale().await.expect("no-op");
    assert_eq!(svc.num_fetches(), fetches);
}

#[tokio::test]
async fn other_clients_writes_show_up_after_submit() {
    let (svc, mut session) = session_with(vec![entry(1, "A", &["x"], None)]).await;

    // another client replies to A while we compose
    svc.with_server(|s| {
        s.submit(NewEntry {
            title: String::from("Re: A"),
            text: String::from("theirs"),
            tags: String::from("x"),
            parent_id: Some(EntryId::Num(1)),
        })
    })
    .expect("mock accepts entry");

    session.start_reply(&EntryId::Num(1));
    session.set_text("ours");
    session.submit().await.expect("submitting");

    let texts = session
        .store()
        .children_of(&EntryId::Num(1))
        .iter()
        .map(|e| e.text.clone())
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["theirs", "ours"]);
    assert_eq!(session.tag_index().count("x"), 3);
}

#[tokio::test]
async fn tag_selection() {
    let (svc, mut session) = session_with(vec![
        entry(1, "A", &["x", "y"], None),
        entry(2, "B", &["y"], None),
        entry(3, "C", &[], Some(1)),
    ])
    .await;

    let first = session.select_tag("y");
    assert_eq!(ids(&first), vec![EntryId::Num(1), EntryId::Num(2)]);
    assert_eq!(ids(&session.select_tag("y")), ids(&first));
    assert_eq!(session.selected_tag(), Some("y"));

    assert!(session.select_tag("nope").is_empty());
    assert_eq!(session.selected_tag(), Some("y"));
    assert_eq!(ids(&session.filtered_entries()), ids(&first));

    session.select_tag("x");
    svc.with_server(|s| s.delete_entry(&EntryId::Num(1), true))
        .expect("deleting A");
    session.refresh().await.expect("refetching");
    assert_eq!(session.selected_tag(), None);
    assert!(session.filtered_entries().is_empty());
    assert_eq!(session.store().len(), 1);
    assert_eq!(ids(&session.select_tag("y")), vec![EntryId::Num(2)]);

    session.clear_selection();
    assert_eq!(session.selected_tag(), None);
}

#[tokio::test]
async fn reply_to_unknown_entry_is_refused() {
    let (_svc, mut session) = session_with(vec![entry(1, "A", &[], None)]).await;
    session.set_title("draft");
    assert!(session.start_reply(&EntryId::Num(7)).is_none());
    assert_eq!(session.draft().title, "draft");
    assert_eq!(session.replying_to(), None);
    assert_eq!(session.state(), DraftState::Composing);
}
