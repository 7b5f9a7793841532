use std::{collections::HashSet, panic::AssertUnwindSafe};

use bolero::generator::TypeGenerator;

use notes_client::{
    api::{join_tags, EntryId, NewEntry},
    Session,
};
use notes_mock_server::{MockServer, MockService};

const TAG_POOL: &[&str] = &["work", "home", "urgent", "idea", "later"];

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
struct GenEntry {
    title: u8,
    blank_text: bool,
    #[generator(bolero::generator::gen_with::<Vec<u8>>().len(0..4usize))]
    tags: Vec<u8>,
    parent: Option<usize>,
}

fn fill(server: &mut MockServer, generated: &[GenEntry]) -> usize {
    let mut accepted = 0;
    for e in generated {
        let num = server.test_num_entries();
        let parent = match (e.parent, num) {
            (Some(p), n) if n > 0 => Some(server.test_get_entry_id(p % n).clone()),
            _ => None,
        };
        let tags = e
            .tags
            .iter()
            .map(|t| TAG_POOL[*t as usize % TAG_POOL.len()])
            .collect::<Vec<_>>();
        let res = server.submit(NewEntry {
            title: format!("entry {}", e.title),
            text: match e.blank_text {
                true => String::from(" "),
                false => format!("about {}", tags.join(" and ")),
            },
            tags: tags.join(", "),
            parent_id: parent,
        });
        assert_eq!(res.is_ok(), !e.blank_text);
        accepted += res.is_ok() as usize;
    }
    accepted
}

#[test]
fn snapshot_invariants() {
    let runtime = AssertUnwindSafe(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed initializing tokio runtime"),
    );
    bolero::check!()
        .with_type::<Vec<GenEntry>>()
        .for_each(move |generated| {
            let svc = MockService::new(MockServer::new());
            let accepted = svc.with_server(|s| fill(s, generated));
            let mut session = Session::new(svc);
            runtime
                .block_on(session.refresh())
                .expect("fetching from mock");

            let store = session.store();
            let index = session.tag_index();
            assert_eq!(store.len(), accepted);

            let ids = store.all().iter().map(|e| &e.id).collect::<HashSet<_>>();
            assert_eq!(ids.len(), store.len(), "entry ids are unique");

            for (tag, count) in index.tags() {
                let entries = index.entries_for(tag, store);
                assert_eq!(entries.len(), count);
                assert!(entries.iter().all(|e| e.tags.iter().any(|t| t == tag)));
            }
            for e in store.all() {
                for t in &e.tags {
                    assert!(index.ids_for(t).contains(&e.id), "{} missing from {t}", e.id);
                }
            }

            let mut seen = HashSet::new();
            for root in store.top_level() {
                for (depth, e) in store.thread(&root.id) {
                    assert_eq!(depth == 0, e.parent_id.is_none());
                    assert!(seen.insert(e.id.clone()), "{} shown twice", e.id);
                }
            }
            assert_eq!(seen.len(), store.len(), "every entry is in one thread");

            let targets = store.all().iter().map(|e| e.id.clone()).collect::<Vec<EntryId>>();
            for id in targets {
                let target = session.store().by_id(&id).cloned().expect("listed entry");
                let draft = session.start_reply(&id).expect("replying to listed entry");
                assert_eq!(draft.title, format!("Re: {}", target.title));
                assert_eq!(draft.tags, join_tags(&target.tags));
                assert!(draft.text.is_empty());
            }
        })
}
