use notes_client::{api::Entry, EntryStore, TagIndex};

pub fn entry_line(e: &Entry) -> String {
    let mut res = format!("[{}] {}: {}", e.id, e.title, e.text);
    if !e.tags.is_empty() {
        res.push_str(&format!(" (Tags: {})", e.tags.join(", ")));
    }
    res
}

pub fn entries<'a>(store: &EntryStore, list: impl IntoIterator<Item = &'a Entry>) -> String {
    let mut res = String::new();
    for e in list {
        res.push_str(&entry_line(e));
        if let Some(parent) = store.parent_of(&e.id) {
            res.push_str(&format!(" <- reply to [{}] {}", parent.id, parent.title));
        }
        res.push('\n');
    }
    res
}

pub fn tags(index: &TagIndex) -> String {
    index
        .tags()
        .into_iter()
        .map(|(tag, count)| format!("{tag} ({count})\n"))
        .collect()
}

/// Each root with its replies below it, indented by depth
pub fn threads(store: &EntryStore, roots: &[&Entry]) -> String {
    let mut res = String::new();
    for root in roots {
        for (depth, e) in store.thread(&root.id) {
            for _ in 0..depth {
                res.push_str("  ");
            }
            res.push_str(&entry_line(&e));
            res.push('\n');
        }
    }
    res
}
