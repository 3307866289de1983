mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use common::new_shader;
use shaderhub::error::Error;
use shaderhub::store::{MemoryStore, SnapshotDoc, Store};
use shaderhub::types::{ShaderQuery, ShaderUpdate};

fn store_with_user(name: &str) -> (MemoryStore, u64) {
    let store = MemoryStore::in_memory();
    let user = store.create_user(name, "hash").unwrap();
    (store, user.id)
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let (store, owner) = store_with_user("ada");
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        store
                            .create_shader(new_shader(owner, &format!("t{t}-{i}"), &["fragment"]))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(ids.len(), 200);

    let page = store.search(&ShaderQuery::with_tags(["fragment"])).unwrap();
    assert_eq!(page.total, 200);
    assert_eq!(store.list_tags().unwrap()[0].shader_count, 200);
}

#[test]
fn test_tag_index_follows_updates_and_deletes() {
    let (store, owner) = store_with_user("ada");
    let red = store.create_shader(new_shader(owner, "Red", &["Fragment"])).unwrap();
    let redux = store
        .create_shader(new_shader(owner, "Redux", &["fragment", "animation"]))
        .unwrap();

    let fragment = store.search(&ShaderQuery::with_tags(["fragment"])).unwrap();
    assert_eq!(fragment.ids(), vec![redux.id, red.id]);
    let animation = store.search(&ShaderQuery::with_tags(["ANIMATION"])).unwrap();
    assert_eq!(animation.ids(), vec![redux.id]);

    let tags = store.list_tags().unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.iter().any(|t| t.name == "Fragment" && t.shader_count == 2));

    store
        .update_shader(
            red.id,
            owner,
            ShaderUpdate {
                tags: Some(vec!["animation".into()]),
                ..ShaderUpdate::default()
            },
        )
        .unwrap();
    let fragment = store.search(&ShaderQuery::with_tags(["fragment"])).unwrap();
    assert_eq!(fragment.ids(), vec![redux.id]);

    store.delete_shader(redux.id, owner).unwrap();
    let animation = store.search(&ShaderQuery::with_tags(["animation"])).unwrap();
    assert_eq!(animation.ids(), vec![red.id]);

    // Tags stay in the vocabulary once their last shader goes away.
    let tags = store.list_tags().unwrap();
    let fragment = tags.iter().find(|t| t.name == "Fragment").unwrap();
    assert_eq!(fragment.shader_count, 0);
}

#[test]
fn test_owner_filter_matches_user_listing() {
    let store = MemoryStore::in_memory();
    let ada = store.create_user("ada", "hash").unwrap();
    let grace = store.create_user("grace", "hash").unwrap();
    for i in 0..3 {
        store.create_shader(new_shader(ada.id, &format!("a{i}"), &[])).unwrap();
        store.create_shader(new_shader(grace.id, &format!("g{i}"), &[])).unwrap();
    }

    let listed: Vec<u64> = store
        .list_user_shaders(ada.id)
        .unwrap()
        .iter()
        .map(|l| l.shader.id)
        .collect();
    let searched = store
        .search(&ShaderQuery {
            owner_id: Some(ada.id),
            ..ShaderQuery::default()
        })
        .unwrap();
    assert_eq!(searched.ids(), listed);

    let by_name = store
        .search(&ShaderQuery {
            username: Some("Ada".into()),
            ..ShaderQuery::default()
        })
        .unwrap();
    assert_eq!(by_name.ids(), listed);
    assert!(by_name.items.iter().all(|l| l.author == "ada"));
}

#[test]
fn test_pagination_window() {
    let (store, owner) = store_with_user("ada");
    for i in 0..25 {
        store.create_shader(new_shader(owner, &format!("s{i}"), &[])).unwrap();
    }

    let page = store.search(&ShaderQuery::default().paged(10, 20)).unwrap();
    assert_eq!(page.ids(), vec![5, 4, 3, 2, 1]);
    assert_eq!(page.total, 25);

    let page = store.search(&ShaderQuery::default().paged(10, 30)).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 25);
}

#[test]
fn test_ownership_checks() {
    let store = MemoryStore::in_memory();
    let ada = store.create_user("ada", "hash").unwrap();
    let grace = store.create_user("grace", "hash").unwrap();
    let shader = store.create_shader(new_shader(ada.id, "Mine", &[])).unwrap();

    let err = store.delete_shader(shader.id, grace.id).unwrap_err();
    assert!(matches!(err, Error::Forbidden));
    let err = store.delete_shader(999, ada.id).unwrap_err();
    assert!(matches!(err, Error::NotFound));
    assert!(store.get_shader(shader.id).is_ok());
}

#[test]
fn test_snapshot_restore_round_trip() {
    let (store, owner) = store_with_user("ada");
    store.create_shader(new_shader(owner, "One", &["lighting"])).unwrap();
    store.create_shader(new_shader(owner, "Two", &["noise"])).unwrap();
    let doc = store.snapshot();

    let restored = MemoryStore::in_memory();
    restored.restore(doc.clone()).unwrap();
    let copy = restored.snapshot();
    assert_eq!(copy.users, doc.users);
    assert_eq!(copy.shaders, doc.shaders);
    assert_eq!(copy.tags, doc.tags);

    // Counters resume past the restored ids.
    let next = restored
        .create_shader(new_shader(owner, "Three", &["lighting"]))
        .unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(next.tags[0].id, 1);
    let page = restored.search(&ShaderQuery::with_tags(["lighting"])).unwrap();
    assert_eq!(page.total, 2);
}

#[test]
fn test_concurrent_writes_leave_latest_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("shaderhub.json");
    let store = Arc::new(MemoryStore::open(&path).unwrap());
    let owner = store.create_user("ada", "hash").unwrap().id;

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .create_shader(new_shader(owner, &format!("t{t}-{i}"), &[]))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    store.flush().unwrap();

    let on_disk: SnapshotDoc =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let in_memory = store.snapshot();
    assert_eq!(on_disk.shaders.len(), 40);
    assert_eq!(on_disk.shaders, in_memory.shaders);

    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.snapshot().shaders, in_memory.shaders);
    assert_eq!(reopened.get_user_by_username("ADA").unwrap().id, owner);
}
