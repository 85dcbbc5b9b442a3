use evalstore_core::{AgentConfig, Run, RunStore, StoreError};

fn labelled(label: &str) -> Run {
    Run::new(AgentConfig::unknown()).with_label(label)
}

#[test]
fn duplicate_label_is_ambiguous() {
    let mut store = RunStore::new("/repo");
    let a = labelled("v1");
    let b = labelled("v1");
    let (id_a, id_b) = (a.id.clone(), b.id.clone());
    store.add_run(a);
    store.add_run(b);

    assert_eq!(store.find_by_label("v1").len(), 2);
    match store.resolve_id("v1") {
        Err(StoreError::Ambiguous {
            reference,
            candidates,
        }) => {
            assert_eq!(reference, "v1");
            assert_eq!(candidates.len(), 2);
            assert!(candidates.contains(&id_a));
            assert!(candidates.contains(&id_b));
        }
        other => panic!("expected Ambiguous, got {other:?}"),
    }
}

#[test]
fn full_id_wins_over_label() {
    let mut store = RunStore::new("/repo");
    let target = labelled("release");
    let target_id = target.id.clone();
    // A second run labelled with the first run's id.
    let decoy = labelled(&target_id);
    store.add_run(target);
    store.add_run(decoy);

    assert_eq!(store.resolve_id(&target_id).unwrap(), target_id);
}

#[test]
fn resolve_returns_the_run() {
    let mut store = RunStore::new("/repo");
    let run = labelled("nightly");
    let id = run.id.clone();
    store.add_run(run);

    assert_eq!(store.resolve("nightly").unwrap().id, id);
    assert_eq!(store.resolve(&id[..id.len() - 2]).unwrap().id, id);
    assert!(matches!(
        store.resolve("weekly"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn model_placeholder_resolves_once_in_stored_run() {
    let mut store = RunStore::new("/repo");
    let run = labelled("v2");
    let id = run.id.clone();
    store.add_run(run);

    let mut updated = store.get(&id).cloned().expect("run");
    assert!(updated.resolve_model("claude-opus-4"));
    store.add_run(updated);

    assert_eq!(store.get(&id).unwrap().agent.model, "claude-opus-4");
    assert_eq!(store.count(), 1);
}
