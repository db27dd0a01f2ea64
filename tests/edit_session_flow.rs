//! End-to-end edit session scenarios against the real in-memory store

use std::sync::Arc;

use pretty_assertions::assert_eq;

use lexibase_core::{
    ChangeNotifier, CoreError, EditSession, Entry, Language, LineItem, MediaStore, Property,
    PropertyKind, PropertyLevel, RecordRepository, RecordStore, SchemaRepository, Term, TermValue,
    ValueId, ValueRepository,
};
use lexibase_store_inmemory::InMemoryRecordStore;
use lexibase_tests::FailingStore;

struct World {
    store: Arc<dyn RecordStore>,
    session: EditSession,
    termbase: lexibase_core::TermbaseId,
    entry: lexibase_core::EntryId,
    _workspace: tempfile::TempDir,
}

async fn world_with(store: Arc<dyn RecordStore>) -> anyhow::Result<World> {
    let termbase = store
        .create_termbase(&lexibase_core::Termbase::new("field guide", "bird watching"))
        .await?;
    store
        .create_language(&Language::new(termbase, "en"))
        .await?;
    store
        .create_language(&Language::new(termbase, "it"))
        .await?;
    let entry = store.create_entry(&Entry::new(termbase)).await?;

    let workspace = tempfile::tempdir()?;
    let session = EditSession::new(
        store.clone(),
        MediaStore::new(workspace.path().join("media")),
        ChangeNotifier::default(),
        termbase,
        "en",
    );
    Ok(World {
        store,
        session,
        termbase,
        entry,
        _workspace: workspace,
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn add_term_index(items: &[LineItem], lang: &str) -> usize {
    items
        .iter()
        .position(|i| matches!(i, LineItem::AddTerm { lang: l } if l == lang))
        .expect("add-term marker not found")
}

#[tokio::test]
async fn test_full_editing_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let world = world_with(Arc::new(InMemoryRecordStore::new())).await?;
    let note = world
        .store
        .create_property(&Property::new(
            world.termbase,
            "habitat",
            PropertyLevel::Term,
            PropertyKind::Text,
        ))
        .await?;

    world.session.open(world.entry).await?;
    world.session.begin_editing().await?;

    let items = world.session.items().await;
    let at = add_term_index(&items, "en");
    world.session.add_term_at(at).await?;
    world.session.set_lemma(at, "heron").await?;
    world.session.add_property_at(at + 1, note).await?;
    world.session.set_value(at + 1, "wetlands").await?;
    world.session.commit().await?;

    let terms = world.store.terms_of_entry(world.entry).await?;
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].lemma, "heron");
    let values = world.store.term_values_of(terms[0].id).await?;
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, "wetlands");

    // Patched-in ids, no reload in between.
    let items = world.session.items().await;
    match &items[at] {
        LineItem::Lemma(row) => assert_eq!(row.term_id, terms[0].id),
        other => panic!("expected term row, got {:?}", other),
    }
    match &items[at + 1] {
        LineItem::Property(row) => assert!(row.value_id.is_persisted()),
        other => panic!("expected property row, got {:?}", other),
    }

    // A second save with nothing changed moves nothing.
    let entry_before = world.store.find_entry(world.entry).await?.unwrap();
    world.session.commit().await?;
    assert_eq!(
        world.store.find_entry(world.entry).await?.unwrap(),
        entry_before
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_delete_keeps_queue_for_retry() -> anyhow::Result<()> {
    let inner = Arc::new(InMemoryRecordStore::new());
    let failing = Arc::new(FailingStore::new(inner));
    let world = world_with(failing.clone()).await?;
    let note = world
        .store
        .create_property(&Property::new(
            world.termbase,
            "habitat",
            PropertyLevel::Term,
            PropertyKind::Text,
        ))
        .await?;
    let doomed = world
        .store
        .create_term(&Term::new(world.entry, "en", "heron"))
        .await?;
    world
        .store
        .create_term_value(&TermValue {
            id: ValueId::UNSAVED,
            term_id: doomed,
            property_id: note,
            value: "wetlands".to_string(),
        })
        .await?;

    world.session.open(world.entry).await?;
    world.session.begin_editing().await?;

    let items = world.session.items().await;
    let at = items
        .iter()
        .position(|i| matches!(i, LineItem::Lemma(row) if row.text == "heron"))
        .unwrap();
    world.session.remove_term_row(at).await?;

    failing.fail_deletes(true);
    let result = world.session.commit().await;
    assert!(matches!(result, Err(CoreError::StoreError(_))));
    assert!(world.store.find_term(doomed).await?.is_some());

    // The queue survived the failure; the next save finishes the job.
    failing.fail_deletes(false);
    world.session.commit().await?;
    assert!(world.store.find_term(doomed).await?.is_none());
    assert!(world.store.term_values_of(doomed).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_switching_entries_discards_pending_edits() -> anyhow::Result<()> {
    let world = world_with(Arc::new(InMemoryRecordStore::new())).await?;
    let second = world
        .store
        .create_entry(&Entry::new(world.termbase))
        .await?;

    world.session.open(world.entry).await?;
    world.session.begin_editing().await?;
    let items = world.session.items().await;
    let at = add_term_index(&items, "en");
    world.session.add_term_at(at).await?;
    world.session.set_lemma(at, "orphaned edit").await?;

    world.session.open(second).await?;
    world.session.commit().await?;

    assert!(world.store.terms_of_entry(world.entry).await?.is_empty());
    assert!(world.store.terms_of_entry(second).await?.is_empty());
    Ok(())
}
