//! Filtering and cascade behavior across the engine and the store

use std::sync::Arc;

use lexibase_core::{
    Entry, EntryValue, Language, MatchDescriptor, MatchEngine, Property, PropertyKind,
    PropertyLevel, RecordRepository, SchemaRepository, SearchCriterion, Term, Termbase,
    ValueId, ValueRepository,
};
use lexibase_store_inmemory::InMemoryRecordStore;

struct World {
    store: Arc<InMemoryRecordStore>,
    engine: MatchEngine,
    termbase: lexibase_core::TermbaseId,
    italian: lexibase_core::LanguageId,
    domain: lexibase_core::PropertyId,
}

/// Termbase with an Italian-only entry ("cuore"), a bilingual entry
/// ("liver"/"fegato"), and an English-only entry ("test") carrying an
/// entry-level domain value.
async fn world() -> anyhow::Result<World> {
    let store = Arc::new(InMemoryRecordStore::new());
    let termbase = store
        .create_termbase(&Termbase::new("anatomy", ""))
        .await?;
    store
        .create_language(&Language::new(termbase, "en"))
        .await?;
    let italian = store
        .create_language(&Language::new(termbase, "it"))
        .await?;
    let domain = store
        .create_property(&Property::new(
            termbase,
            "domain",
            PropertyLevel::Entry,
            PropertyKind::Text,
        ))
        .await?;

    let italian_only = store.create_entry(&Entry::new(termbase)).await?;
    store
        .create_term(&Term::new(italian_only, "it", "cuore"))
        .await?;

    let bilingual = store.create_entry(&Entry::new(termbase)).await?;
    store
        .create_term(&Term::new(bilingual, "en", "liver"))
        .await?;
    store
        .create_term(&Term::new(bilingual, "it", "fegato"))
        .await?;

    let english_only = store.create_entry(&Entry::new(termbase)).await?;
    store
        .create_term(&Term::new(english_only, "en", "test"))
        .await?;
    store
        .create_entry_value(&EntryValue {
            id: ValueId::UNSAVED,
            entry_id: english_only,
            property_id: domain,
            value: "medicine".to_string(),
        })
        .await?;

    let engine = MatchEngine::new(store.clone());
    Ok(World {
        store,
        engine,
        termbase,
        italian,
        domain,
    })
}

#[tokio::test]
async fn test_filters_combine_lemma_and_property_paths() -> anyhow::Result<()> {
    let w = world().await?;

    let criteria = vec![
        SearchCriterion::Fuzzy {
            text: "te".to_string(),
            targets: vec![MatchDescriptor::Lemma {
                lang: "en".to_string(),
            }],
        },
        SearchCriterion::Exact {
            text: "medicine".to_string(),
            targets: vec![MatchDescriptor::Property {
                property_id: w.domain,
                lang: None,
            }],
        },
    ];
    let hits = w.engine.search(w.termbase, "en", &criteria).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].lemma, "test");

    Ok(())
}

#[tokio::test]
async fn test_language_deletion_is_visible_to_the_filter() -> anyhow::Result<()> {
    let w = world().await?;
    assert_eq!(w.engine.entries_with_language(w.termbase, "it").await?, 2);

    w.store.delete_language(w.italian).await?;

    // The Italian-only entry went with its language; the bilingual one
    // survives through its English term.
    let hits = w.engine.search(w.termbase, "it", &[]).await?;
    assert!(hits.is_empty());
    let hits = w.engine.search(w.termbase, "en", &[]).await?;
    let lemmas: Vec<&str> = hits.iter().map(|t| t.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["liver", "test"]);

    assert_eq!(w.engine.entry_count(w.termbase).await?, 2);
    assert_eq!(w.engine.entries_with_language(w.termbase, "it").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_counts_over_the_seeded_world() -> anyhow::Result<()> {
    let w = world().await?;

    assert_eq!(w.engine.entry_count(w.termbase).await?, 3);
    assert_eq!(w.engine.term_count(w.termbase).await?, 4);
    let by_language = w.engine.term_count_by_language(w.termbase).await?;
    assert_eq!(by_language.get("en"), Some(&2));
    assert_eq!(by_language.get("it"), Some(&2));
    Ok(())
}
