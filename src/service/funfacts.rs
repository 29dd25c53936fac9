//! Merge layer: reconciles catalog records with stored fun facts and applies fact mutations.

use crate::catalog::{normalize_code, Catalog, StateRecord};
use crate::error::AppError;
use crate::store::{FactSheet, FactStore};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What `add_facts` does when an incoming fact already exists verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Allow,
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("expected allow or reject, got '{}'", other)),
        }
    }
}

/// A catalog record with its current fun facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergedStateView {
    #[serde(flatten)]
    pub record: StateRecord,
    pub funfacts: Vec<String>,
}

struct Inner {
    catalog: Arc<Catalog>,
    store: Arc<dyn FactStore>,
    policy: DuplicatePolicy,
    // One lock per catalog code; mutations hold it across read-modify-write.
    locks: HashMap<String, Mutex<()>>,
}

#[derive(Clone)]
pub struct FactService {
    inner: Arc<Inner>,
}

impl FactService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn FactStore>, policy: DuplicatePolicy) -> Self {
        let locks = catalog
            .codes()
            .map(|code| (code.to_string(), Mutex::new(())))
            .collect();
        FactService {
            inner: Arc::new(Inner {
                catalog,
                store,
                policy,
                locks,
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn store(&self) -> &dyn FactStore {
        self.inner.store.as_ref()
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.inner.policy
    }

    /// Catalog record for `code`, or `UnknownState`.
    pub fn resolve(&self, code: &str) -> Result<&StateRecord, AppError> {
        self.inner
            .catalog
            .lookup(code)
            .ok_or_else(|| AppError::UnknownState(normalize_code(code)))
    }

    /// Current facts for a state; empty when none have been stored.
    pub async fn get_facts(&self, code: &str) -> Result<Vec<String>, AppError> {
        let record = self.resolve(code)?;
        Ok(self
            .inner
            .store
            .get(&record.state_code)
            .await?
            .map(|s| s.facts)
            .unwrap_or_default())
    }

    /// One fact chosen uniformly at random; `None` when the state has no facts.
    pub async fn get_random_fact(&self, code: &str) -> Result<Option<String>, AppError> {
        let facts = self.get_facts(code).await?;
        Ok(facts.choose(&mut rand::thread_rng()).cloned())
    }

    pub async fn state_view(&self, code: &str) -> Result<MergedStateView, AppError> {
        let record = self.resolve(code)?.clone();
        let funfacts = self.get_facts(&record.state_code).await?;
        Ok(MergedStateView { record, funfacts })
    }

    /// Catalog listing with facts merged from a single store scan.
    pub async fn list_views(&self, contiguous: Option<bool>) -> Result<Vec<MergedStateView>, AppError> {
        let mut facts_by_code: HashMap<String, Vec<String>> = self
            .inner
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|s| (s.state_code, s.facts))
            .collect();
        Ok(self
            .inner
            .catalog
            .list(contiguous)
            .into_iter()
            .map(|record| MergedStateView {
                funfacts: facts_by_code.remove(&record.state_code).unwrap_or_default(),
                record: record.clone(),
            })
            .collect())
    }

    /// Append facts, creating the sheet on first insert. Returns the full updated sheet.
    pub async fn add_facts(&self, code: &str, new_facts: Vec<String>) -> Result<FactSheet, AppError> {
        if new_facts.is_empty() {
            return Err(AppError::InvalidInput("funfacts must not be empty".into()));
        }
        let record = self.resolve(code)?;
        let _guard = self.lock(&record.state_code)?.lock().await;

        let mut sheet = self
            .inner
            .store
            .get(&record.state_code)
            .await?
            .unwrap_or_else(|| FactSheet::new(record.state_code.clone(), Vec::new()));

        if self.inner.policy == DuplicatePolicy::Reject {
            if let Some(dup) = new_facts.iter().find(|f| sheet.facts.contains(f)) {
                return Err(AppError::Conflict(format!(
                    "fun fact already exists for {}: '{}'",
                    record.name, dup
                )));
            }
        }

        let added = new_facts.len();
        sheet.facts.extend(new_facts);
        self.inner.store.put(&sheet).await?;
        tracing::info!(state_code = %record.state_code, added, total = sheet.facts.len(), "fun facts added");
        Ok(sheet)
    }

    /// Replace the fact at 1-based `index`.
    pub async fn update_fact(&self, code: &str, index: i64, value: String) -> Result<FactSheet, AppError> {
        let record = self.resolve(code)?;
        let _guard = self.lock(&record.state_code)?.lock().await;

        let mut sheet = self.existing_sheet(record).await?;
        let slot = slot_for(record, &sheet, index)?;
        sheet.facts[slot] = value;
        self.inner.store.put(&sheet).await?;
        tracing::info!(state_code = %record.state_code, index, "fun fact updated");
        Ok(sheet)
    }

    /// Remove the fact at 1-based `index`; later facts shift down by one.
    pub async fn delete_fact(&self, code: &str, index: i64) -> Result<FactSheet, AppError> {
        let record = self.resolve(code)?;
        let _guard = self.lock(&record.state_code)?.lock().await;

        let mut sheet = self.existing_sheet(record).await?;
        let slot = slot_for(record, &sheet, index)?;
        sheet.facts.remove(slot);
        self.inner.store.put(&sheet).await?;
        tracing::info!(state_code = %record.state_code, index, remaining = sheet.facts.len(), "fun fact deleted");
        Ok(sheet)
    }

    fn lock(&self, state_code: &str) -> Result<&Mutex<()>, AppError> {
        self.inner
            .locks
            .get(state_code)
            .ok_or_else(|| AppError::UnknownState(state_code.to_string()))
    }

    /// Stored sheet with at least one fact, or `NoFunFacts`.
    async fn existing_sheet(&self, record: &StateRecord) -> Result<FactSheet, AppError> {
        match self.inner.store.get(&record.state_code).await? {
            Some(sheet) if !sheet.facts.is_empty() => Ok(sheet),
            _ => Err(AppError::NoFunFacts(record.name.clone())),
        }
    }
}

/// 0-based position for a 1-based index, or `NotFound` outside `[1, len]`.
fn slot_for(record: &StateRecord, sheet: &FactSheet, index: i64) -> Result<usize, AppError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i >= 1 && i <= sheet.facts.len())
        .map(|i| i - 1)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no fun fact at index {} for {} ({} stored)",
                index,
                record.name,
                sheet.facts.len()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryFactStore;
    use async_trait::async_trait;

    fn service_with(policy: DuplicatePolicy) -> FactService {
        let catalog = Arc::new(Catalog::bundled().expect("bundled snapshot"));
        FactService::new(catalog, Arc::new(MemoryFactStore::new()), policy)
    }

    fn service() -> FactService {
        service_with(DuplicatePolicy::Allow)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn texas_end_to_end() {
        let svc = service();
        svc.add_facts("TX", strings(&["fact1"])).await.unwrap();
        assert_eq!(svc.get_facts("TX").await.unwrap(), strings(&["fact1"]));

        svc.update_fact("TX", 1, "fact1-edited".into()).await.unwrap();
        assert_eq!(svc.get_facts("TX").await.unwrap(), strings(&["fact1-edited"]));

        svc.delete_fact("TX", 1).await.unwrap();
        assert!(svc.get_facts("TX").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_facts_is_associative() {
        let split = service();
        split.add_facts("ca", strings(&["a"])).await.unwrap();
        split.add_facts("CA", strings(&["b"])).await.unwrap();

        let joined = service();
        joined.add_facts("CA", strings(&["a", "b"])).await.unwrap();

        assert_eq!(
            split.get_facts("CA").await.unwrap(),
            joined.get_facts("CA").await.unwrap()
        );
    }

    #[tokio::test]
    async fn add_facts_returns_full_sheet_under_normalized_code() {
        let svc = service();
        svc.add_facts("oh", strings(&["x"])).await.unwrap();
        let sheet = svc.add_facts("Oh", strings(&["y", "x"])).await.unwrap();
        assert_eq!(sheet.state_code, "OH");
        assert_eq!(sheet.facts, strings(&["x", "y", "x"]));
    }

    #[tokio::test]
    async fn reject_policy_refuses_existing_facts() {
        let svc = service_with(DuplicatePolicy::Reject);
        svc.add_facts("NY", strings(&["big apple"])).await.unwrap();
        let err = svc
            .add_facts("NY", strings(&["new", "big apple"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(svc.get_facts("NY").await.unwrap(), strings(&["big apple"]));
    }

    #[tokio::test]
    async fn empty_add_is_invalid() {
        let svc = service();
        assert!(matches!(
            svc.add_facts("TX", Vec::new()).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn update_preserves_length_and_neighbours() {
        let svc = service();
        svc.add_facts("FL", strings(&["a", "b", "c"])).await.unwrap();
        let sheet = svc.update_fact("FL", 2, "B".into()).await.unwrap();
        assert_eq!(sheet.facts, strings(&["a", "B", "c"]));
    }

    #[tokio::test]
    async fn delete_shrinks_by_one_preserving_order() {
        let svc = service();
        svc.add_facts("WA", strings(&["a", "b", "c", "d"])).await.unwrap();
        let sheet = svc.delete_fact("WA", 2).await.unwrap();
        assert_eq!(sheet.facts, strings(&["a", "c", "d"]));
    }

    #[tokio::test]
    async fn out_of_range_indexes_fail_without_mutation() {
        let svc = service();
        svc.add_facts("CO", strings(&["a", "b"])).await.unwrap();
        for index in [0, 3, -1] {
            assert!(matches!(
                svc.update_fact("CO", index, "z".into()).await,
                Err(AppError::NotFound(_))
            ));
            assert!(matches!(svc.delete_fact("CO", index).await, Err(AppError::NotFound(_))));
        }
        assert_eq!(svc.get_facts("CO").await.unwrap(), strings(&["a", "b"]));
    }

    #[tokio::test]
    async fn mutations_on_absent_or_empty_sheets_are_rejected() {
        let svc = service();
        assert!(matches!(svc.delete_fact("ME", 1).await, Err(AppError::NoFunFacts(_))));
        assert!(matches!(
            svc.update_fact("ME", 1, "x".into()).await,
            Err(AppError::NoFunFacts(_))
        ));

        svc.add_facts("ME", strings(&["lobster"])).await.unwrap();
        svc.delete_fact("ME", 1).await.unwrap();
        assert!(matches!(svc.delete_fact("ME", 1).await, Err(AppError::NoFunFacts(_))));
    }

    #[tokio::test]
    async fn random_fact_distinguishes_empty_from_unknown() {
        let svc = service();
        assert_eq!(svc.get_random_fact("NV").await.unwrap(), None);
        assert!(matches!(
            svc.get_random_fact("ZZ").await,
            Err(AppError::UnknownState(code)) if code == "ZZ"
        ));

        svc.add_facts("NV", strings(&["only"])).await.unwrap();
        for _ in 0..10 {
            assert_eq!(svc.get_random_fact("nv").await.unwrap().as_deref(), Some("only"));
        }
    }

    #[tokio::test]
    async fn random_fact_comes_from_the_list() {
        let svc = service();
        let facts = strings(&["a", "b", "c"]);
        svc.add_facts("UT", facts.clone()).await.unwrap();
        for _ in 0..20 {
            let pick = svc.get_random_fact("UT").await.unwrap().unwrap();
            assert!(facts.contains(&pick));
        }
    }

    #[tokio::test]
    async fn unknown_states_never_reach_the_store() {
        let svc = service();
        assert!(matches!(
            svc.add_facts("XX", strings(&["a"])).await,
            Err(AppError::UnknownState(_))
        ));
        assert!(svc.store().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_views_merges_facts_and_applies_filter() {
        let svc = service();
        svc.add_facts("HI", strings(&["volcanoes"])).await.unwrap();
        svc.add_facts("TX", strings(&["big"])).await.unwrap();

        let detached = svc.list_views(Some(false)).await.unwrap();
        assert_eq!(detached.len(), 2);
        let hi = detached.iter().find(|v| v.record.state_code == "HI").unwrap();
        assert_eq!(hi.funfacts, strings(&["volcanoes"]));
        let ak = detached.iter().find(|v| v.record.state_code == "AK").unwrap();
        assert!(ak.funfacts.is_empty());

        let contiguous = svc.list_views(Some(true)).await.unwrap();
        assert_eq!(contiguous.len(), 48);
        assert!(contiguous.iter().any(|v| v.record.state_code == "TX" && v.funfacts == strings(&["big"])));
    }

    /// Memory store that yields between reading a sheet and handing it back,
    /// so unserialized read-modify-write sequences interleave.
    #[derive(Default)]
    struct YieldingStore {
        inner: MemoryFactStore,
    }

    #[async_trait]
    impl FactStore for YieldingStore {
        async fn get(&self, state_code: &str) -> Result<Option<FactSheet>, StoreError> {
            let sheet = self.inner.get(state_code).await?;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            Ok(sheet)
        }
        async fn put(&self, sheet: &FactSheet) -> Result<(), StoreError> {
            tokio::task::yield_now().await;
            self.inner.put(sheet).await
        }
        async fn list_all(&self) -> Result<Vec<FactSheet>, StoreError> {
            self.inner.list_all().await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_do_not_lose_updates() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let svc = FactService::new(catalog, Arc::new(YieldingStore::default()), DuplicatePolicy::Allow);
        let mut tasks = Vec::new();
        for i in 0..32 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                svc.add_facts("VT", vec![format!("fact {}", i)]).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        let facts = svc.get_facts("VT").await.unwrap();
        assert_eq!(facts.len(), 32);
        for i in 0..32 {
            assert!(facts.contains(&format!("fact {}", i)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_remove_distinct_facts() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let svc = FactService::new(catalog, Arc::new(YieldingStore::default()), DuplicatePolicy::Allow);
        let facts: Vec<String> = (0..10).map(|i| format!("fact {}", i)).collect();
        svc.add_facts("NH", facts).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..6 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                svc.delete_fact("NH", 1).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(
            svc.get_facts("NH").await.unwrap(),
            strings(&["fact 6", "fact 7", "fact 8", "fact 9"])
        );
    }

    struct FailingStore;

    #[async_trait]
    impl FactStore for FailingStore {
        async fn get(&self, _: &str) -> Result<Option<FactSheet>, StoreError> {
            Err(StoreError::Decode("boom".into()))
        }
        async fn put(&self, _: &FactSheet) -> Result<(), StoreError> {
            Err(StoreError::Decode("boom".into()))
        }
        async fn list_all(&self) -> Result<Vec<FactSheet>, StoreError> {
            Err(StoreError::Decode("boom".into()))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_errors() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let svc = FactService::new(catalog, Arc::new(FailingStore), DuplicatePolicy::Allow);
        assert!(matches!(svc.get_facts("TX").await, Err(AppError::Store(_))));
        assert!(matches!(
            svc.add_facts("TX", strings(&["a"])).await,
            Err(AppError::Store(_))
        ));
    }

    #[test]
    fn duplicate_policy_parses() {
        assert_eq!("Reject".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Reject));
        assert_eq!("allow".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Allow));
        assert!("maybe".parse::<DuplicatePolicy>().is_err());
    }
}
