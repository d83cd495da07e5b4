//! A/B 실험 레지스트리.

use academy_core::models::event::EventKind;
use academy_core::models::experiment::{assignment_key, AbTest, Variant};
use academy_core::ports::analytics::EventSink;
use academy_core::ports::random::RandomSource;
use academy_core::ports::storage::{KeyValueStore, SESSION_ID_KEY};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

use crate::store::AssignmentStore;

/// 세션 ID를 읽지 못했을 때의 표기
const UNKNOWN_SESSION: &str = "unknown";

/// 누적 가중치가 `draw` 이상이 되는 첫 변형
pub fn pick_variant(variants: &[Variant], draw: f64) -> Option<&Variant> {
    let mut cumulative = 0.0;
    variants.iter().find(|variant| {
        cumulative += variant.weight;
        draw <= cumulative
    })
}

/// 히어로 CTA 문구 실험 (기본 등록 실험)
pub fn hero_cta_test(now: DateTime<Utc>) -> AbTest {
    AbTest {
        id: "hero_cta_test".to_string(),
        name: "Hero CTA Button Test".to_string(),
        variants: vec![
            Variant::new("control", "Start Learning Today", 50.0),
            Variant::new("variant_a", "Begin Your AI Journey", 50.0),
        ],
        is_active: true,
        start_date: now,
        end_date: Some(now + Duration::days(30)),
    }
}

/// 실험 정의와 고정 배정을 관리하는 레지스트리
pub struct AbTestRegistry {
    tests: RwLock<Vec<AbTest>>,
    assignments: Mutex<AssignmentStore>,
    random: Arc<dyn RandomSource>,
    sink: Arc<dyn EventSink>,
    store: Arc<dyn KeyValueStore>,
}

impl AbTestRegistry {
    /// `store`는 세션 ID 조회용
    pub fn new(
        assignments: AssignmentStore,
        random: Arc<dyn RandomSource>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            tests: RwLock::new(Vec::new()),
            assignments: Mutex::new(assignments),
            random,
            sink,
            store,
        }
    }

    /// 실험 등록 (같은 ID면 교체)
    pub fn register_test(&self, test: AbTest) {
        let mut tests = self.tests.write();
        debug!("A/B 실험 등록: {} ({}개 변형)", test.id, test.variants.len());
        match tests.iter_mut().find(|t| t.id == test.id) {
            Some(existing) => *existing = test,
            None => tests.push(test),
        }
    }

    pub fn test(&self, test_id: &str) -> Option<AbTest> {
        self.tests.read().iter().find(|t| t.id == test_id).cloned()
    }

    /// 활성 실험 목록 (등록 순서)
    pub fn active_tests(&self) -> Vec<AbTest> {
        self.tests
            .read()
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect()
    }

    /// 변형 조회: 미등록/비활성 실험이면 None
    ///
    /// 이미 배정된 키는 그대로 반환하고, 처음이면 가중치 랜덤으로 배정 후
    /// `ab_test_assignment` 이벤트를 기록한다.
    pub fn get_variant(&self, test_id: &str, user_id: Option<&str>) -> Option<String> {
        let test = self.test(test_id).filter(|t| t.is_active)?;
        let key = assignment_key(test_id, user_id);

        let (variant_id, newly_drawn) = {
            let mut assignments = self.assignments.lock();
            if let Some(existing) = assignments.get(&key) {
                return Some(existing.to_string());
            }

            let draw = self.random.next_f64() * test.total_weight();
            let (variant_id, newly_drawn) = match pick_variant(&test.variants, draw) {
                Some(variant) => (variant.id.clone(), true),
                None => (test.variants.first()?.id.clone(), false),
            };
            assignments.insert(key, variant_id.clone());
            (variant_id, newly_drawn)
        };

        if newly_drawn {
            self.track_assignment(test_id, &variant_id, user_id);
        } else {
            debug!("A/B 가중치 선택 실패, 첫 변형으로 대체: {test_id} → {variant_id}");
        }
        Some(variant_id)
    }

    pub fn is_in_variant(&self, test_id: &str, variant_id: &str, user_id: Option<&str>) -> bool {
        self.get_variant(test_id, user_id).as_deref() == Some(variant_id)
    }

    /// 전환 기록: 실제 배정 여부는 확인하지 않는다
    pub fn track_conversion(
        &self,
        test_id: &str,
        variant_id: &str,
        conversion_type: &str,
        value: Option<f64>,
    ) {
        info!("A/B 전환: {test_id}/{variant_id} {conversion_type}");
        self.sink.track(
            EventKind::AbTestConversion {
                test_id: test_id.to_string(),
                variant_id: variant_id.to_string(),
                session_id: self.session_id(),
                conversion_type: conversion_type.to_string(),
                value,
            }
            .into(),
        );
    }

    /// 한 사용자의 실험 뷰 (배정이 없으면 전환 추적은 no-op)
    pub fn view(&self, test_id: &str, user_id: Option<&str>) -> ExperimentView<'_> {
        ExperimentView {
            registry: self,
            test_id: test_id.to_string(),
            variant: self.get_variant(test_id, user_id),
        }
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.lock().len()
    }

    fn track_assignment(&self, test_id: &str, variant_id: &str, user_id: Option<&str>) {
        info!("A/B 배정: {test_id} → {variant_id}");
        self.sink.track(
            EventKind::AbTestAssignment {
                test_id: test_id.to_string(),
                variant_id: variant_id.to_string(),
                user_id: user_id.map(str::to_string),
                session_id: self.session_id(),
            }
            .into(),
        );
    }

    fn session_id(&self) -> String {
        match self.store.get(SESSION_ID_KEY) {
            Ok(Some(id)) => id,
            _ => UNKNOWN_SESSION.to_string(),
        }
    }
}

/// 특정 실험의 배정 결과와 전환 추적
pub struct ExperimentView<'a> {
    registry: &'a AbTestRegistry,
    test_id: String,
    variant: Option<String>,
}

impl ExperimentView<'_> {
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn track_conversion(&self, conversion_type: &str, value: Option<f64>) {
        if let Some(variant) = &self.variant {
            self.registry
                .track_conversion(&self.test_id, variant, conversion_type, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::models::event::AnalyticsEvent;
    use academy_core::ports::random::{FixedRandom, SeededRandom};
    use academy_storage::memory::{BlockedStore, MemoryStore};

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<AnalyticsEvent>>);

    impl EventSink for RecordingSink {
        fn track(&self, event: AnalyticsEvent) {
            self.0.lock().push(event);
        }
    }

    impl RecordingSink {
        fn names(&self) -> Vec<String> {
            self.0.lock().iter().map(|e| e.kind.name().to_string()).collect()
        }
    }

    fn registry_with(
        random: Arc<dyn RandomSource>,
    ) -> (AbTestRegistry, Arc<RecordingSink>, Arc<MemoryStore>) {
        let sink = Arc::new(RecordingSink::default());
        let kv = Arc::new(MemoryStore::new());
        let registry =
            AbTestRegistry::new(AssignmentStore::in_memory(), random, sink.clone(), kv.clone());
        registry.register_test(hero_cta_test(Utc::now()));
        (registry, sink, kv)
    }

    fn weighted(weights: &[f64]) -> Vec<Variant> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Variant::new(format!("v{i}"), format!("V{i}"), *w))
            .collect()
    }

    #[test]
    fn pick_walks_cumulative_weights() {
        let variants = weighted(&[20.0, 30.0, 50.0]);
        assert_eq!(pick_variant(&variants, 0.0).unwrap().id, "v0");
        assert_eq!(pick_variant(&variants, 20.0).unwrap().id, "v0");
        assert_eq!(pick_variant(&variants, 20.5).unwrap().id, "v1");
        assert_eq!(pick_variant(&variants, 99.9).unwrap().id, "v2");
        assert!(pick_variant(&variants, f64::NAN).is_none());
        assert!(pick_variant(&[], 0.0).is_none());
    }

    #[test]
    fn unknown_or_inactive_test_has_no_variant() {
        let (registry, sink, _) = registry_with(Arc::new(FixedRandom(0.1)));
        assert!(registry.get_variant("missing", None).is_none());

        let mut inactive = hero_cta_test(Utc::now());
        inactive.id = "paused".to_string();
        inactive.is_active = false;
        registry.register_test(inactive);
        assert!(registry.get_variant("paused", None).is_none());
        assert!(sink.names().is_empty());
        assert_eq!(registry.active_tests().len(), 1);
    }

    #[test]
    fn assignment_is_sticky() {
        let (registry, sink, _) = registry_with(Arc::new(SeededRandom::new(7)));
        let first = registry.get_variant("hero_cta_test", Some("u1")).unwrap();
        for _ in 0..20 {
            assert_eq!(
                registry.get_variant("hero_cta_test", Some("u1")).as_deref(),
                Some(first.as_str())
            );
        }
        assert_eq!(sink.names(), vec!["ab_test_assignment"]);
        assert_eq!(registry.assignment_count(), 1);
    }

    #[test]
    fn anonymous_and_named_users_are_distinct_keys() {
        let (registry, _, _) = registry_with(Arc::new(SeededRandom::new(1)));
        registry.get_variant("hero_cta_test", None);
        registry.get_variant("hero_cta_test", Some("u1"));
        assert_eq!(registry.assignment_count(), 2);
    }

    #[test]
    fn even_weights_split_evenly() {
        let (registry, _, _) = registry_with(Arc::new(SeededRandom::new(2024)));
        let total = 100_000;
        let control = (0..total)
            .filter(|i| registry.is_in_variant("hero_cta_test", "control", Some(&format!("user-{i}"))))
            .count();
        let share = control as f64 / total as f64;
        assert!((0.45..=0.55).contains(&share), "control share {share}");
    }

    #[test]
    fn degenerate_walk_falls_back_to_first_without_event() {
        let (registry, sink, _) = registry_with(Arc::new(FixedRandom(0.5)));
        registry.register_test(AbTest {
            id: "nan_weights".to_string(),
            name: "NaN".to_string(),
            variants: weighted(&[f64::NAN, 1.0]),
            is_active: true,
            start_date: Utc::now(),
            end_date: None,
        });
        assert_eq!(registry.get_variant("nan_weights", None).as_deref(), Some("v0"));
        assert!(sink.names().is_empty());

        registry.register_test(AbTest {
            id: "empty".to_string(),
            name: "Empty".to_string(),
            variants: Vec::new(),
            is_active: true,
            start_date: Utc::now(),
            end_date: None,
        });
        assert!(registry.get_variant("empty", None).is_none());
    }

    #[test]
    fn conversion_carries_session_id() {
        let (registry, sink, kv) = registry_with(Arc::new(FixedRandom(0.1)));
        registry.track_conversion("hero_cta_test", "control", "signup", Some(1.0));
        kv.set(SESSION_ID_KEY, "session_123").unwrap();
        registry.track_conversion("hero_cta_test", "variant_a", "click", None);

        let events = sink.0.lock();
        let sessions: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::AbTestConversion { session_id, .. } => Some(session_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sessions, vec!["unknown", "session_123"]);
    }

    #[test]
    fn view_without_variant_is_noop() {
        let (registry, sink, _) = registry_with(Arc::new(FixedRandom(0.1)));
        let view = registry.view("missing", None);
        assert!(view.variant().is_none());
        view.track_conversion("click", None);
        assert!(sink.names().is_empty());

        let view = registry.view("hero_cta_test", None);
        assert_eq!(view.variant(), Some("control"));
        view.track_conversion("click", None);
        assert_eq!(sink.names(), vec!["ab_test_assignment", "ab_test_conversion"]);
    }

    #[test]
    fn persisted_assignments_survive_new_registry() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let first = AbTestRegistry::new(
            AssignmentStore::persistent(kv.clone()),
            Arc::new(FixedRandom(0.9)),
            sink.clone(),
            kv.clone(),
        );
        first.register_test(hero_cta_test(Utc::now()));
        assert_eq!(first.get_variant("hero_cta_test", None).as_deref(), Some("variant_a"));

        let second = AbTestRegistry::new(
            AssignmentStore::persistent(kv.clone()),
            Arc::new(FixedRandom(0.1)),
            sink,
            kv,
        );
        second.register_test(hero_cta_test(Utc::now()));
        assert_eq!(second.get_variant("hero_cta_test", None).as_deref(), Some("variant_a"));
    }

    #[test]
    fn blocked_storage_still_assigns() {
        let sink = Arc::new(RecordingSink::default());
        let registry = AbTestRegistry::new(
            AssignmentStore::persistent(Arc::new(BlockedStore)),
            Arc::new(FixedRandom(0.1)),
            sink,
            Arc::new(BlockedStore),
        );
        registry.register_test(hero_cta_test(Utc::now()));
        assert_eq!(registry.get_variant("hero_cta_test", None).as_deref(), Some("control"));
    }
}
