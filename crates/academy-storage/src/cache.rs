//! TTL + 크기 제한 LRU 캐시.
//!
//! 만료는 읽기 시점에만 검사한다 (백그라운드 스윕 없음).
//! 용량이 찬 상태에서 삽입하면 가장 오래 접근되지 않은 항목 하나를 먼저 제거하므로
//! 호출자 관점에서 `len() <= max_size`가 항상 성립한다.

use academy_core::ports::clock::Clock;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 캐시 항목
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// `now - created_at > ttl`
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (now - self.created_at).to_std() {
            Ok(age) => age > self.ttl,
            // 시계가 뒤로 간 경우
            Err(_) => false,
        }
    }
}

/// 캐시 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub total_accesses: u64,
    /// 항목당 평균 접근 횟수
    pub hit_rate: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// 시간/크기 제한 캐시
pub struct BoundedCache<T> {
    entries: Mutex<LruCache<String, CacheEntry<T>>>,
    max_size: usize,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> BoundedCache<T> {
    /// `max_size`가 0이면 1로 취급
    pub fn new(max_size: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            max_size: max_size.max(1),
            default_ttl,
            clock,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// 항목 저장 (기존 키는 덮어씀)
    ///
    /// 새 키를 넣을 때만 용량을 검사한다. 덮어쓰기는 다른 항목을 제거하지 않는다.
    pub fn set(&self, key: impl Into<String>, data: T, ttl: Option<Duration>) {
        let key = key.into();
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        if !entries.contains(&key) && entries.len() >= self.max_size {
            if let Some((evicted, _)) = entries.pop_lru() {
                debug!("캐시 용량 초과, LRU 제거: {evicted}");
            }
        }

        entries.put(
            key,
            CacheEntry {
                data,
                created_at: now,
                ttl: ttl.unwrap_or(self.default_ttl),
                access_count: 0,
                last_accessed_at: now,
            },
        );
    }

    /// 항목 조회: 만료 항목은 제거 후 None, 히트 시 접근 정보 갱신
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let expired = entries.peek(key)?.is_expired(now);
        if expired {
            entries.pop(key);
            debug!("캐시 항목 만료: {key}");
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.access_count += 1;
        entry.last_accessed_at = now;
        Some(entry.data.clone())
    }

    /// `get(key).is_some()`: 만료 제거와 접근 갱신 부수효과가 있다
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 현재 항목 수 (만료됐지만 아직 읽히지 않은 항목 포함)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let size = entries.len();
        let total_accesses: u64 = entries.iter().map(|(_, e)| e.access_count).sum();
        let hit_rate = if size == 0 {
            0.0
        } else {
            total_accesses as f64 / size as f64
        };

        CacheStats {
            size,
            total_accesses,
            hit_rate,
            oldest_entry: entries.iter().map(|(_, e)| e.created_at).min(),
            newest_entry: entries.iter().map(|(_, e)| e.created_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::ports::clock::ManualClock;

    fn cache_with(max_size: usize) -> (BoundedCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let cache = BoundedCache::new(max_size, Duration::from_secs(300), clock.clone());
        (cache, clock)
    }

    #[test]
    fn size_never_exceeds_max() {
        let (cache, clock) = cache_with(3);
        for i in 0..20 {
            cache.set(format!("k{}", i % 5), format!("v{i}"), None);
            clock.advance_ms(1);
            assert!(cache.len() <= 3);
        }
    }

    #[test]
    fn overwrite_at_capacity_stays_bounded() {
        let (cache, _clock) = cache_with(2);
        cache.set("a", "1".into(), None);
        cache.set("b", "2".into(), None);
        cache.set("b", "3".into(), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("b").as_deref(), Some("3"));
    }

    #[test]
    fn overwrite_refreshes_recency() {
        let (cache, clock) = cache_with(2);
        cache.set("a", "1".into(), None);
        clock.advance_ms(1);
        cache.set("b", "2".into(), None);
        clock.advance_ms(1);
        cache.set("a", "1b".into(), None);
        cache.set("c", "3".into(), None);

        assert_eq!(cache.len(), 2);
        assert!(!cache.has("b"));
        assert_eq!(cache.get("a").as_deref(), Some("1b"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn ttl_is_checked_lazily() {
        let (cache, clock) = cache_with(10);
        cache.set("k", "v".into(), Some(Duration::from_millis(100)));

        clock.advance_ms(50);
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        clock.advance_ms(100);
        // 만료 항목은 읽기 전까지 남아 있다
        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn ttl_boundary_is_inclusive() {
        let (cache, clock) = cache_with(10);
        cache.set("k", "v".into(), Some(Duration::from_millis(100)));
        clock.advance_ms(100);
        assert!(cache.has("k"));
        clock.advance_ms(1);
        assert!(!cache.has("k"));
    }

    #[test]
    fn lru_eviction_respects_recent_reads() {
        let (cache, clock) = cache_with(2);
        cache.set("a", "A".into(), None);
        clock.advance_ms(1);
        cache.set("b", "B".into(), None);
        clock.advance_ms(1);
        assert!(cache.get("a").is_some());
        clock.advance_ms(1);
        cache.set("c", "C".into(), None);

        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").as_deref(), Some("A"));
        assert_eq!(cache.get("c").as_deref(), Some("C"));
    }

    #[test]
    fn has_bumps_recency() {
        let (cache, clock) = cache_with(2);
        cache.set("a", "A".into(), None);
        clock.advance_ms(1);
        cache.set("b", "B".into(), None);
        clock.advance_ms(1);
        assert!(cache.has("a"));
        cache.set("c", "C".into(), None);
        assert!(cache.has("a"));
        assert!(!cache.has("b"));
    }

    #[test]
    fn stats_report_accesses_and_bounds() {
        let (cache, clock) = cache_with(10);
        assert_eq!(cache.stats().oldest_entry, None);
        assert_eq!(cache.stats().hit_rate, 0.0);

        let t0 = clock.now();
        cache.set("a", "A".into(), None);
        clock.advance_ms(10);
        cache.set("b", "B".into(), None);
        cache.get("a");
        cache.get("a");
        cache.get("b");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.total_accesses, 3);
        assert_eq!(stats.hit_rate, 1.5);
        assert_eq!(stats.oldest_entry, Some(t0));
        assert_eq!(stats.newest_entry, Some(t0 + chrono::Duration::milliseconds(10)));
    }

    #[test]
    fn delete_and_clear() {
        let (cache, _clock) = cache_with(4);
        cache.set("a", "A".into(), None);
        cache.set("b", "B".into(), None);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (cache, _clock) = cache_with(0);
        cache.set("a", "A".into(), None);
        cache.set("b", "B".into(), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.max_size(), 1);
    }
}
