//! 캐시 레지스트리와 메모이제이션 헬퍼.
//!
//! API 응답 / 이미지 URL / 컴포넌트 결과 캐시 세 개를 한 곳에서 생성하고,
//! 그 위에 `cache_api_response`, `memoize`, `preload`를 제공한다.

use academy_core::config::CacheConfig;
use academy_core::error::CoreError;
use academy_core::ports::clock::Clock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{BoundedCache, CacheStats};

/// 용도별 캐시 묶음
#[derive(Clone)]
pub struct CacheRegistry {
    pub api: Arc<BoundedCache<Value>>,
    pub image: Arc<BoundedCache<String>>,
    pub component: Arc<BoundedCache<Value>>,
}

impl CacheRegistry {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            api: Arc::new(BoundedCache::new(
                config.api.max_size,
                config.api.default_ttl(),
                clock.clone(),
            )),
            image: Arc::new(BoundedCache::new(
                config.image.max_size,
                config.image.default_ttl(),
                clock.clone(),
            )),
            component: Arc::new(BoundedCache::new(
                config.component.max_size,
                config.component.default_ttl(),
                clock,
            )),
        }
    }

    /// API 응답 캐싱: 히트면 캐시 값, 미스면 fetcher 결과를 저장 후 반환
    ///
    /// fetcher 실패는 캐시하지 않고 그대로 전파한다.
    pub async fn cache_api_response<T, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        if let Some(cached) = self.api.get(key) {
            match serde_json::from_value::<T>(cached) {
                Ok(data) => {
                    debug!("API 캐시 히트: {key}");
                    return Ok(data);
                }
                Err(e) => {
                    warn!("API 캐시 항목 형식 불일치, 다시 가져옴: {key}: {e}");
                    self.api.delete(key);
                }
            }
        }

        let data = fetcher().await?;
        self.api.set(key, serde_json::to_value(&data)?, ttl);
        Ok(data)
    }

    /// 컴포넌트 캐시를 쓰는 메모이즈 함수 생성
    ///
    /// 캐시 키는 `{namespace}:{인자 JSON}`.
    pub fn memoize<A, R, F>(
        &self,
        namespace: impl Into<String>,
        func: F,
        ttl: Option<Duration>,
    ) -> Memoized<A, R, F>
    where
        A: Serialize + ?Sized,
        R: Serialize + DeserializeOwned,
        F: Fn(&A) -> R,
    {
        Memoized {
            namespace: namespace.into(),
            func,
            cache: self.component.clone(),
            ttl,
            _marker: PhantomData,
        }
    }

    /// 아직 없는 키만 미리 가져와 API 캐시에 저장
    ///
    /// 실패한 키는 경고만 남기고 건너뛴다. 새로 저장한 개수를 반환한다.
    pub async fn preload<I, F, Fut>(&self, keys: I, fetcher: F) -> usize
    where
        I: IntoIterator<Item = String>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Value, CoreError>>,
    {
        let mut loaded = 0;
        for key in keys {
            if self.api.has(&key) {
                continue;
            }
            match fetcher(key.clone()).await {
                Ok(value) => {
                    self.api.set(key, value, None);
                    loaded += 1;
                }
                Err(e) => warn!("프리로드 실패: {key}: {e}"),
            }
        }
        loaded
    }

    /// 이미지 URL 캐시 조회 또는 계산
    pub fn cached_image_url<F>(&self, src: &str, resolve: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if let Some(url) = self.image.get(src) {
            return url;
        }
        let url = resolve(src);
        self.image.set(src, url.clone(), None);
        url
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            api: self.api.stats(),
            image: self.image.stats(),
            component: self.component.stats(),
        }
    }

    pub fn clear_all(&self) {
        self.api.clear();
        self.image.clear();
        self.component.clear();
    }
}

/// 캐시별 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub api: CacheStats,
    pub image: CacheStats,
    pub component: CacheStats,
}

/// 메모이즈된 함수
pub struct Memoized<A: ?Sized, R, F> {
    namespace: String,
    func: F,
    cache: Arc<BoundedCache<Value>>,
    ttl: Option<Duration>,
    _marker: PhantomData<fn(&A) -> R>,
}

impl<A, R, F> Memoized<A, R, F>
where
    A: Serialize + ?Sized,
    R: Serialize + DeserializeOwned,
    F: Fn(&A) -> R,
{
    pub fn call(&self, args: &A) -> R {
        let key = match serde_json::to_string(args) {
            Ok(json) => format!("{}:{json}", self.namespace),
            Err(e) => {
                warn!("메모이즈 키 생성 실패, 캐시 없이 실행: {}: {e}", self.namespace);
                return (self.func)(args);
            }
        };

        if let Some(hit) = self.cache.get(&key) {
            if let Ok(result) = serde_json::from_value::<R>(hit) {
                return result;
            }
        }

        let result = (self.func)(args);
        match serde_json::to_value(&result) {
            Ok(value) => self.cache.set(key, value, self.ttl),
            Err(e) => warn!("메모이즈 결과 직렬화 실패: {}: {e}", self.namespace),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::ports::clock::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> (CacheRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let registry = CacheRegistry::new(&CacheConfig::default(), clock.clone());
        (registry, clock)
    }

    #[test]
    fn sizes_follow_config() {
        let (registry, _) = registry();
        assert_eq!(registry.api.max_size(), 50);
        assert_eq!(registry.image.max_size(), 100);
        assert_eq!(registry.component.max_size(), 25);
        assert_eq!(registry.api.default_ttl(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn api_response_is_fetched_once() {
        let (registry, _) = registry();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let courses: Vec<String> = registry
                .cache_api_response(
                    "/api/courses",
                    move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(vec!["rust".to_string(), "ml".to_string()])
                    },
                    None,
                )
                .await
                .unwrap();
            assert_eq!(courses.len(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn api_response_refetches_after_ttl() {
        let (registry, clock) = registry();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            Ok::<_, CoreError>(counter.fetch_add(1, Ordering::SeqCst) as u32)
        };

        let first: u32 = registry
            .cache_api_response("k", fetch, Some(Duration::from_millis(100)))
            .await
            .unwrap();
        clock.advance_ms(101);
        let second: u32 = registry
            .cache_api_response("k", fetch, Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!((first, second), (0, 1));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let (registry, _) = registry();
        let result: Result<String, _> = registry
            .cache_api_response(
                "k",
                || async { Err(CoreError::Network("오프라인".into())) },
                None,
            )
            .await;
        assert!(result.is_err());
        assert!(!registry.api.has("k"));
    }

    #[test]
    fn memoize_keys_on_argument_json() {
        let (registry, _) = registry();
        let calls = AtomicUsize::new(0);
        let square = registry.memoize(
            "square",
            |n: &u64| {
                calls.fetch_add(1, Ordering::SeqCst);
                n * n
            },
            None,
        );

        assert_eq!(square.call(&4), 16);
        assert_eq!(square.call(&4), 16);
        assert_eq!(square.call(&5), 25);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.component.has("square:4"));
    }

    #[tokio::test]
    async fn preload_skips_present_and_failed_keys() {
        let (registry, _) = registry();
        registry.api.set("a", Value::from(1), None);

        let loaded = registry
            .preload(
                vec!["a".to_string(), "b".to_string(), "broken".to_string()],
                |key| async move {
                    if key == "broken" {
                        Err(CoreError::Network("500".into()))
                    } else {
                        Ok(Value::from(key))
                    }
                },
            )
            .await;

        assert_eq!(loaded, 1);
        assert_eq!(registry.api.get("a"), Some(Value::from(1)));
        assert_eq!(registry.api.get("b"), Some(Value::from("b")));
        assert!(!registry.api.has("broken"));
    }

    #[test]
    fn image_url_resolved_once() {
        let (registry, _) = registry();
        let first = registry.cached_image_url("hero.png", |s| format!("/cdn/{s}"));
        let second = registry.cached_image_url("hero.png", |_| unreachable!());
        assert_eq!(first, "/cdn/hero.png");
        assert_eq!(second, first);
        assert_eq!(registry.stats().image.size, 1);
    }
}
