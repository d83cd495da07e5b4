//! 분석 이벤트 깔때기.
//!
//! 모든 계측 컴포넌트는 [`EventSink::track`]으로 이벤트를 보낸다.
//! [`AnalyticsSink`]는 이벤트에 ID, 타임스탬프, 현재 URL, User-Agent, referrer를 붙여
//! 등록된 프로바이더에 순서대로 전달하고, broadcast 구독자에게도 복제한다.
//! 프로바이더 실패는 다른 프로바이더나 호출자에게 전파되지 않는다.

use std::sync::Arc;

use academy_core::models::event::{AnalyticsEvent, DispatchedEvent, EventKind};
use academy_core::ports::analytics::{AnalyticsProvider, EventSink};
use academy_core::ports::clock::Clock;
use academy_core::ports::environment::HostEnvironment;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// broadcast 구독 버퍼 크기
const SUBSCRIBER_CAPACITY: usize = 256;

/// `performance_metrics` 이벤트 입력: 측정된 항목만 채운다
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageMetrics {
    pub page_load_time: Option<f64>,
    pub first_contentful_paint: Option<f64>,
    pub largest_contentful_paint: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
    pub first_input_delay: Option<f64>,
}

#[derive(Debug, Default)]
struct DispatchCounters {
    total: u64,
    errors: u64,
}

/// 이벤트 깔때기
pub struct AnalyticsSink {
    env: Arc<dyn HostEnvironment>,
    clock: Arc<dyn Clock>,
    providers: RwLock<Vec<Arc<dyn AnalyticsProvider>>>,
    counters: Mutex<DispatchCounters>,
    events_tx: broadcast::Sender<DispatchedEvent>,
}

impl AnalyticsSink {
    pub fn new(env: Arc<dyn HostEnvironment>, clock: Arc<dyn Clock>) -> Self {
        let (events_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            env,
            clock,
            providers: RwLock::new(Vec::new()),
            counters: Mutex::new(DispatchCounters::default()),
            events_tx,
        }
    }

    /// 프로바이더 추가 (등록 순서대로 전달)
    pub fn add_provider(&self, provider: Arc<dyn AnalyticsProvider>) {
        debug!("분석 프로바이더 등록: {}", provider.name());
        self.providers.write().push(provider);
    }

    pub fn provider_count(&self) -> usize {
        self.providers.read().len()
    }

    /// 전달된 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchedEvent> {
        self.events_tx.subscribe()
    }

    /// 컨텍스트를 붙여 전달하고, 전달된 이벤트를 돌려준다
    pub fn dispatch(&self, event: AnalyticsEvent) -> DispatchedEvent {
        let page = self.env.page();
        let dispatched = DispatchedEvent {
            event_id: Uuid::new_v4(),
            timestamp: event.timestamp.unwrap_or_else(|| self.clock.now()),
            url: page.href().to_string(),
            user_agent: self.env.user_agent(),
            referrer: page.referrer,
            kind: event.kind,
        };

        {
            let mut counters = self.counters.lock();
            counters.total += 1;
            if dispatched.kind.is_error() {
                counters.errors += 1;
            }
        }

        let providers = self.providers.read().clone();
        for provider in providers {
            if let Err(e) = provider.dispatch(&dispatched) {
                warn!(
                    "분석 프로바이더 전달 실패: {} ({}): {e}",
                    provider.name(),
                    dispatched.name()
                );
            }
        }

        // 구독자가 없으면 Err: 무시
        let _ = self.events_tx.send(dispatched.clone());
        dispatched
    }

    pub fn track_page_view(&self, path: &str) {
        let title = self.env.page().title;
        self.track(
            EventKind::PageView {
                path: path.to_string(),
                title,
            }
            .into(),
        );
    }

    pub fn track_interaction(&self, element: &str, action: &str) {
        self.track(
            EventKind::UserInteraction {
                element: element.to_string(),
                action: action.to_string(),
            }
            .into(),
        );
    }

    pub fn track_performance(&self, metrics: PageMetrics) {
        self.track(
            EventKind::PerformanceMetrics {
                page_load_time: metrics.page_load_time,
                first_contentful_paint: metrics.first_contentful_paint,
                largest_contentful_paint: metrics.largest_contentful_paint,
                cumulative_layout_shift: metrics.cumulative_layout_shift,
                first_input_delay: metrics.first_input_delay,
            }
            .into(),
        );
    }

    pub fn track_error(&self, message: &str, stack: Option<&str>, context: Option<&str>) {
        self.track(
            EventKind::Error {
                message: message.to_string(),
                stack: stack.map(str::to_string),
                context: context.map(str::to_string),
            }
            .into(),
        );
    }

    pub fn track_conversion(&self, conversion_type: &str, value: Option<f64>) {
        self.track(
            EventKind::Conversion {
                conversion_type: conversion_type.to_string(),
                value,
            }
            .into(),
        );
    }

    /// 지금까지 전달된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.counters.lock().total
    }

    /// `error` 이벤트 비율 (0.0 ~ 1.0, 이벤트가 없으면 0)
    pub fn error_rate(&self) -> f64 {
        let counters = self.counters.lock();
        if counters.total == 0 {
            return 0.0;
        }
        counters.errors as f64 / counters.total as f64
    }
}

impl EventSink for AnalyticsSink {
    fn track(&self, event: AnalyticsEvent) {
        self.dispatch(event);
    }
}
