//! 분석 프로바이더.
//!
//! 개발 환경의 콘솔 출력([`ConsoleProvider`])과 테스트/리플레이용 메모리 수집([`MemoryProvider`]).

use academy_core::error::CoreError;
use academy_core::models::event::DispatchedEvent;
use academy_core::ports::analytics::AnalyticsProvider;
use parking_lot::Mutex;
use tracing::info;

/// `tracing::info!`로 이벤트를 출력하는 개발용 프로바이더
#[derive(Debug, Default)]
pub struct ConsoleProvider;

impl AnalyticsProvider for ConsoleProvider {
    fn name(&self) -> &str {
        "console"
    }

    fn dispatch(&self, event: &DispatchedEvent) -> Result<(), CoreError> {
        let payload = serde_json::to_string(&event.kind)?;
        info!(event_id = %event.event_id, url = %event.url, "분석 이벤트: {} {payload}", event.name());
        Ok(())
    }
}

/// 전달된 이벤트를 순서대로 보관
#[derive(Debug, Default)]
pub struct MemoryProvider {
    events: Mutex<Vec<DispatchedEvent>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DispatchedEvent> {
        self.events.lock().clone()
    }

    /// 이벤트 이름 목록 (전달 순서)
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AnalyticsProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn dispatch(&self, event: &DispatchedEvent) -> Result<(), CoreError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::models::event::EventKind;
    use chrono::Utc;
    use uuid::Uuid;

    fn dispatched(kind: EventKind) -> DispatchedEvent {
        DispatchedEvent {
            event_id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            url: "https://aiacademy.example.com/".to_string(),
            user_agent: String::new(),
            referrer: String::new(),
        }
    }

    #[test]
    fn memory_provider_keeps_order() {
        let provider = MemoryProvider::new();
        provider
            .dispatch(&dispatched(EventKind::PageView {
                path: "/".to_string(),
                title: String::new(),
            }))
            .unwrap();
        provider
            .dispatch(&dispatched(EventKind::Conversion {
                conversion_type: "signup".to_string(),
                value: None,
            }))
            .unwrap();

        assert_eq!(provider.names(), vec!["page_view", "conversion"]);
        assert_eq!(provider.count_named("conversion"), 1);

        provider.clear();
        assert!(provider.is_empty());
    }

    #[test]
    fn console_provider_accepts_events() {
        let event = dispatched(EventKind::LongTask {
            duration: 75.0,
            start_time: 10.0,
        });
        assert!(ConsoleProvider.dispatch(&event).is_ok());
        assert_eq!(ConsoleProvider.name(), "console");
    }
}
