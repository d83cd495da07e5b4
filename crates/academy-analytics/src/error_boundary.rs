//! 에러 바운더리.
//!
//! 렌더링 중 발생한 예기치 못한 에러를 포착해 분석 싱크로 보고하고,
//! 정해진 횟수까지 재시도를 허용한 뒤에는 전체 새로고침을 요구한다.

use std::sync::Arc;

use academy_core::models::event::EventKind;
use academy_core::ports::analytics::EventSink;
use academy_core::ports::clock::Clock;
use academy_core::ports::random::RandomSource;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info};

/// `error` 이벤트의 context 값
const BOUNDARY_CONTEXT: &str = "error_boundary";

/// 포착된 에러
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaughtError {
    /// `error_<millis>_<base36 9자>`
    pub event_id: String,
    pub message: String,
    pub stack: Option<String>,
    pub component_stack: Option<String>,
}

/// 재시도 요청 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// 에러 상태를 지우고 다시 렌더링
    Retried { retry_count: u32 },
    /// 재시도 한도 소진: 새로고침 필요
    ReloadRequired,
    /// 포착된 에러가 없음
    NoError,
}

#[derive(Debug, Default)]
struct BoundaryState {
    error: Option<CaughtError>,
    retry_count: u32,
}

/// 에러 바운더리
pub struct ErrorBoundary {
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    max_retries: u32,
    state: Mutex<BoundaryState>,
}

impl ErrorBoundary {
    pub fn new(
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
        max_retries: u32,
    ) -> Self {
        Self {
            sink,
            clock,
            random,
            max_retries,
            state: Mutex::new(BoundaryState::default()),
        }
    }

    /// 에러 포착: 이벤트 ID를 돌려준다
    pub fn catch(
        &self,
        message: &str,
        stack: Option<&str>,
        component_stack: Option<&str>,
    ) -> String {
        let event_id = format!(
            "error_{}_{}",
            self.clock.now().timestamp_millis(),
            self.random.base36(9)
        );
        error!("에러 바운더리 포착 [{event_id}]: {message}");

        let retry_count = {
            let mut state = self.state.lock();
            state.error = Some(CaughtError {
                event_id: event_id.clone(),
                message: message.to_string(),
                stack: stack.map(str::to_string),
                component_stack: component_stack.map(str::to_string),
            });
            state.retry_count
        };

        self.sink.track(
            EventKind::Error {
                message: message.to_string(),
                stack: stack.map(str::to_string),
                context: Some(BOUNDARY_CONTEXT.to_string()),
            }
            .into(),
        );
        self.sink.track(
            EventKind::ErrorBoundaryTriggered {
                event_id: event_id.clone(),
                error_message: message.to_string(),
                error_stack: stack.map(str::to_string),
                component_stack: component_stack.map(str::to_string),
                retry_count,
            }
            .into(),
        );
        event_id
    }

    /// 재시도: `retry_count < max_retries`일 때만 허용
    pub fn retry(&self) -> RetryOutcome {
        let (event_id, retry_count) = {
            let mut state = self.state.lock();
            let Some(caught) = state.error.as_ref() else {
                return RetryOutcome::NoError;
            };
            if state.retry_count >= self.max_retries {
                return RetryOutcome::ReloadRequired;
            }
            let event_id = caught.event_id.clone();
            state.retry_count += 1;
            state.error = None;
            (event_id, state.retry_count)
        };

        info!("에러 바운더리 재시도 {retry_count}/{}", self.max_retries);
        self.sink.track(
            EventKind::ErrorBoundaryRetry {
                event_id,
                retry_count,
            }
            .into(),
        );
        RetryOutcome::Retried { retry_count }
    }

    /// 전체 새로고침: 상태를 초기화하고 보고한다
    pub fn reload(&self) {
        let event_id = {
            let mut state = self.state.lock();
            let event_id = state
                .error
                .as_ref()
                .map(|e| e.event_id.clone())
                .unwrap_or_default();
            *state = BoundaryState::default();
            event_id
        };
        info!("에러 바운더리 새로고침 요청");
        self.sink
            .track(EventKind::ErrorBoundaryReload { event_id }.into());
    }

    pub fn has_error(&self) -> bool {
        self.state.lock().error.is_some()
    }

    pub fn current_error(&self) -> Option<CaughtError> {
        self.state.lock().error.clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.state.lock().retry_count
    }

    /// 남은 재시도 횟수
    pub fn retries_left(&self) -> u32 {
        self.max_retries.saturating_sub(self.retry_count())
    }

    pub fn can_retry(&self) -> bool {
        self.retries_left() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::models::event::AnalyticsEvent;
    use academy_core::ports::clock::ManualClock;
    use academy_core::ports::random::FixedRandom;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<AnalyticsEvent>>);

    impl EventSink for RecordingSink {
        fn track(&self, event: AnalyticsEvent) {
            self.0.lock().push(event);
        }
    }

    fn boundary(max_retries: u32) -> (ErrorBoundary, Arc<RecordingSink>, Arc<ManualClock>) {
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(ManualClock::at_epoch());
        let boundary = ErrorBoundary::new(
            sink.clone(),
            clock.clone(),
            Arc::new(FixedRandom(0.0)),
            max_retries,
        );
        (boundary, sink, clock)
    }

    #[test]
    fn catch_reports_error_and_trigger() {
        let (boundary, sink, clock) = boundary(3);
        let event_id = boundary.catch("Cannot read properties of undefined", Some("at Hero"), None);

        assert_eq!(
            event_id,
            format!("error_{}_000000000", clock.now().timestamp_millis())
        );
        assert!(boundary.has_error());

        let events = sink.0.lock();
        assert_eq!(events.len(), 2);
        match &events[0].kind {
            EventKind::Error { context, .. } => assert_eq!(context.as_deref(), Some("error_boundary")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(events[1].kind.name(), "error_boundary_triggered");
    }

    #[test]
    fn retries_are_capped() {
        let (boundary, sink, _) = boundary(2);

        boundary.catch("first", None, None);
        assert_eq!(boundary.retry(), RetryOutcome::Retried { retry_count: 1 });
        assert!(!boundary.has_error());

        boundary.catch("second", None, None);
        assert_eq!(boundary.retry(), RetryOutcome::Retried { retry_count: 2 });

        boundary.catch("third", None, None);
        assert!(!boundary.can_retry());
        assert_eq!(boundary.retry(), RetryOutcome::ReloadRequired);
        assert!(boundary.has_error());

        let retries = sink
            .0
            .lock()
            .iter()
            .filter(|e| e.kind.name() == "error_boundary_retry")
            .count();
        assert_eq!(retries, 2);
    }

    #[test]
    fn reload_resets_state() {
        let (boundary, sink, _) = boundary(0);
        let event_id = boundary.catch("fatal", None, Some("in App"));
        assert_eq!(boundary.retry(), RetryOutcome::ReloadRequired);

        boundary.reload();
        assert!(!boundary.has_error());
        assert_eq!(boundary.retry_count(), 0);
        match &sink.0.lock().last().unwrap().kind {
            EventKind::ErrorBoundaryReload { event_id: reported } => assert_eq!(reported, &event_id),
            other => panic!("unexpected event: {other:?}"),
        };
    }

    #[test]
    fn retry_without_error_is_noop() {
        let (boundary, sink, _) = boundary(3);
        assert_eq!(boundary.retry(), RetryOutcome::NoError);
        assert!(sink.0.lock().is_empty());
    }
}
