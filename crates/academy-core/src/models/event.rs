//! 분석 이벤트 모델.
//!
//! 모든 계측 컴포넌트가 `EventSink`로 보내는 이벤트의 통합 enum.
//! 알려진 이벤트는 각자 타입이 있는 필드를 가지며,
//! 열린 메타데이터만 `Custom`의 key-value 맵으로 표현한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::health::HealthStatus;
use crate::models::vitals::{MetricName, Rating};

/// 이벤트 종류: 와이어 이름은 `name` 태그
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "properties", rename_all = "snake_case")]
pub enum EventKind {
    PageView {
        path: String,
        title: String,
    },
    UserInteraction {
        element: String,
        action: String,
    },
    PerformanceMetrics {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_load_time: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_contentful_paint: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        largest_contentful_paint: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cumulative_layout_shift: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_input_delay: Option<f64>,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },
    Conversion {
        #[serde(rename = "type")]
        conversion_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    WebVital {
        metric: MetricName,
        value: f64,
        rating: Rating,
        delta: f64,
    },
    PerformanceBudgetViolation {
        metric: MetricName,
        value: f64,
        violations: Vec<String>,
    },
    LargeResourceDetected {
        url: String,
        size: u64,
        #[serde(rename = "type")]
        resource_type: String,
    },
    LongTask {
        duration: f64,
        start_time: f64,
    },
    AbTestAssignment {
        test_id: String,
        variant_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        session_id: String,
    },
    AbTestConversion {
        test_id: String,
        variant_id: String,
        session_id: String,
        conversion_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    SessionHeartbeat {
        session_id: String,
        session_duration_ms: i64,
        page_views: u32,
    },
    SessionInactive {
        session_id: String,
        inactivity_duration_ms: u64,
    },
    SessionEnded {
        session_id: String,
        session_duration_ms: i64,
        page_views: u32,
        event_count: usize,
    },
    ErrorBoundaryTriggered {
        event_id: String,
        error_message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_stack: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component_stack: Option<String>,
        retry_count: u32,
    },
    ErrorBoundaryRetry {
        event_id: String,
        retry_count: u32,
    },
    ErrorBoundaryReload {
        event_id: String,
    },
    HealthReport {
        overall: HealthStatus,
        checks: usize,
        critical: usize,
    },
    Custom {
        #[serde(rename = "event")]
        name: String,
        #[serde(default)]
        properties: BTreeMap<String, serde_json::Value>,
    },
}

impl EventKind {
    /// 와이어 이벤트 이름
    pub fn name(&self) -> &str {
        match self {
            EventKind::PageView { .. } => "page_view",
            EventKind::UserInteraction { .. } => "user_interaction",
            EventKind::PerformanceMetrics { .. } => "performance_metrics",
            EventKind::Error { .. } => "error",
            EventKind::Conversion { .. } => "conversion",
            EventKind::WebVital { .. } => "web_vital",
            EventKind::PerformanceBudgetViolation { .. } => "performance_budget_violation",
            EventKind::LargeResourceDetected { .. } => "large_resource_detected",
            EventKind::LongTask { .. } => "long_task",
            EventKind::AbTestAssignment { .. } => "ab_test_assignment",
            EventKind::AbTestConversion { .. } => "ab_test_conversion",
            EventKind::SessionHeartbeat { .. } => "session_heartbeat",
            EventKind::SessionInactive { .. } => "session_inactive",
            EventKind::SessionEnded { .. } => "session_ended",
            EventKind::ErrorBoundaryTriggered { .. } => "error_boundary_triggered",
            EventKind::ErrorBoundaryRetry { .. } => "error_boundary_retry",
            EventKind::ErrorBoundaryReload { .. } => "error_boundary_reload",
            EventKind::HealthReport { .. } => "health_report",
            EventKind::Custom { name, .. } => name,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EventKind::Error { .. })
    }
}

/// 싱크로 들어오는 이벤트: 타임스탬프가 없으면 싱크가 채운다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AnalyticsEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: None,
        }
    }

    pub fn at(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            timestamp: Some(timestamp),
        }
    }
}

impl From<EventKind> for AnalyticsEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

/// 페이지 컨텍스트가 덧붙여져 프로바이더로 전달되는 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedEvent {
    pub event_id: Uuid,
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub user_agent: String,
    pub referrer: String,
}

impl DispatchedEvent {
    pub fn name(&self) -> &str {
        self.kind.name()
    }
}
