//! 세션 모델.
//!
//! 브라우저 프로필당 하나의 세션 레코드와 그 이벤트 로그.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::page::DeviceInfo;

/// 세션 활동 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Active,
    Inactive,
}

/// 추적 대상 사용자 상호작용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Click,
    Scroll,
    Keydown,
    Mousemove,
}

/// 세션 이벤트 종류와 종류별 데이터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEventKind {
    PageView {
        path: String,
        search: String,
        hash: String,
        title: String,
    },
    PageHidden,
    PageVisible,
    Interaction {
        interaction: InteractionKind,
    },
    SessionInactive {
        inactivity_duration_ms: u64,
    },
    Heartbeat {
        session_duration_ms: i64,
        page_views: u32,
    },
    PageUnload {
        session_duration_ms: i64,
        page_views: u32,
        event_count: usize,
    },
    UserIdentified {
        user_id: String,
    },
    Custom {
        name: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl SessionEventKind {
    /// 이벤트 유형 이름 (집계 키)
    pub fn type_name(&self) -> &str {
        match self {
            SessionEventKind::PageView { .. } => "page_view",
            SessionEventKind::PageHidden => "page_hidden",
            SessionEventKind::PageVisible => "page_visible",
            SessionEventKind::Interaction { .. } => "interaction",
            SessionEventKind::SessionInactive { .. } => "session_inactive",
            SessionEventKind::Heartbeat { .. } => "heartbeat",
            SessionEventKind::PageUnload { .. } => "page_unload",
            SessionEventKind::UserIdentified { .. } => "user_identified",
            SessionEventKind::Custom { name, .. } => name,
        }
    }
}

/// 세션 이벤트 로그 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub timestamp: DateTime<Utc>,
    /// 이벤트 발생 시 페이지 경로
    pub page: String,
}

/// 세션 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 영속 세션 ID
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub page_views: u32,
    /// 상한이 있는 이벤트 로그 (오래된 것부터)
    pub events: Vec<SessionEvent>,
    pub device: DeviceInfo,
    pub referrer: String,
    pub utm_params: BTreeMap<String, String>,
}

/// 이벤트 유형별 횟수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCount {
    pub event_type: String,
    pub count: usize,
}

/// 세션 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub duration_ms: i64,
    pub page_views: u32,
    pub event_count: usize,
    pub is_active: bool,
    /// 횟수 내림차순 상위 5개
    pub top_events: Vec<EventCount>,
}
