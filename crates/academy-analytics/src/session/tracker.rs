//! 세션 추적기.
//!
//! 브라우저 프로필당 하나의 세션 레코드를 소유한다.
//! 세션 ID는 `session_id` 키에 영속되고, 언로드 시 전체 스냅샷이 `session_data`에 저장된다.
//!
//! 활동 상태는 두 가지다:
//! - 페이지가 숨겨지거나 비활성 시간 창 동안 상호작용이 없으면 `Inactive`
//! - 페이지가 다시 보이거나 (숨김이 아닌 상태의) 상호작용이 있으면 `Active`
//!
//! 하트비트는 `Active`일 때만 기록된다.

use std::collections::BTreeMap;
use std::sync::Arc;

use academy_core::config::SessionConfig;
use academy_core::error::CoreError;
use academy_core::handle::TaskHandle;
use academy_core::models::event::EventKind;
use academy_core::models::session::{
    ActivityState, EventCount, InteractionKind, SessionEvent, SessionEventKind, SessionRecord,
    SessionSummary,
};
use academy_core::ports::analytics::EventSink;
use academy_core::ports::clock::{elapsed_ms, Clock};
use academy_core::ports::environment::HostEnvironment;
use academy_core::ports::random::RandomSource;
use academy_core::ports::storage::{KeyValueStore, SESSION_DATA_KEY, SESSION_ID_KEY};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::timers;

/// 최초 URL에서 추출하는 UTM 파라미터
pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// 요약에 포함되는 상위 이벤트 유형 수
const TOP_EVENT_LIMIT: usize = 5;

// ============================================================
// 내부 상태
// ============================================================

struct SessionState {
    record: SessionRecord,
    hidden: bool,
    idle: bool,
    last_interaction: DateTime<Utc>,
    last_event_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn activity(&self) -> ActivityState {
        if self.hidden || self.idle {
            ActivityState::Inactive
        } else {
            ActivityState::Active
        }
    }

    fn mark_activity(&mut self, now: DateTime<Utc>) {
        self.last_interaction = now;
        self.record.last_activity = now;
        self.idle = false;
    }

    fn duration_ms(&self, now: DateTime<Utc>) -> i64 {
        elapsed_ms(now, self.record.start_time)
    }

    /// 이벤트 추가: 타임스탬프는 직전 이벤트보다 항상 크다
    fn append(
        &mut self,
        kind: SessionEventKind,
        now: DateTime<Utc>,
        page: String,
        config: &SessionConfig,
    ) {
        let timestamp = match self.last_event_at {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_event_at = Some(timestamp);
        self.record.events.push(SessionEvent {
            kind,
            timestamp,
            page,
        });

        let len = self.record.events.len();
        if len > config.max_events {
            let keep = config.compact_to.min(config.max_events);
            self.record.events.drain(..len - keep);
            debug!("세션 이벤트 로그 압축: {len} → {keep}");
        }
    }
}

// ============================================================
// SessionTracker
// ============================================================

/// 세션 추적기
pub struct SessionTracker {
    config: SessionConfig,
    store: Arc<dyn KeyValueStore>,
    env: Arc<dyn HostEnvironment>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    state: Mutex<SessionState>,
    timers: Mutex<Option<TaskHandle>>,
}

impl SessionTracker {
    /// 세션 초기화: 영속 ID를 읽거나 새로 만들고, 디바이스/referrer/UTM을 채운다
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn KeyValueStore>,
        env: Arc<dyn HostEnvironment>,
        clock: Arc<dyn Clock>,
        random: &dyn RandomSource,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let now = clock.now();
        let session_id = resolve_session_id(store.as_ref(), now, random);
        let page = env.page();

        let mut utm_params = BTreeMap::new();
        for (key, value) in page.url.query_pairs() {
            if UTM_KEYS.contains(&key.as_ref()) && !value.is_empty() {
                utm_params
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }

        let record = SessionRecord {
            session_id,
            user_id: None,
            start_time: now,
            last_activity: now,
            page_views: 0,
            events: Vec::new(),
            device: env.device(),
            referrer: page.referrer,
            utm_params,
        };
        info!("세션 시작: {}", record.session_id);

        Self {
            config,
            store,
            env,
            clock,
            sink,
            state: Mutex::new(SessionState {
                record,
                hidden: false,
                idle: false,
                last_interaction: now,
                last_event_at: None,
            }),
            timers: Mutex::new(None),
        }
    }

    /// 하트비트/비활성 타이머 시작 (이미 실행 중이면 무시)
    pub fn start_timers(self: &Arc<Self>) {
        let mut timers = self.timers.lock();
        if timers.is_some() {
            return;
        }
        *timers = Some(timers::spawn_session_timers(
            Arc::downgrade(self),
            self.config.heartbeat_interval(),
            self.config.inactivity_poll(),
        ));
    }

    pub fn timers_running(&self) -> bool {
        self.timers
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_stopped())
    }

    // --------------------------------------------------------
    // 조회
    // --------------------------------------------------------

    pub fn session_id(&self) -> String {
        self.state.lock().record.session_id.clone()
    }

    pub fn page_views(&self) -> u32 {
        self.state.lock().record.page_views
    }

    pub fn activity(&self) -> ActivityState {
        self.state.lock().activity()
    }

    pub fn is_active(&self) -> bool {
        self.activity() == ActivityState::Active
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.lock().record.events.clone()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().record.events.len()
    }

    /// 현재 세션 레코드 스냅샷
    pub fn export(&self) -> SessionRecord {
        self.state.lock().record.clone()
    }

    /// 세션 요약: 상위 이벤트는 횟수 내림차순, 동률은 처음 나온 순서
    pub fn summary(&self) -> SessionSummary {
        let now = self.clock.now();
        let state = self.state.lock();

        let mut counts: Vec<EventCount> = Vec::new();
        for event in &state.record.events {
            let event_type = event.kind.type_name();
            match counts.iter_mut().find(|c| c.event_type == event_type) {
                Some(count) => count.count += 1,
                None => counts.push(EventCount {
                    event_type: event_type.to_string(),
                    count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(TOP_EVENT_LIMIT);

        SessionSummary {
            duration_ms: state.duration_ms(now),
            page_views: state.record.page_views,
            event_count: state.record.events.len(),
            is_active: state.activity() == ActivityState::Active,
            top_events: counts,
        }
    }

    // --------------------------------------------------------
    // 추적
    // --------------------------------------------------------

    /// 임의 이벤트 기록 (활동 시각은 갱신하지 않는다)
    pub fn track_event(&self, kind: SessionEventKind) {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        self.state.lock().append(kind, now, page, &self.config);
    }

    /// 페이지 조회: 조회 수 증가 후 현재 위치를 기록
    pub fn track_page_view(&self) {
        let now = self.clock.now();
        let page = self.env.page();
        let kind = SessionEventKind::PageView {
            path: page.path().to_string(),
            search: page.search(),
            hash: page.hash(),
            title: page.title.clone(),
        };

        let mut state = self.state.lock();
        state.record.page_views += 1;
        state.mark_activity(now);
        state.append(kind, now, page.path().to_string(), &self.config);
        debug!("페이지 조회: {} (누적 {})", page.path(), state.record.page_views);
    }

    /// 사용자 상호작용: 비활성 타이머를 재설정한다
    pub fn record_interaction(&self, interaction: InteractionKind) {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        let mut state = self.state.lock();
        state.mark_activity(now);
        state.append(
            SessionEventKind::Interaction { interaction },
            now,
            page,
            &self.config,
        );
    }

    /// 페이지 가시성 변경
    pub fn visibility_changed(&self, hidden: bool) {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        let mut state = self.state.lock();
        if hidden {
            state.hidden = true;
            state.append(SessionEventKind::PageHidden, now, page, &self.config);
            debug!("페이지 숨김 → 비활성");
        } else {
            state.hidden = false;
            state.mark_activity(now);
            state.append(SessionEventKind::PageVisible, now, page, &self.config);
            debug!("페이지 표시 → 활성");
        }
    }

    /// 하트비트: 활성 상태일 때만 기록하고 `true` 반환
    pub fn heartbeat(&self) -> bool {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        let event = {
            let mut state = self.state.lock();
            if state.activity() != ActivityState::Active {
                return false;
            }
            let session_duration_ms = state.duration_ms(now);
            let page_views = state.record.page_views;
            state.append(
                SessionEventKind::Heartbeat {
                    session_duration_ms,
                    page_views,
                },
                now,
                page,
                &self.config,
            );
            EventKind::SessionHeartbeat {
                session_id: state.record.session_id.clone(),
                session_duration_ms,
                page_views,
            }
        };
        self.sink.track(event.into());
        true
    }

    /// 비활성 시간 창 경과 확인: 새로 비활성이 되면 `true` 반환
    pub fn check_inactivity(&self) -> bool {
        let now = self.clock.now();
        let timeout_ms = self.config.inactivity_timeout_ms;
        let page = self.env.page().path().to_string();
        let event = {
            let mut state = self.state.lock();
            if state.activity() != ActivityState::Active {
                return false;
            }
            let idle_ms = elapsed_ms(now, state.last_interaction);
            if idle_ms < 0 || (idle_ms as u64) < timeout_ms {
                return false;
            }
            state.idle = true;
            state.append(
                SessionEventKind::SessionInactive {
                    inactivity_duration_ms: timeout_ms,
                },
                now,
                page,
                &self.config,
            );
            EventKind::SessionInactive {
                session_id: state.record.session_id.clone(),
                inactivity_duration_ms: timeout_ms,
            }
        };
        info!("세션 비활성: {timeout_ms}ms 동안 상호작용 없음");
        self.sink.track(event.into());
        true
    }

    /// 사용자 식별
    pub fn set_user_id(&self, user_id: &str) {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        let mut state = self.state.lock();
        state.record.user_id = Some(user_id.to_string());
        state.append(
            SessionEventKind::UserIdentified {
                user_id: user_id.to_string(),
            },
            now,
            page,
            &self.config,
        );
    }

    // --------------------------------------------------------
    // 종료
    // --------------------------------------------------------

    /// 페이지 언로드: 최종 요약 이벤트 후 스냅샷 저장
    pub fn page_unload(&self) {
        let now = self.clock.now();
        let page = self.env.page().path().to_string();
        let event = {
            let mut state = self.state.lock();
            let session_duration_ms = state.duration_ms(now);
            let page_views = state.record.page_views;
            let event_count = state.record.events.len();
            state.append(
                SessionEventKind::PageUnload {
                    session_duration_ms,
                    page_views,
                    event_count,
                },
                now,
                page,
                &self.config,
            );
            EventKind::SessionEnded {
                session_id: state.record.session_id.clone(),
                session_duration_ms,
                page_views,
                event_count,
            }
        };
        self.sink.track(event.into());
        self.save_or_warn();
    }

    /// 세션 스냅샷을 `session_data`에 저장
    pub fn save(&self) -> Result<(), CoreError> {
        let json = serde_json::to_string(&self.state.lock().record)?;
        self.store.set(SESSION_DATA_KEY, &json)
    }

    /// 타이머 중지 후 스냅샷 저장
    pub fn destroy(&self) {
        if let Some(handle) = self.timers.lock().take() {
            handle.stop();
        }
        self.save_or_warn();
        debug!("세션 추적기 종료: {}", self.session_id());
    }

    fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            warn!("세션 데이터 저장 실패: {e}");
        }
    }
}

/// 영속 세션 ID 조회, 없으면 `session_<millis>_<base36 9자>` 생성 후 저장
fn resolve_session_id(
    store: &dyn KeyValueStore,
    now: DateTime<Utc>,
    random: &dyn RandomSource,
) -> String {
    match store.get(SESSION_ID_KEY) {
        Ok(Some(id)) if !id.is_empty() => return id,
        Ok(_) => {}
        Err(e) => warn!("세션 ID 조회 실패, 새로 생성: {e}"),
    }

    let id = format!("session_{}_{}", now.timestamp_millis(), random.base36(9));
    if let Err(e) = store.set(SESSION_ID_KEY, &id) {
        warn!("세션 ID 저장 실패: {e}");
    }
    id
}
