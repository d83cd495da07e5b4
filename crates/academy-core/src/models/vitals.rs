//! Web Vitals 모델.
//!
//! 브라우저 성능 관찰 채널의 원시 엔트리와, 정규화된 지표 레코드를 정의.

use serde::{Deserialize, Serialize};

/// Web Vitals 지표 이름
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricName {
    /// Largest Contentful Paint
    Lcp,
    /// First Input Delay
    Fid,
    /// Cumulative Layout Shift
    Cls,
    /// First Contentful Paint
    Fcp,
    /// Time To First Byte
    Ttfb,
}

impl MetricName {
    /// 모든 지표 (선언 순서)
    pub const ALL: [MetricName; 5] = [
        MetricName::Lcp,
        MetricName::Fid,
        MetricName::Cls,
        MetricName::Fcp,
        MetricName::Ttfb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Lcp => "LCP",
            MetricName::Fid => "FID",
            MetricName::Cls => "CLS",
            MetricName::Fcp => "FCP",
            MetricName::Ttfb => "TTFB",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 3단계 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Good => write!(f, "good"),
            Rating::NeedsImprovement => write!(f, "needs-improvement"),
            Rating::Poor => write!(f, "poor"),
        }
    }
}

/// 등급 임계값 쌍 (`good < poor`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// 이 값 이하이면 good
    pub good: f64,
    /// 이 값 초과이면 poor
    pub poor: f64,
}

impl Thresholds {
    pub const fn new(good: f64, poor: f64) -> Self {
        Self { good, poor }
    }
}

/// 정규화된 Web Vitals 지표 레코드.
///
/// `rating`은 항상 `value`와 해당 지표 임계값에서 유도된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub name: MetricName,
    pub value: f64,
    pub rating: Rating,
    pub delta: f64,
    /// 이 값을 만든 원시 엔트리
    #[serde(default)]
    pub entries: Vec<PerformanceEntry>,
}

/// 성능 관찰 채널 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    LargestContentfulPaint,
    FirstInput,
    LayoutShift,
    Paint,
    Resource,
    #[serde(rename = "longtask")]
    LongTask,
    Navigation,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::LargestContentfulPaint => "largest-contentful-paint",
            EntryType::FirstInput => "first-input",
            EntryType::LayoutShift => "layout-shift",
            EntryType::Paint => "paint",
            EntryType::Resource => "resource",
            EntryType::LongTask => "longtask",
            EntryType::Navigation => "navigation",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 원시 성능 엔트리 (PerformanceEntry 대응)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub entry_type: EntryType,
    /// 엔트리 이름 (paint: "first-contentful-paint", resource: URL 등)
    #[serde(default)]
    pub name: String,
    /// 시작 시각 (time origin 기준 밀리초)
    #[serde(default)]
    pub start_time: f64,
    /// 지속 시간 (밀리초)
    #[serde(default)]
    pub duration: f64,
    /// 엔트리 종류별 추가 필드
    #[serde(default)]
    pub detail: EntryDetail,
}

impl PerformanceEntry {
    /// 추가 필드 없는 엔트리 생성
    pub fn new(entry_type: EntryType, name: impl Into<String>, start_time: f64) -> Self {
        Self {
            entry_type,
            name: name.into(),
            start_time,
            duration: 0.0,
            detail: EntryDetail::None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_detail(mut self, detail: EntryDetail) -> Self {
        self.detail = detail;
        self
    }
}

/// 엔트리 종류별 상세 필드
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDetail {
    #[default]
    None,
    /// first-input: 이벤트 처리 시작 시각
    FirstInput { processing_start: f64 },
    /// layout-shift: 이동 점수와 최근 사용자 입력 여부
    LayoutShift { value: f64, had_recent_input: bool },
    /// resource: 전송 크기와 initiator 종류 (img, script 등)
    Resource {
        transfer_size: u64,
        initiator_type: String,
    },
}

/// 내비게이션 타이밍 레코드 (time origin 기준 밀리초)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub fetch_start: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub load_event_end: f64,
}

impl NavigationTiming {
    /// TTFB (responseStart − requestStart)
    pub fn time_to_first_byte(&self) -> f64 {
        self.response_start - self.request_start
    }

    /// 페이지 로드 시간 (loadEventEnd − fetchStart)
    pub fn load_time(&self) -> f64 {
        self.load_event_end - self.fetch_start
    }
}

/// JS 힙 메모리 정보 (지원 브라우저 한정)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub used_js_heap_size: u64,
    pub total_js_heap_size: u64,
}

impl MemoryInfo {
    /// 사용률 (%): 전체 크기가 0이면 0
    pub fn usage_percent(&self) -> f64 {
        if self.total_js_heap_size == 0 {
            return 0.0;
        }
        self.used_js_heap_size as f64 / self.total_js_heap_size as f64 * 100.0
    }
}
