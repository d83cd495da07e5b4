//! 대형 리소스 / 롱태스크 감시.

use academy_core::config::MonitorConfig;
use academy_core::handle::{wait_for_shutdown, TaskHandle};
use academy_core::models::event::EventKind;
use academy_core::models::vitals::{EntryDetail, EntryType, PerformanceEntry};
use academy_core::ports::analytics::EventSink;
use academy_core::ports::performance::PerformanceSource;
use std::sync::Arc;
use tracing::{debug, warn};

/// 전송 크기가 임계값을 넘는 리소스면 이벤트 생성
pub fn large_resource_event(entry: &PerformanceEntry, threshold_bytes: u64) -> Option<EventKind> {
    match &entry.detail {
        EntryDetail::Resource {
            transfer_size,
            initiator_type,
        } if *transfer_size > threshold_bytes => Some(EventKind::LargeResourceDetected {
            url: entry.name.clone(),
            size: *transfer_size,
            resource_type: initiator_type.clone(),
        }),
        _ => None,
    }
}

/// 지속 시간이 임계값을 넘는 태스크면 이벤트 생성
pub fn long_task_event(entry: &PerformanceEntry, threshold_ms: f64) -> Option<EventKind> {
    (entry.duration > threshold_ms).then(|| EventKind::LongTask {
        duration: entry.duration,
        start_time: entry.start_time,
    })
}

/// 리소스/롱태스크 감시기
pub struct ResourceWatcher {
    source: Arc<dyn PerformanceSource>,
    sink: Arc<dyn EventSink>,
    config: MonitorConfig,
}

impl ResourceWatcher {
    pub fn new(
        source: Arc<dyn PerformanceSource>,
        sink: Arc<dyn EventSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    /// 감시 시작: 롱태스크 채널은 지원될 때만 구독
    pub fn start(&self) -> TaskHandle {
        let mut handle = TaskHandle::new("resource-watcher");
        let capabilities = self.source.capabilities();

        for entry_type in [EntryType::Resource, EntryType::LongTask] {
            if !capabilities.supports(entry_type) {
                debug!("관찰 채널 미지원, 비활성화: {entry_type}");
                continue;
            }
            let mut stream = match self.source.observe(entry_type) {
                Ok(stream) => stream,
                Err(e) => {
                    debug!("관찰 채널 구독 실패, 비활성화: {entry_type}: {e}");
                    continue;
                }
            };

            let mut shutdown_rx = handle.shutdown_rx();
            let sink = self.sink.clone();
            let config = self.config;

            handle.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = wait_for_shutdown(&mut shutdown_rx) => break,
                        batch = stream.recv() => match batch {
                            Some(entries) => {
                                for entry in &entries {
                                    if let Some(kind) = classify_entry(entry, &config) {
                                        sink.track(kind.into());
                                    }
                                }
                            }
                            None => break,
                        },
                    }
                }
            }));
        }

        handle
    }
}

fn classify_entry(entry: &PerformanceEntry, config: &MonitorConfig) -> Option<EventKind> {
    match entry.entry_type {
        EntryType::Resource => {
            let kind = large_resource_event(entry, config.large_resource_bytes)?;
            if let EventKind::LargeResourceDetected { size, .. } = &kind {
                warn!(
                    "대형 리소스 감지: {} ({:.2}KB)",
                    entry.name,
                    *size as f64 / 1024.0
                );
            }
            Some(kind)
        }
        EntryType::LongTask => {
            let kind = long_task_event(entry, config.long_task_ms)?;
            warn!("롱태스크 감지: {}ms", entry.duration);
            Some(kind)
        }
        _ => None,
    }
}
