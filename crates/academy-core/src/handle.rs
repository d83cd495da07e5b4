//! 장기 구독 핸들.
//!
//! 관찰 채널 구독과 주기 타이머를 명시적으로 중지할 수 있게 묶는다.
//! `watch` 채널로 종료 신호를 보내고, 핸들이 drop되면 같은 신호를 보낸다.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// 백그라운드 태스크 묶음의 시작/중지 핸들
#[derive(Debug)]
pub struct TaskHandle {
    label: &'static str,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl TaskHandle {
    /// 빈 핸들 생성
    pub fn new(label: &'static str) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            label,
            shutdown_tx,
            tasks: Vec::new(),
        }
    }

    /// 태스크가 `select!`로 기다릴 종료 수신기
    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 태스크 등록
    pub fn push(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// 등록된 태스크 수
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 종료 신호 발송 (멱등)
    pub fn stop(&self) {
        if !*self.shutdown_tx.borrow() {
            debug!("구독 중지: {}", self.label);
        }
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// 모든 태스크가 끝났는지
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|t| t.is_finished())
    }

    /// 종료 신호 후 모든 태스크 대기
    pub async fn shutdown(mut self) {
        self.stop();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// 종료 신호가 올 때까지 대기 (이미 켜져 있으면 즉시 반환)
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}
