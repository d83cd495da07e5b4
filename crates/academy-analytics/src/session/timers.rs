//! 세션 주기 타이머.
//!
//! 하트비트와 비활성 감지를 각각 독립 태스크로 돌린다.
//! 태스크는 추적기를 `Weak`로 잡으므로 추적기가 drop되면 스스로 끝난다.

use std::sync::Weak;
use std::time::Duration;

use academy_core::handle::{wait_for_shutdown, TaskHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::tracker::SessionTracker;

/// 0 주기로 `interval`을 만들 수 없으므로 하한을 둔다
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// 하트비트 / 비활성 폴링 태스크 시작
pub(crate) fn spawn_session_timers(
    tracker: Weak<SessionTracker>,
    heartbeat_interval: Duration,
    inactivity_poll: Duration,
) -> TaskHandle {
    let mut handle = TaskHandle::new("session-timers");
    spawn_ticker(&mut handle, tracker.clone(), heartbeat_interval, |t| {
        t.heartbeat();
    });
    spawn_ticker(&mut handle, tracker, inactivity_poll, |t| {
        t.check_inactivity();
    });
    handle
}

fn spawn_ticker<F>(
    handle: &mut TaskHandle,
    tracker: Weak<SessionTracker>,
    period: Duration,
    tick: F,
) where
    F: Fn(&SessionTracker) + Send + 'static,
{
    let period = period.max(MIN_PERIOD);
    let mut shutdown_rx = handle.shutdown_rx();

    handle.push(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
                _ = ticker.tick() => {
                    let Some(tracker) = tracker.upgrade() else {
                        break;
                    };
                    tick(&tracker);
                }
            }
        }
    }));
}
