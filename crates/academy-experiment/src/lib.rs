//! # academy-experiment
//!
//! A/B 실험 관리.
//! 실험 정의를 보관하고 `(testId, userId)` 단위로 가중치 랜덤 배정을 한 뒤
//! 같은 키에는 항상 같은 변형을 돌려준다. 배정/전환은 `EventSink`로 기록한다.
//!
//! ## 모듈
//! - `registry`: `AbTestRegistry`, `ExperimentView`
//! - `store`: 고정 배정 저장소 (메모리, 선택적으로 키-값 저장소에 기록)

pub mod registry;
pub mod store;
