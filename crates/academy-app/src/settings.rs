//! 설정 레이어링.
//!
//! 설정 파일(`ConfigManager`)에서 읽은 값을 기본 레이어로 두고,
//! `ACADEMY__SECTION__KEY` 형식의 환경변수를 그 위에 얹는다.
//! 예: `ACADEMY__ENVIRONMENT=production`, `ACADEMY__SESSION__MAX_EVENTS=2000`.

use std::collections::HashMap;

use academy_core::config::AppConfig;
use academy_core::error::CoreError;
use config::{Config, Environment};
use serde_json::Value;
use tracing::debug;

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "ACADEMY";
/// 섹션 구분자
pub const ENV_SEPARATOR: &str = "__";

/// 프로세스 환경변수로 오버라이드
pub fn apply_env_overrides(base: &AppConfig) -> Result<AppConfig, CoreError> {
    layer(base, None)
}

/// 주어진 변수 맵으로 오버라이드 (테스트/임베딩용)
pub fn apply_overrides(
    base: &AppConfig,
    vars: HashMap<String, String>,
) -> Result<AppConfig, CoreError> {
    layer(base, Some(vars))
}

fn layer(base: &AppConfig, vars: Option<HashMap<String, String>>) -> Result<AppConfig, CoreError> {
    let overrides: Value = Config::builder()
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(vars),
        )
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|e| CoreError::Config(format!("환경변수 설정 읽기 실패: {e}")))?;

    // 파일 레이어는 serde 이름(camelCase 포함)을 그대로 유지해야 하므로 JSON 트리에서 병합
    let mut merged = serde_json::to_value(base)?;
    merge(&mut merged, overrides);

    let config: AppConfig = serde_json::from_value(merged)
        .map_err(|e| CoreError::Config(format!("설정 역직렬화 실패: {e}")))?;
    debug!("환경변수 오버라이드 적용 완료 (environment={:?})", config.environment);
    Ok(config)
}

/// `overlay`의 리프 값으로 `target`을 덮어쓴다
fn merge(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
