use std::time::Duration;
use thiserror::Error;

/// 既定のワーカー数
pub const DEFAULT_WORKER_COUNT: usize = 5;
/// 既定の予約キュー容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// 既定の予約保持期間（秒）
pub const DEFAULT_HOLD_SECS: u64 = 5;
/// 既定のHTTPポート
pub const DEFAULT_PORT: u16 = 3000;

/// 設定エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 数値として解釈できない
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    /// 0は許可されない
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}

/// 予約サブシステムの設定
///
/// 起動時に一度だけ決まり、実行中には変更されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationConfig {
    /// ワーカー数（正確にこの数だけ起動する）
    pub worker_count: usize,
    /// 予約キューの容量（満杯時、送信側は空きが出るまで待つ）
    pub queue_capacity: usize,
    /// 確定されない予約が自動的に解除されるまでの時間
    pub hold_duration: Duration,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            hold_duration: Duration::from_secs(DEFAULT_HOLD_SECS),
        }
    }
}

impl ReservationConfig {
    /// 値を検証する
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::MustBePositive("RESERVATION_WORKERS"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::MustBePositive("RESERVATION_QUEUE_CAPACITY"));
        }
        Ok(self)
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub reservation: ReservationConfig,
}

impl AppConfig {
    /// 環境変数から読み込む
    ///
    /// - `PORT`（既定: 3000）
    /// - `RESERVATION_WORKERS`（既定: 5）
    /// - `RESERVATION_QUEUE_CAPACITY`（既定: 100）
    /// - `RESERVATION_HOLD_SECS`（既定: 5）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む（テスト用に環境変数から切り離している）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let reservation = ReservationConfig {
            worker_count: parse_or(&lookup, "RESERVATION_WORKERS", DEFAULT_WORKER_COUNT)?,
            queue_capacity: parse_or(&lookup, "RESERVATION_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            hold_duration: Duration::from_secs(parse_or(
                &lookup,
                "RESERVATION_HOLD_SECS",
                DEFAULT_HOLD_SECS,
            )?),
        }
        .validate()?;

        Ok(Self { port, reservation })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.reservation, ReservationConfig::default());
        assert_eq!(config.reservation.worker_count, 5);
        assert_eq!(config.reservation.hold_duration, Duration::from_secs(5));
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("RESERVATION_WORKERS", "3"),
            ("RESERVATION_QUEUE_CAPACITY", "10"),
            ("RESERVATION_HOLD_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.reservation.worker_count, 3);
        assert_eq!(config.reservation.queue_capacity, 10);
        assert_eq!(config.reservation.hold_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("RESERVATION_WORKERS", "0")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MustBePositive("RESERVATION_WORKERS")
        );
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("RESERVATION_QUEUE_CAPACITY", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("RESERVATION_HOLD_SECS", "five")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidNumber {
                name: "RESERVATION_HOLD_SECS",
                value: "five".to_string()
            }
        );
    }
}
