use libraview_checkin::CheckInPolicy;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub hold: HoldRules,
    #[serde(default)]
    pub checkin: CheckInRules,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HoldRules {
    #[serde(default = "default_hold_minutes")]
    pub hold_minutes: i64,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl HoldRules {
    pub fn hold_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.hold_minutes)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Default for HoldRules {
    fn default() -> Self {
        Self {
            hold_minutes: default_hold_minutes(),
            tick_millis: default_tick_millis(),
        }
    }
}

fn default_hold_minutes() -> i64 { 15 }
fn default_tick_millis() -> u64 { 1000 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CheckInRules {
    #[serde(default)]
    pub policy: CheckInPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self { id: default_user_id() }
    }
}

fn default_user_id() -> String { "student".to_string() }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/test.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `LIBRAVIEW_HOLD__HOLD_MINUTES=5`
            .add_source(config::Environment::with_prefix("LIBRAVIEW").prefix_separator("_").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the hold timer cannot run with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.hold.hold_minutes <= 0 {
            return Err(config::ConfigError::Message(format!(
                "hold.hold_minutes must be positive, got {}",
                self.hold.hold_minutes
            )));
        }
        if self.hold.tick_millis == 0 {
            return Err(config::ConfigError::Message("hold.tick_millis must be positive".to_string()));
        }
        Ok(())
    }
}
