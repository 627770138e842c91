//! ExampleService - a loop that only logs.
//!
//! Useful as a template for new services and as a smoke test for a host.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ResourceConfig;
use crate::error::{Result, StartStopError};
use crate::manager::LoopService;
use crate::resource::Dependencies;
use crate::runner::LoopBody;

/// Seconds to wait per iteration when `interval_secs` is not set.
const DEFAULT_INTERVAL_SECS: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ExampleService {
    name: String,
    interval: Duration,
}

impl ExampleService {
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl LoopBody for ExampleService {
    async fn iterate(&mut self) -> Result<()> {
        log::info!("{}: on_loop called", self.name);
        tokio::time::sleep(self.interval).await;
        Ok(())
    }
}

impl LoopService for ExampleService {
    const MODEL: &'static str = "michaellee1019:startstopservice:example";

    fn from_config(config: &ResourceConfig, _dependencies: &Dependencies) -> Result<Self> {
        let secs = config.optional_f64("interval_secs", DEFAULT_INTERVAL_SECS)?;
        if !(secs >= 0.0 && secs.is_finite()) {
            return Err(StartStopError::InvalidAttribute {
                name: "interval_secs".to_string(),
                expected: "non-negative number",
            });
        }
        Ok(Self {
            name: config.name.clone(),
            interval: Duration::from_secs_f64(secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        let service =
            ExampleService::from_config(&ResourceConfig::new("ex", ExampleService::MODEL), &Dependencies::new())
                .unwrap();
        assert_eq!(service.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_negative_interval_rejected() {
        let config = ResourceConfig::new("ex", ExampleService::MODEL).with_attribute("interval_secs", -1);
        assert!(ExampleService::from_config(&config, &Dependencies::new()).is_err());
    }

    #[tokio::test]
    async fn test_iterate_waits_interval() {
        let config = ResourceConfig::new("ex", ExampleService::MODEL).with_attribute("interval_secs", 0.02);
        let mut service = ExampleService::from_config(&config, &Dependencies::new()).unwrap();

        let start = tokio::time::Instant::now();
        service.iterate().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
