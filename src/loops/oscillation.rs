//! MotorRevolutionsOscillation - drives a motor back and forth forever.
//!
//! Each iteration: wait, run `revolutions` forward, wait, run the same
//! distance in reverse. With `home_on_start` the motor is returned to
//! position 0 once per run before the first cycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ResourceConfig;
use crate::error::{Result, StartStopError};
use crate::manager::LoopService;
use crate::resource::{Dependencies, Motor};
use crate::runner::LoopBody;

#[derive(Clone)]
pub struct MotorRevolutionsOscillation {
    motor_name: String,
    motor: Arc<dyn Motor>,
    rpm: f64,
    revolutions: f64,
    secs_between_loop: u64,
    secs_between_reverse: u64,
    home_on_start: bool,
    // Per run; a fresh clone starts unhomed.
    homed: bool,
}

impl std::fmt::Debug for MotorRevolutionsOscillation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorRevolutionsOscillation")
            .field("motor", &self.motor_name)
            .field("rpm", &self.rpm)
            .field("revolutions", &self.revolutions)
            .field("secs_between_loop", &self.secs_between_loop)
            .field("secs_between_reverse", &self.secs_between_reverse)
            .field("home_on_start", &self.home_on_start)
            .finish()
    }
}

impl MotorRevolutionsOscillation {
    pub fn motor_name(&self) -> &str {
        &self.motor_name
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    pub fn revolutions(&self) -> f64 {
        self.revolutions
    }

    pub fn secs_between_loop(&self) -> u64 {
        self.secs_between_loop
    }

    pub fn secs_between_reverse(&self) -> u64 {
        self.secs_between_reverse
    }

    pub fn home_on_start(&self) -> bool {
        self.home_on_start
    }

    async fn home(&mut self) -> Result<()> {
        let position = self.motor.get_position().await?;
        if position != 0.0 {
            log::info!("homing motor {} to position 0...", self.motor_name);
            self.motor.go_to(self.rpm, 0.0).await?;
        }
        self.homed = true;
        Ok(())
    }
}

async fn pause(secs: u64) {
    if secs > 0 {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

fn non_negative_secs(config: &ResourceConfig, key: &str) -> Result<u64> {
    let secs = config.optional_i64(key, 0)?;
    u64::try_from(secs).map_err(|_| StartStopError::InvalidAttribute {
        name: key.to_string(),
        expected: "non-negative integer",
    })
}

#[async_trait]
impl LoopBody for MotorRevolutionsOscillation {
    async fn iterate(&mut self) -> Result<()> {
        if self.home_on_start && !self.homed {
            self.home().await?;
        }

        pause(self.secs_between_loop).await;
        log::info!("moving forward");
        self.motor.go_for(self.rpm, self.revolutions).await?;

        pause(self.secs_between_reverse).await;
        log::info!("moving backward");
        self.motor.go_for(self.rpm, -self.revolutions).await?;
        Ok(())
    }
}

impl LoopService for MotorRevolutionsOscillation {
    const MODEL: &'static str = "michaellee1019:kinetic-art-service:motor-revolutions-oscillation";

    fn validate_config(config: &ResourceConfig) -> Result<()> {
        log::debug!("validating config for {}", config.name);
        if !config.has_attribute("rpm") || !config.has_attribute("revolutions") {
            return Err(StartStopError::Config(
                "rpm and revolutions attributes are required for motor-revolutions-oscillation".to_string(),
            ));
        }
        Ok(())
    }

    fn from_config(config: &ResourceConfig, dependencies: &Dependencies) -> Result<Self> {
        let (motor_name, motor) = dependencies.single_motor()?;

        Ok(Self {
            motor_name,
            motor,
            rpm: config.require_f64("rpm")?,
            revolutions: config.require_f64("revolutions")?,
            secs_between_loop: non_negative_secs(config, "secs_between_loop")?,
            secs_between_reverse: non_negative_secs(config, "secs_between_reverse")?,
            home_on_start: config.optional_bool("home_on_start", true)?,
            homed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{MotorCall, Resource, SimulatedMotor};

    fn config() -> ResourceConfig {
        ResourceConfig::new("osc", MotorRevolutionsOscillation::MODEL)
            .with_attribute("rpm", 10)
            .with_attribute("revolutions", 1)
    }

    fn deps(motor: Arc<SimulatedMotor>) -> Dependencies {
        Dependencies::new().with("motor1", Resource::Motor(motor))
    }

    #[test]
    fn test_validate_requires_rpm_and_revolutions() {
        assert!(MotorRevolutionsOscillation::validate_config(&config()).is_ok());

        let missing = ResourceConfig::new("osc", "").with_attribute("rpm", 10);
        let err = MotorRevolutionsOscillation::validate_config(&missing).unwrap_err();
        assert!(err.to_string().contains("rpm and revolutions"));
    }

    #[test]
    fn test_defaults() {
        let service =
            MotorRevolutionsOscillation::from_config(&config(), &deps(Arc::new(SimulatedMotor::new("m")))).unwrap();
        assert_eq!(service.rpm(), 10.0);
        assert_eq!(service.revolutions(), 1.0);
        assert_eq!(service.secs_between_loop(), 0);
        assert_eq!(service.secs_between_reverse(), 0);
        assert!(service.home_on_start());
        assert_eq!(service.motor_name(), "motor1");
    }

    #[test]
    fn test_negative_delay_rejected() {
        let cfg = config().with_attribute("secs_between_loop", -2);
        let err =
            MotorRevolutionsOscillation::from_config(&cfg, &deps(Arc::new(SimulatedMotor::new("m")))).unwrap_err();
        assert!(matches!(err, StartStopError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_wrong_dependency_rejected() {
        let camera = Dependencies::new().with(
            "cam",
            Resource::Other {
                subtype: "rdk:component:camera".to_string(),
            },
        );
        let err = MotorRevolutionsOscillation::from_config(&config(), &camera).unwrap_err();
        assert!(matches!(err, StartStopError::Dependency(_)));
    }

    #[tokio::test]
    async fn test_iteration_forward_then_reverse() {
        let motor = Arc::new(SimulatedMotor::new("m"));
        let mut service = MotorRevolutionsOscillation::from_config(&config(), &deps(motor.clone())).unwrap();

        service.iterate().await.unwrap();

        assert_eq!(
            motor.history(),
            vec![
                MotorCall::GoFor {
                    rpm: 10.0,
                    revolutions: 1.0
                },
                MotorCall::GoFor {
                    rpm: 10.0,
                    revolutions: -1.0
                },
            ]
        );
        assert_eq!(motor.position(), 0.0);
    }

    #[tokio::test]
    async fn test_homes_once_per_run() {
        let motor = Arc::new(SimulatedMotor::new("m").with_position(2.5));
        let configured = MotorRevolutionsOscillation::from_config(&config(), &deps(motor.clone())).unwrap();

        let mut run = configured.clone();
        run.iterate().await.unwrap();
        run.iterate().await.unwrap();

        let homes = motor
            .history()
            .iter()
            .filter(|c| matches!(c, MotorCall::GoTo { .. }))
            .count();
        assert_eq!(homes, 1);
        assert_eq!(motor.history()[0], MotorCall::GoTo { rpm: 10.0, position: 0.0 });
    }

    #[tokio::test]
    async fn test_home_on_start_disabled() {
        let motor = Arc::new(SimulatedMotor::new("m").with_position(2.5));
        let cfg = config().with_attribute("home_on_start", false);
        let mut service = MotorRevolutionsOscillation::from_config(&cfg, &deps(motor.clone())).unwrap();

        service.iterate().await.unwrap();
        assert!(
            motor
                .history()
                .iter()
                .all(|c| matches!(c, MotorCall::GoFor { .. }))
        );
        assert_eq!(motor.position(), 2.5);
    }

    #[tokio::test]
    async fn test_motor_failure_propagates() {
        let motor = Arc::new(SimulatedMotor::new("m").failing_after(1));
        let mut service = MotorRevolutionsOscillation::from_config(&config(), &deps(motor.clone())).unwrap();

        let err = service.iterate().await.unwrap_err();
        assert!(matches!(err, StartStopError::Actuator(_)));
    }
}
