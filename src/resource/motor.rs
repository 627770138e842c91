//! In-memory motor used by tests and the demo host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Motor;
use crate::error::{Result, StartStopError};

/// A movement recorded by `SimulatedMotor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCall {
    GoTo { rpm: f64, position: f64 },
    GoFor { rpm: f64, revolutions: f64 },
}

/// Motor that tracks its position in memory.
///
/// Each movement sleeps `ms_per_revolution` for every revolution travelled,
/// so loops driving it suspend the way they would against real hardware.
#[derive(Debug)]
pub struct SimulatedMotor {
    name: String,
    position: Mutex<f64>,
    history: Mutex<Vec<MotorCall>>,
    ms_per_revolution: u64,
    fail_after: Option<usize>,
    moves: AtomicUsize,
}

impl SimulatedMotor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Mutex::new(0.0),
            history: Mutex::new(Vec::new()),
            ms_per_revolution: 0,
            fail_after: None,
            moves: AtomicUsize::new(0),
        }
    }

    /// Simulated travel time per revolution.
    pub fn with_ms_per_revolution(mut self, ms: u64) -> Self {
        self.ms_per_revolution = ms;
        self
    }

    /// Start at a position other than home.
    pub fn with_position(self, position: f64) -> Self {
        *self.position.lock() = position;
        self
    }

    /// Fail every movement after the first `moves` succeed.
    pub fn failing_after(mut self, moves: usize) -> Self {
        self.fail_after = Some(moves);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> f64 {
        *self.position.lock()
    }

    pub fn history(&self) -> Vec<MotorCall> {
        self.history.lock().clone()
    }

    fn check_move(&self, rpm: f64) -> Result<()> {
        if rpm == 0.0 || !rpm.is_finite() {
            return Err(StartStopError::Actuator(format!(
                "{}: rpm must be a non-zero number, got {}",
                self.name, rpm
            )));
        }
        let done = self.moves.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if done >= limit {
                return Err(StartStopError::Actuator(format!("{}: simulated fault", self.name)));
            }
        }
        Ok(())
    }

    async fn travel(&self, revolutions: f64) {
        if self.ms_per_revolution > 0 {
            let ms = (revolutions.abs() * self.ms_per_revolution as f64) as u64;
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl Motor for SimulatedMotor {
    async fn get_position(&self) -> Result<f64> {
        Ok(self.position())
    }

    async fn go_to(&self, rpm: f64, position_revolutions: f64) -> Result<()> {
        self.check_move(rpm)?;
        let distance = position_revolutions - self.position();
        self.travel(distance).await;
        *self.position.lock() = position_revolutions;
        self.history.lock().push(MotorCall::GoTo {
            rpm,
            position: position_revolutions,
        });
        Ok(())
    }

    async fn go_for(&self, rpm: f64, revolutions: f64) -> Result<()> {
        self.check_move(rpm)?;
        self.travel(revolutions).await;
        *self.position.lock() += revolutions;
        self.history.lock().push(MotorCall::GoFor { rpm, revolutions });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_go_for_moves_relative() {
        let motor = SimulatedMotor::new("m");
        motor.go_for(10.0, 2.0).await.unwrap();
        motor.go_for(10.0, -0.5).await.unwrap();
        assert_eq!(motor.get_position().await.unwrap(), 1.5);
        assert_eq!(motor.history().len(), 2);
    }

    #[tokio::test]
    async fn test_go_to_moves_absolute() {
        let motor = SimulatedMotor::new("m").with_position(3.0);
        motor.go_to(5.0, 0.0).await.unwrap();
        assert_eq!(motor.position(), 0.0);
        assert_eq!(motor.history(), vec![MotorCall::GoTo { rpm: 5.0, position: 0.0 }]);
    }

    #[tokio::test]
    async fn test_zero_rpm_rejected() {
        let motor = SimulatedMotor::new("m");
        let err = motor.go_for(0.0, 1.0).await.unwrap_err();
        assert!(matches!(err, StartStopError::Actuator(_)));
        assert!(motor.history().is_empty());
    }

    #[tokio::test]
    async fn test_failing_after() {
        let motor = SimulatedMotor::new("m").failing_after(1);
        motor.go_for(10.0, 1.0).await.unwrap();
        assert!(motor.go_for(10.0, -1.0).await.is_err());
        assert_eq!(motor.position(), 1.0);
    }

    #[tokio::test]
    async fn test_travel_time_scales_with_distance() {
        let motor = SimulatedMotor::new("m").with_ms_per_revolution(20);
        let start = tokio::time::Instant::now();
        motor.go_for(10.0, -3.0).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
