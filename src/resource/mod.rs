//! External capabilities a loop service can depend on.
//!
//! Dependencies are handed to `reconfigure` as a name → `Resource` map. A
//! resource carries its capability in the enum variant so services can check
//! for the right kind of handle before accepting a configuration.

mod motor;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, StartStopError};

pub use motor::{MotorCall, SimulatedMotor};

/// Subtype string reported by motor resources.
pub const MOTOR_SUBTYPE: &str = "rdk:component:motor";

/// Rotational actuator capability.
#[async_trait]
pub trait Motor: Send + Sync {
    /// Current position in revolutions from home.
    async fn get_position(&self) -> Result<f64>;

    /// Move to an absolute position at the given speed.
    async fn go_to(&self, rpm: f64, position_revolutions: f64) -> Result<()>;

    /// Move a relative number of revolutions at the given speed. Negative
    /// revolutions run in reverse.
    async fn go_for(&self, rpm: f64, revolutions: f64) -> Result<()>;
}

/// Handle on an external capability.
#[derive(Clone)]
pub enum Resource {
    Motor(Arc<dyn Motor>),
    /// Any capability this crate has no typed interface for.
    Other { subtype: String },
}

impl Resource {
    pub fn motor(motor: impl Motor + 'static) -> Self {
        Resource::Motor(Arc::new(motor))
    }

    pub fn subtype(&self) -> &str {
        match self {
            Resource::Motor(_) => MOTOR_SUBTYPE,
            Resource::Other { subtype } => subtype,
        }
    }

    pub fn as_motor(&self) -> Option<Arc<dyn Motor>> {
        match self {
            Resource::Motor(m) => Some(Arc::clone(m)),
            Resource::Other { .. } => None,
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("subtype", &self.subtype()).finish()
    }
}

/// Dependencies supplied to a service at reconfigure time.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    resources: BTreeMap<String, Resource>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, resource: Resource) -> Self {
        self.insert(name, resource);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, resource: Resource) {
        self.resources.insert(name.into(), resource);
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// The single motor dependency.
    ///
    /// Fails unless exactly one dependency was supplied and it is a motor.
    pub fn single_motor(&self) -> Result<(String, Arc<dyn Motor>)> {
        let mut iter = self.resources.iter();
        let (name, resource) = match (iter.next(), iter.next()) {
            (Some(only), None) => only,
            (None, _) => {
                return Err(StartStopError::Dependency(
                    "a motor is required as the only dependency, none supplied".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(StartStopError::Dependency(format!(
                    "exactly one motor dependency is required, got {}",
                    self.resources.len()
                )));
            }
        };
        let motor = resource.as_motor().ok_or_else(|| {
            StartStopError::Dependency(format!(
                "dependency '{}' is a {}, expected {}",
                name,
                resource.subtype(),
                MOTOR_SUBTYPE
            ))
        })?;
        Ok((name.clone(), motor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_subtype() {
        let motor = Resource::motor(SimulatedMotor::new("m1"));
        assert_eq!(motor.subtype(), MOTOR_SUBTYPE);
        assert!(motor.as_motor().is_some());

        let camera = Resource::Other {
            subtype: "rdk:component:camera".to_string(),
        };
        assert_eq!(camera.subtype(), "rdk:component:camera");
        assert!(camera.as_motor().is_none());
    }

    #[test]
    fn test_single_motor_ok() {
        let deps = Dependencies::new().with("m1", Resource::motor(SimulatedMotor::new("m1")));
        let (name, _motor) = deps.single_motor().unwrap();
        assert_eq!(name, "m1");
    }

    #[test]
    fn test_single_motor_none() {
        let err = Dependencies::new().single_motor().err().expect("expected error");
        assert!(matches!(err, StartStopError::Dependency(_)));
    }

    #[test]
    fn test_single_motor_wrong_capability() {
        let deps = Dependencies::new().with(
            "cam",
            Resource::Other {
                subtype: "rdk:component:camera".to_string(),
            },
        );
        let err = deps.single_motor().err().expect("expected error");
        assert!(err.to_string().contains("cam"));
        assert!(err.to_string().contains(MOTOR_SUBTYPE));
    }

    #[test]
    fn test_single_motor_too_many() {
        let deps = Dependencies::new()
            .with("m1", Resource::motor(SimulatedMotor::new("m1")))
            .with("m2", Resource::motor(SimulatedMotor::new("m2")));
        let err = deps.single_motor().err().expect("expected error");
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_names_sorted() {
        let deps = Dependencies::new()
            .with("b", Resource::motor(SimulatedMotor::new("b")))
            .with("a", Resource::motor(SimulatedMotor::new("a")));
        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(deps.len(), 2);
        assert!(!deps.is_empty());
    }
}
