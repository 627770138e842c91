//! Line-oriented requests for a running host
//!
//! Grammar, one request per line:
//! - `list` - status of every service
//! - `<service> <json-object>` - forward the object to the service's
//!   `do_command`, e.g. `oscillator {"stop": true}`
//!
//! Blank lines and lines starting with `#` are ignored.

use serde_json::{Map, Value, json};

use super::context::ServiceHost;
use crate::error::{Result, StartStopError};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    List,
    Command { service: String, command: Map<String, Value> },
}

impl Request {
    /// Parse one input line. `Ok(None)` means there was nothing to do.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if line == "list" {
            return Ok(Some(Request::List));
        }

        let (service, body) = match line.split_once(char::is_whitespace) {
            Some((service, body)) => (service, body.trim()),
            None => {
                return Err(StartStopError::Config(format!(
                    "expected '<service> <json-object>' or 'list', got '{}'",
                    line
                )));
            }
        };

        match serde_json::from_str::<Value>(body)? {
            Value::Object(command) => Ok(Some(Request::Command {
                service: service.to_string(),
                command,
            })),
            other => Err(StartStopError::Config(format!("command must be a JSON object, got {}", other))),
        }
    }
}

/// Execute a request against the host. Controller calls block, so run this
/// off the async executor.
pub fn handle_request(host: &ServiceHost, request: Request) -> Result<Value> {
    match request {
        Request::List => Ok(serde_json::to_value(host.summaries())?),
        Request::Command { service, command } => {
            let target = host
                .service(&service)
                .ok_or_else(|| StartStopError::Config(format!("unknown service '{}'", service)))?;
            let result = target.do_command(&command);
            Ok(json!({ "service": service, "result": result, "status": target.status() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostConfig, ResourceConfig};
    use crate::loops::ExampleService;
    use crate::manager::LoopService;

    fn host() -> ServiceHost {
        let config = HostConfig {
            services: vec![
                ResourceConfig::new("ex", ExampleService::MODEL)
                    .with_attribute("interval_secs", 0.01)
                    .with_attribute("auto_start", false),
            ],
            ..Default::default()
        };
        ServiceHost::build(&config).unwrap()
    }

    #[test]
    fn test_parse_list_and_blank() {
        assert_eq!(Request::parse("list").unwrap(), Some(Request::List));
        assert_eq!(Request::parse("  ").unwrap(), None);
        assert_eq!(Request::parse("# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_command() {
        let request = Request::parse(r#"osc {"start": true, "bogus": 1}"#).unwrap().unwrap();
        match request {
            Request::Command { service, command } => {
                assert_eq!(service, "osc");
                assert_eq!(command.len(), 2);
                assert!(command.contains_key("bogus"));
            }
            _ => panic!("Expected command request"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(Request::parse("osc").is_err());
        assert!(Request::parse("osc [1, 2]").is_err());
        assert!(matches!(Request::parse("osc {oops"), Err(StartStopError::Json(_))));
    }

    #[test]
    fn test_handle_command_and_list() {
        let host = host();

        let reply = handle_request(
            &host,
            Request::parse(r#"ex {"start": true, "bogus": 1}"#).unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(reply["result"], json!({"start": true, "bogus": false}));
        assert_eq!(reply["status"], json!("running"));

        let list = handle_request(&host, Request::List).unwrap();
        assert_eq!(list[0]["name"], json!("ex"));
        assert_eq!(list[0]["status"], json!("running"));

        host.stop_all();
    }

    #[test]
    fn test_handle_unknown_service() {
        let host = host();
        let err = handle_request(&host, Request::parse(r#"ghost {"stop": 1}"#).unwrap().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown service 'ghost'"));
    }
}
