//! Typed scan request built from a loosely-typed argument list.
//!
//! Callers hand over `[startIP?, endIP?, portSpec?, timeoutSeconds?]` as JSON
//! values. They are decoded once here; nothing downstream sees an untyped
//! value.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::port::{Port, PortSpec};
use super::range::Ipv4Range;

/// Default first address of the sweep.
pub const DEFAULT_START: &str = "192.168.1.1";
/// Default last address of the sweep.
pub const DEFAULT_END: &str = "192.168.1.255";
/// Default overall deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A fully-typed, immutable scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    range: Ipv4Range,
    ports: Vec<Port>,
    timeout: Duration,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            range: Ipv4Range::from_strs(DEFAULT_START, DEFAULT_END),
            ports: PortSpec::defaults().to_ports(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ScanRequest {
    /// Create a request from already-typed parts.
    ///
    /// A zero timeout falls back to [`DEFAULT_TIMEOUT`].
    pub fn new(range: Ipv4Range, ports: &PortSpec, timeout: Duration) -> Self {
        Self {
            range,
            ports: ports.to_ports(),
            timeout: if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout },
        }
    }

    /// Decode positional arguments, applying defaults for anything absent.
    ///
    /// The address bounds are only taken when both are supplied.
    pub fn from_args(args: &[Value]) -> Self {
        let mut request = Self::default();

        if let [start, end, ..] = args {
            request.range = Ipv4Range::from_strs(&value_to_string(start), &value_to_string(end));
        }

        if let Some(spec) = args.get(2) {
            request.ports = port_spec_from_value(spec).to_ports();
        }

        if let Some(secs) = args.get(3).and_then(positive_integer) {
            request.timeout = Duration::from_secs(secs);
        } else if let Some(raw) = args.get(3) {
            debug!(%raw, "ignoring timeout argument, keeping default");
        }

        request
    }

    pub fn range(&self) -> Ipv4Range {
        self.range
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Decode a port spec given as a string, a number, or an array of numbers.
pub fn port_spec_from_value(value: &Value) -> PortSpec {
    match value {
        Value::String(s) => PortSpec::parse(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let port = integral(item).and_then(Port::from_i64);
                if port.is_none() {
                    warn!(%item, "dropping port list entry");
                }
                port
            })
            .collect(),
        Value::Number(_) => match integral(value).and_then(Port::from_i64) {
            Some(port) => std::iter::once(port).collect(),
            None => {
                warn!(%value, "dropping port number");
                PortSpec::new()
            }
        },
        other => {
            warn!(value = %other, "unsupported port specification");
            PortSpec::new()
        }
    }
}

/// An integer, or a float with no fractional part.
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn positive_integer(value: &Value) -> Option<u64> {
    let n = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        other => integral(other),
    }?;
    u64::try_from(n).ok().filter(|&n| n > 0)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::Ipv4Addr;

    fn raw_ports(request: &ScanRequest) -> Vec<u16> {
        request.ports().iter().map(|p| p.as_u16()).collect()
    }

    #[test]
    fn test_defaults() {
        let request = ScanRequest::from_args(&[]);
        assert_eq!(request.range().start(), Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(request.range().end(), Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(raw_ports(&request), vec![21, 22, 25, 80, 443]);
        assert_eq!(request.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_single_address_argument_is_ignored() {
        let request = ScanRequest::from_args(&[json!("10.0.0.1")]);
        assert_eq!(request.range(), ScanRequest::default().range());
    }

    #[test]
    fn test_full_argument_list() {
        let request =
            ScanRequest::from_args(&[json!("10.0.0.1"), json!("10.0.0.9"), json!("22,8000-8001"), json!(5)]);
        assert_eq!(request.range().len(), 9);
        assert_eq!(raw_ports(&request), vec![22, 8000, 8001]);
        assert_eq!(request.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_port_argument_forms() {
        assert_eq!(port_spec_from_value(&json!(443)).count(), 1);
        assert_eq!(port_spec_from_value(&json!(443.0)).count(), 1);
        assert!(port_spec_from_value(&json!(443.5)).is_empty());
        assert!(port_spec_from_value(&json!(0)).is_empty());
        assert!(port_spec_from_value(&json!(true)).is_empty());

        let list = port_spec_from_value(&json!([22, 80.0, 99999, "443", 0.5]));
        let ports: Vec<u16> = list.to_ports().into_iter().map(u16::from).collect();
        assert_eq!(ports, vec![22, 80]);
    }

    #[test]
    fn test_invalid_ports_yield_empty_request() {
        let request = ScanRequest::from_args(&[json!("127.0.0.1"), json!("127.0.0.1"), json!("abc,99999")]);
        assert!(request.ports().is_empty());
    }

    #[test]
    fn test_timeout_argument_forms() {
        let base = [json!("127.0.0.1"), json!("127.0.0.1"), json!("22")];
        let with = |t: Value| {
            let mut args = base.to_vec();
            args.push(t);
            ScanRequest::from_args(&args).timeout()
        };
        assert_eq!(with(json!("15")), Duration::from_secs(15));
        assert_eq!(with(json!(30.0)), Duration::from_secs(30));
        assert_eq!(with(json!(0)), DEFAULT_TIMEOUT);
        assert_eq!(with(json!(-3)), DEFAULT_TIMEOUT);
        assert_eq!(with(json!("soon")), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_non_string_addresses_use_display_form() {
        let request = ScanRequest::from_args(&[json!(1), json!(2)]);
        // "1" and "2" decode with missing octets as zero.
        assert_eq!(request.range().start(), Ipv4Addr::new(1, 0, 0, 0));
        assert_eq!(request.range().end(), Ipv4Addr::new(2, 0, 0, 0));
    }
}
