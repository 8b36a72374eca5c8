//! Request entry point and response envelope.
//!
//! [`ScanExecutor::execute`] takes the loosely-typed argument list
//! `[startIP?, endIP?, portSpec?, timeoutSeconds?]`, runs one sweep, and
//! wraps the findings in a [`ScanResponse`]. Every completed sweep is a
//! success, whether it finished, timed out, or found nothing.

use crate::error::ScanResult;
use crate::scanner::{HostService, RangeScanner, TaskLimiter};
use crate::types::ScanRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Status reported for every non-fatal completion.
pub const STATUS_OK: u16 = 200;

/// Message attached to successful responses.
pub const MSG_OK: &str = "scan completed";

/// Payload of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub output: Vec<HostService>,
}

/// Response envelope shared with the other plugin operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub data: ResponseData,
    pub msg: String,
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
}

impl ScanResponse {
    /// A successful response carrying `results`.
    pub fn success(results: Vec<HostService>) -> Self {
        Self {
            data: ResponseData { output: results },
            msg: MSG_OK.to_string(),
            status: STATUS_OK,
            status_text: String::new(),
        }
    }

    /// The identified services.
    pub fn results(&self) -> &[HostService] {
        &self.data.output
    }

    /// Serialize the envelope. This is the only fatal step of a scan.
    pub fn to_json(&self) -> ScanResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed form for terminals.
    pub fn to_json_pretty(&self) -> ScanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs sweeps on behalf of callers.
#[derive(Default)]
pub struct ScanExecutor {
    scanner: RangeScanner,
}

impl ScanExecutor {
    /// Executor with the standard probe cascade and unbounded fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor around a custom scanner.
    pub fn with_scanner(scanner: RangeScanner) -> Self {
        Self { scanner }
    }

    /// Standard executor with a cap on concurrent host scans.
    pub fn with_limit(limit: usize) -> Self {
        Self::with_scanner(RangeScanner::default().with_limiter(TaskLimiter::bounded(limit)))
    }

    /// Decode `args`, run the sweep, and return the response envelope.
    pub async fn execute(&self, args: &[Value]) -> ScanResponse {
        trace!(?args, "scan called");
        let request = ScanRequest::from_args(args);
        self.run(&request).await
    }

    /// Run an already-typed request.
    pub async fn run(&self, request: &ScanRequest) -> ScanResponse {
        ScanResponse::success(self.scanner.run(request).await)
    }

    /// [`execute`](Self::execute) followed by serialization.
    pub async fn execute_json(&self, args: &[Value]) -> ScanResult<String> {
        self.execute(args).await.to_json()
    }
}
