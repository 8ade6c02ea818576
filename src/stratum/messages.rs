//! Wire-format types for the Stratum JSON-line protocol.
//!
//! One JSON object per line, newline-delimited, in both directions.
//! Mirrors the shapes built by the original `StratumClient::do_login`,
//! `::submit` and parsed by `::handle_message`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginParams {
    pub login: String,
    pub pass: String,
    pub agent: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub id: u64,
    pub method: &'static str,
    pub params: LoginParams,
}

impl LoginRequest {
    pub fn new(id: u64, login: String) -> Self {
        LoginRequest {
            id,
            method: "login",
            params: LoginParams {
                login,
                pass: "x".to_string(),
                agent: "randomx-miner/0.1".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitParams {
    pub id: String,
    pub job_id: String,
    pub nonce: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitRequest {
    pub id: u64,
    pub method: &'static str,
    pub params: SubmitParams,
}

impl SubmitRequest {
    pub fn new(id: u64, login_id: String, job_id: String, nonce: u32, result_hash_hex: String) -> Self {
        SubmitRequest {
            id,
            method: "submit",
            params: SubmitParams {
                id: login_id,
                job_id,
                nonce: format!("{:08x}", nonce),
                result: result_hash_hex,
            },
        }
    }
}

/// Raw job fields as they appear on the wire, before decoding hex strings
/// into bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct JobParams {
    pub job_id: String,
    pub blob: String,
    pub target: String,
    pub seed_hash: String,
}

/// Any line received from the pool, loosely typed: a share response carries
/// a numeric `id` plus `result`/`error`; a job push carries `method: "job"`;
/// a login response carries `result.id` and optionally `result.job`.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolMessage {
    pub id: Option<Value>,
    pub method: Option<String>,
    pub params: Option<JobParams>,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl PoolMessage {
    /// The `id` field as an integer, when it is present and numeric.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(Value::as_u64)
    }

    pub fn is_job_push(&self) -> bool {
        self.method.as_deref() == Some("job")
    }

    /// The login response's subscription id, when this message is a login
    /// response (`result.id`).
    pub fn login_id(&self) -> Option<String> {
        self.result.as_ref()?.get("id").and_then(|v| {
            v.as_str()
                .map(str::to_string)
                .or_else(|| v.as_u64().map(|n| n.to_string()))
        })
    }

    /// The job embedded in a login response's `result.job`, if present.
    pub fn login_job(&self) -> Option<JobParams> {
        let job = self.result.as_ref()?.get("job")?;
        serde_json::from_value(job.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_job_push() {
        let line = r#"{"jsonrpc":"2.0","method":"job","params":{"job_id":"1","blob":"ab","target":"ffffffff","seed_hash":"00"}}"#;
        let msg: PoolMessage = serde_json::from_str(line).unwrap();
        assert!(msg.is_job_push());
        assert_eq!(msg.params.unwrap().job_id, "1");
    }

    #[test]
    fn parses_login_response_with_embedded_job() {
        let line = r#"{"id":1,"result":{"id":"sub-1","job":{"job_id":"2","blob":"cd","target":"ffffffff","seed_hash":"11"}}}"#;
        let msg: PoolMessage = serde_json::from_str(line).unwrap();
        assert_eq!(msg.login_id(), Some("sub-1".to_string()));
        assert_eq!(msg.login_job().unwrap().job_id, "2");
    }

    #[test]
    fn parses_share_response() {
        let line = r#"{"id":7,"result":true,"error":null}"#;
        let msg: PoolMessage = serde_json::from_str(line).unwrap();
        assert_eq!(msg.numeric_id(), Some(7));
        assert!(msg.error.unwrap().is_null());
    }

    #[test]
    fn login_request_serializes_expected_shape() {
        let req = LoginRequest::new(1, "wallet".to_string());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["method"], "login");
        assert_eq!(value["params"]["login"], "wallet");
        assert_eq!(value["params"]["pass"], "x");
    }

    #[test]
    fn submit_request_formats_nonce_as_lowercase_hex() {
        let req = SubmitRequest::new(2, "sub-1".to_string(), "job-1".to_string(), 0xAB, "deadbeef".to_string());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["params"]["nonce"], "000000ab");
    }
}
