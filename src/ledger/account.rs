//! Account information polling
//!
//! A freshly started testnet answers `account_info` with an error (or not at
//! all) until its first validated ledger; an unfunded account keeps erroring
//! until a payment creates it. Polling until success covers both cases.

use crate::error::{Error, Result};
use crate::ledger::rpc::{RpcClient, RpcResponse, to_pretty_json};
use serde_json::{Value, json};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Parameters for an `account_info` request against the validated ledger
pub fn account_info_params(account: &str) -> Value {
    json!({
        "account": account,
        "ledger_index": "validated",
        "strict": true,
    })
}

/// Fetch account information once
pub fn get_account_info(client: &RpcClient, account: &str) -> Result<RpcResponse> {
    client.request("account_info", account_info_params(account))
}

/// Polls `account_info` at a fixed interval until it succeeds
pub struct AccountWatcher<'a> {
    client: &'a RpcClient,
    interval: Duration,
    timeout: Option<Duration>,
}

impl<'a> AccountWatcher<'a> {
    pub fn new(client: &'a RpcClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            timeout: None,
        }
    }

    /// Give up after `timeout` instead of polling forever
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// One attempt; progress lines go to `out`
    ///
    /// Connectivity failures are reported and swallowed (`Ok(None)`), any
    /// other transport failure is returned.
    fn poll_once<W: Write>(&self, account: &str, out: &mut W) -> Result<Option<Value>> {
        writeln!(out, "Getting account info for {}", account)?;

        let response = match get_account_info(self.client, account) {
            Ok(response) => response,
            Err(Error::Connectivity { url, message }) => {
                debug!(%url, %message, "connectivity failure");
                writeln!(out, "Server not responding")?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        writeln!(out, "response.status: {}", response.status)?;

        if response.is_success() {
            writeln!(out, "{}", to_pretty_json(&response.result)?)?;
            Ok(Some(response.result))
        } else {
            debug!(account, error = %response.error_message(), "account not ready");
            Ok(None)
        }
    }

    /// Poll until `account` answers successfully and return its result
    pub fn wait_for<W: Write>(&self, account: &str, out: &mut W) -> Result<Value> {
        let started = Instant::now();
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            if let Some(result) = self.poll_once(account, out)? {
                info!(account, attempts, "account available");
                return Ok(result);
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() + self.interval > timeout {
                    return Err(Error::Timeout(
                        timeout.as_secs(),
                        format!("account {}", account),
                    ));
                }
            }

            thread::sleep(self.interval);
        }
    }

    /// Wait for each account in turn
    pub fn wait_for_all<W: Write>(&self, accounts: &[String], out: &mut W) -> Result<Vec<Value>> {
        accounts
            .iter()
            .map(|account| self.wait_for(account, out))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::rpc::tests::{ScriptedTransport, unreachable};

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const TEST: &str = "rNGknFCRBZguXcPqC63k6xTZnonSe6ZuWt";

    fn funded(account: &str, balance: &str) -> Value {
        json!({
            "status": "success",
            "validated": true,
            "account_data": { "Account": account, "Balance": balance },
        })
    }

    fn not_found() -> Value {
        json!({ "status": "error", "error": "actNotFound", "error_message": "Account not found." })
    }

    #[test]
    fn test_params() {
        assert_eq!(
            account_info_params(GENESIS),
            json!({ "account": GENESIS, "ledger_index": "validated", "strict": true })
        );
    }

    #[test]
    fn test_retries_until_success() {
        let transport = ScriptedTransport::default();
        transport
            .fail(unreachable("http://127.0.0.1:5005"))
            .reply(not_found())
            .reply(funded(GENESIS, "100000000000000000"));
        let client = RpcClient::with_transport("http://127.0.0.1:5005", transport.clone());
        let mut out = Vec::new();

        let result = AccountWatcher::new(&client, Duration::ZERO)
            .wait_for(GENESIS, &mut out)
            .unwrap();

        assert_eq!(result["account_data"]["Balance"], "100000000000000000");
        assert_eq!(transport.methods().len(), 3);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Getting account info for").count(), 3);
        assert_eq!(text.matches("Server not responding").count(), 1);
        assert!(text.contains("response.status: error"));
        assert!(text.contains("response.status: success"));
        assert!(text.contains("        \"Balance\": \"100000000000000000\""));
    }

    #[test]
    fn test_accounts_are_waited_for_in_order() {
        let transport = ScriptedTransport::default();
        transport
            .reply(funded(GENESIS, "100000000000000000"))
            .reply(not_found())
            .reply(funded(TEST, "5000000000"));
        let client = RpcClient::with_transport("http://127.0.0.1:5005", transport.clone());
        let mut out = Vec::new();

        let results = AccountWatcher::new(&client, Duration::ZERO)
            .wait_for_all(&[GENESIS.to_string(), TEST.to_string()], &mut out)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["account_data"]["Account"], TEST);
        let requested: Vec<Value> = transport
            .calls
            .borrow()
            .iter()
            .map(|(_, params)| params["account"].clone())
            .collect();
        assert_eq!(requested, [json!(GENESIS), json!(TEST), json!(TEST)]);
    }

    #[test]
    fn test_non_connectivity_errors_propagate() {
        let transport = ScriptedTransport::default();
        transport.fail(Error::Rpc {
            method: "account_info".into(),
            message: "HTTP status 403".into(),
        });
        let client = RpcClient::with_transport("http://127.0.0.1:5005", transport);

        let err = AccountWatcher::new(&client, Duration::ZERO)
            .wait_for(GENESIS, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Rpc { .. }));
    }

    #[test]
    fn test_timeout() {
        let transport = ScriptedTransport::default();
        transport.reply(not_found());
        let client = RpcClient::with_transport("http://127.0.0.1:5005", transport);

        let err = AccountWatcher::new(&client, Duration::from_secs(5))
            .timeout(Some(Duration::from_secs(1)))
            .wait_for(TEST, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(1, _)));
    }
}
