//! Funded payment submission
//!
//! Signing happens on the node (`submit` with a secret), so no key material
//! is handled here beyond passing the secret along. After submission the
//! transaction is polled until it is validated or its `LastLedgerSequence`
//! has passed. A validated transaction only counts as sent when its final
//! result is `tesSUCCESS`.

use crate::error::{Error, Result};
use crate::ledger::amount::Drops;
use crate::ledger::rpc::{RpcClient, RpcResponse};
use serde_json::{Value, json};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// A direct XRP payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Sending account
    pub account: String,
    /// Receiving account
    pub destination: String,
    /// Amount in drops
    pub amount: Drops,
}

impl Payment {
    pub fn new(account: &str, destination: &str, amount: Drops) -> Self {
        Self {
            account: account.to_string(),
            destination: destination.to_string(),
            amount,
        }
    }

    /// Transaction JSON; fee and sequence are left for the node to fill in
    pub fn tx_json(&self, last_ledger_sequence: u32) -> Value {
        json!({
            "TransactionType": "Payment",
            "Account": self.account,
            "Destination": self.destination,
            "Amount": self.amount.to_string(),
            "LastLedgerSequence": last_ledger_sequence,
        })
    }
}

/// A submission the node accepted for consideration
#[derive(Debug, Clone)]
pub struct Submitted {
    pub hash: String,
    pub engine_result: String,
    pub last_ledger_sequence: u32,
}

/// Engine results that can never make it into a ledger
fn is_final_rejection(engine_result: &str) -> bool {
    engine_result.starts_with("tem") || engine_result.starts_with("tef")
}

/// Read a ledger index that may be encoded as a number or a string
fn ledger_index(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Accept a validated transaction only if it was applied successfully
fn require_applied(result: Value) -> Result<Value> {
    match result.pointer("/meta/TransactionResult").and_then(Value::as_str) {
        Some("tesSUCCESS") => Ok(result),
        Some(code) => Err(Error::SubmitFailed(format!(
            "transaction validated with result {}",
            code
        ))),
        None => Err(Error::MalformedResponse {
            method: "tx".to_string(),
            field: "meta.TransactionResult".to_string(),
        }),
    }
}

fn require_success(method: &str, response: RpcResponse) -> Result<RpcResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::Rpc {
            method: method.to_string(),
            message: response.error_message(),
        })
    }
}

/// Submit-and-confirm against one node
pub struct ReliableSubmitter<'a> {
    client: &'a RpcClient,
    interval: Duration,
    ledger_offset: u32,
}

impl<'a> ReliableSubmitter<'a> {
    pub fn new(client: &'a RpcClient, interval: Duration, ledger_offset: u32) -> Self {
        Self {
            client,
            interval,
            ledger_offset,
        }
    }

    /// Index of the open ledger
    pub fn current_ledger_index(&self) -> Result<u32> {
        let response = require_success(
            "ledger_current",
            self.client.request("ledger_current", json!({}))?,
        )?;
        ledger_index(response.result.get("ledger_current_index")).ok_or_else(|| {
            Error::MalformedResponse {
                method: "ledger_current".to_string(),
                field: "ledger_current_index".to_string(),
            }
        })
    }

    /// Index of the latest validated ledger
    pub fn validated_ledger_index(&self) -> Result<u32> {
        let response = require_success(
            "ledger",
            self.client
                .request("ledger", json!({ "ledger_index": "validated" }))?,
        )?;
        ledger_index(response.result.get("ledger_index")).ok_or_else(|| {
            Error::MalformedResponse {
                method: "ledger".to_string(),
                field: "ledger_index".to_string(),
            }
        })
    }

    /// Sign on the node and submit, rejecting hopeless transactions early
    pub fn submit(&self, payment: &Payment, secret: &str) -> Result<Submitted> {
        let last_ledger_sequence = self
            .current_ledger_index()?
            .saturating_add(self.ledger_offset);

        let response = self.client.request(
            "submit",
            json!({
                "secret": secret,
                "tx_json": payment.tx_json(last_ledger_sequence),
            }),
        )?;
        if !response.is_success() {
            return Err(Error::SubmitFailed(response.error_message()));
        }

        let engine_result = response
            .result
            .get("engine_result")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let engine_message = response
            .result
            .get("engine_result_message")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if is_final_rejection(&engine_result) {
            return Err(Error::SubmitFailed(format!(
                "transaction rejected with {}: {}",
                engine_result, engine_message
            )));
        }

        let hash = response
            .result
            .pointer("/tx_json/hash")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedResponse {
                method: "submit".to_string(),
                field: "tx_json.hash".to_string(),
            })?
            .to_string();

        info!(
            url = self.client.url(),
            %hash,
            %engine_result,
            last_ledger_sequence,
            "transaction submitted"
        );

        Ok(Submitted {
            hash,
            engine_result,
            last_ledger_sequence,
        })
    }

    /// Poll `tx` until the transaction is validated or expired
    pub fn wait_for_validation(&self, submitted: &Submitted) -> Result<Value> {
        loop {
            thread::sleep(self.interval);

            let response = self
                .client
                .request("tx", json!({ "transaction": submitted.hash }))?;

            if response.is_success() {
                if response.result.get("validated").and_then(Value::as_bool) == Some(true) {
                    info!(hash = %submitted.hash, "transaction validated");
                    return require_applied(response.result);
                }
            } else if response.error_code() != Some("txnNotFound") {
                return Err(Error::SubmitFailed(response.error_message()));
            }

            let validated = self.validated_ledger_index()?;
            debug!(
                hash = %submitted.hash,
                engine_result = %submitted.engine_result,
                validated,
                last_ledger_sequence = submitted.last_ledger_sequence,
                "transaction pending"
            );
            // The ledger at LastLedgerSequence is closed without the transaction
            if validated >= submitted.last_ledger_sequence {
                return Err(Error::SubmitFailed(format!(
                    "The latest validated ledger {} reached the transaction's last ledger sequence {}",
                    validated, submitted.last_ledger_sequence
                )));
            }
        }
    }

    /// Submit and wait for the final outcome
    ///
    /// Every failure, including an unreachable node or a malformed
    /// response, comes back as [`Error::SubmitFailed`].
    pub fn send(&self, payment: &Payment, secret: &str) -> Result<Value> {
        self.submit(payment, secret)
            .and_then(|submitted| self.wait_for_validation(&submitted))
            .map_err(|e| match e {
                Error::SubmitFailed(_) => e,
                other => Error::SubmitFailed(other.to_string()),
            })
    }
}

/// Summary lines printed after the transaction JSON
pub fn outcome_lines(result: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(meta) = result.get("meta") else {
        return lines;
    };

    if let Some(code) = meta.get("TransactionResult").and_then(Value::as_str) {
        lines.push(format!("Result code: {}", code));
    }
    match meta.get("delivered_amount") {
        Some(Value::String(drops)) => match Drops::parse(drops) {
            Some(drops) => lines.push(format!("XRP delivered: {}", drops.to_xrp_string())),
            None => lines.push(format!("Delivered: {}", drops)),
        },
        Some(other) if !other.is_null() => lines.push(format!("Delivered: {}", other)),
        _ => {}
    }
    lines
}
