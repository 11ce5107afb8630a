//! Fixed-schema signing helpers kept for older integrations.
//!
//! Each helper only builds the payload shape it names and delegates to
//! [`Signer::sign`] or [`Signer::verify`].

use tracing::warn;

use crate::error::SigningResult;
use crate::value::Value;

use super::clock::Clock;
use super::protocol::Signer;

fn deprecated(name: &str, replacement: &str) {
    warn!(helper = name, "Signer::{} is deprecated, use Signer::{}", name, replacement);
}

fn account(account_code: Option<&str>) -> Value {
    [("account_code", Value::from(account_code))]
        .into_iter()
        .collect()
}

/// Read the `signature` parameter, or an empty token if it is missing.
fn signature_param(params: &Value) -> &str {
    params
        .get("signature")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

impl<C: Clock> Signer<C> {
    /// Sign `{account: {account_code}, subscription: {plan_code}}`.
    #[deprecated(note = "use `Signer::sign` instead")]
    pub fn sign_subscription(
        &self,
        plan_code: &str,
        account_code: Option<&str>,
    ) -> SigningResult<String> {
        deprecated("sign_subscription", "sign");
        self.sign(Value::from_iter([
            ("account", account(account_code)),
            ("subscription", [("plan_code", plan_code)].into_iter().collect()),
        ]))
    }

    /// Sign `{account: {account_code}}`.
    #[deprecated(note = "use `Signer::sign` instead")]
    pub fn sign_billing_info(&self, account_code: &str) -> SigningResult<String> {
        deprecated("sign_billing_info", "sign");
        self.sign(Value::from_iter([("account", account(Some(account_code)))]))
    }

    /// Sign `{account: {account_code}, transaction: {amount_in_cents, currency}}`.
    ///
    /// `currency` falls back to the signer's default currency.
    #[deprecated(note = "use `Signer::sign` instead")]
    pub fn sign_transaction(
        &self,
        amount_in_cents: i64,
        currency: Option<&str>,
        account_code: Option<&str>,
    ) -> SigningResult<String> {
        deprecated("sign_transaction", "sign");
        let currency = currency.unwrap_or(self.default_currency.as_str());
        self.sign(Value::from_iter([
            ("account", account(account_code)),
            (
                "transaction",
                Value::from_iter([
                    ("amount_in_cents", Value::from(amount_in_cents)),
                    ("currency", Value::from(currency)),
                ]),
            ),
        ]))
    }

    /// Verify the `signature` parameter of a subscription callback.
    #[deprecated(note = "use `Signer::verify` instead")]
    pub fn verify_subscription(&self, params: &Value) -> SigningResult<Value> {
        deprecated("verify_subscription", "verify");
        self.verify(signature_param(params))
    }

    /// Verify the `signature` parameter of a billing info callback.
    #[deprecated(note = "use `Signer::verify` instead")]
    pub fn verify_billing_info(&self, params: &Value) -> SigningResult<Value> {
        deprecated("verify_billing_info", "verify");
        self.verify(signature_param(params))
    }

    /// Verify the `signature` parameter of a transaction callback.
    #[deprecated(note = "use `Signer::verify` instead")]
    pub fn verify_transaction(&self, params: &Value) -> SigningResult<Value> {
        deprecated("verify_transaction", "verify");
        self.verify(signature_param(params))
    }
}
