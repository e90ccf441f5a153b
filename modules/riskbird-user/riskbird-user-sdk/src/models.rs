use riskbird_http::{SecretString, serialize_exposed};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::ValidationError;

/// Tolerance when checking that an amount has at most two decimals.
const DECIMAL_TOLERANCE: f64 = 1e-9;

/// Body of `/riskbird/user/modifyUserBalance`.
///
/// Amounts are kept as JSON numbers so `100` goes out as `100`, not `100.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdateRequest {
    pub phone: String,
    #[serde(serialize_with = "serialize_exposed")]
    pub password: SecretString,
    pub recharge_amount: Number,
    pub gift_amount: Number,
}

impl BalanceUpdateRequest {
    #[must_use]
    pub fn new(
        phone: impl Into<String>,
        password: impl Into<SecretString>,
        recharge_amount: Number,
        gift_amount: Number,
    ) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
            recharge_amount,
            gift_amount,
        }
    }

    /// Apply the backend's acceptance rules locally.
    ///
    /// Phone and password must be present; both amounts must be
    /// non-negative with at most two decimal places.
    ///
    /// # Errors
    /// The first rule the request breaks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_credentials(&self.phone, &self.password)?;

        let recharge = finite(&self.recharge_amount, "rechargeAmount")?;
        let gift = finite(&self.gift_amount, "giftAmount")?;
        if recharge < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "rechargeAmount",
            });
        }
        if gift < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "giftAmount",
            });
        }

        if !has_at_most_two_decimals(recharge) {
            return Err(ValidationError::TooManyDecimals {
                field: "rechargeAmount",
            });
        }
        if !has_at_most_two_decimals(gift) {
            return Err(ValidationError::TooManyDecimals {
                field: "giftAmount",
            });
        }
        Ok(())
    }
}

/// Body of `/riskbird/user/modifyUserPoint`.
///
/// Opaque: whatever JSON the caller supplies goes on the wire unchanged.
/// [`PointAmountChange`] converts into this for the shape the backend binds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointUpdateRequest(pub serde_json::Value);

impl PointUpdateRequest {
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for PointUpdateRequest {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl From<PointAmountChange> for PointUpdateRequest {
    fn from(change: PointAmountChange) -> Self {
        Self(serde_json::json!({
            "phone": change.phone,
            "password": change.password.expose(),
            "pointAmount": change.point_amount,
        }))
    }
}

/// Typed point change as the backend binds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointAmountChange {
    pub phone: String,
    #[serde(serialize_with = "serialize_exposed")]
    pub password: SecretString,
    pub point_amount: i64,
}

impl PointAmountChange {
    #[must_use]
    pub fn new(
        phone: impl Into<String>,
        password: impl Into<SecretString>,
        point_amount: i64,
    ) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
            point_amount,
        }
    }

    /// Apply the backend's acceptance rules locally.
    ///
    /// Phone and password must be present; the amount must be a positive
    /// multiple of 5 (zero counts as missing).
    ///
    /// # Errors
    /// The first rule the change breaks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_credentials(&self.phone, &self.password)?;

        match self.point_amount {
            0 => Err(ValidationError::MissingPointAmount),
            n if n < 0 => Err(ValidationError::NegativePoints),
            n if n % 5 != 0 => Err(ValidationError::PointsNotMultipleOfFive(n)),
            _ => Ok(()),
        }
    }
}

fn check_credentials(phone: &str, password: &SecretString) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(())
}

fn finite(value: &Number, field: &'static str) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotANumber { field })
}

fn has_at_most_two_decimals(value: f64) -> bool {
    let scaled = value * 100.0;
    (scaled - scaled.round()).abs() < DECIMAL_TOLERANCE
}
