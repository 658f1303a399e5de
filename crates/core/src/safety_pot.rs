//! Safety pot (emergency fund) balance rules.

use serde::Serialize;

use crate::error::CoreError;
use crate::money::round_cents;
use crate::validation::validate_positive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotMovement {
    Deposit,
    Withdrawal,
}

impl PotMovement {
    /// Signed delta applied to the balance.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Deposit => amount,
            Self::Withdrawal => -amount,
        }
    }
}

/// Balance after depositing `amount`.
pub fn apply_deposit(balance: f64, amount: f64) -> Result<f64, CoreError> {
    validate_positive(amount, "deposit amount")?;
    Ok(round_cents(balance + amount))
}

/// Balance after withdrawing `amount`. The pot can never go negative.
pub fn apply_withdrawal(balance: f64, amount: f64) -> Result<f64, CoreError> {
    validate_positive(amount, "withdrawal amount")?;
    if amount > balance {
        return Err(CoreError::Validation(format!(
            "Cannot withdraw {amount:.2}; safety pot balance is {balance:.2}"
        )));
    }
    Ok(round_cents(balance - amount))
}

pub fn apply(movement: PotMovement, balance: f64, amount: f64) -> Result<f64, CoreError> {
    match movement {
        PotMovement::Deposit => apply_deposit(balance, amount),
        PotMovement::Withdrawal => apply_withdrawal(balance, amount),
    }
}

/// Progress toward the target as a 0–100 percentage. `None` without a target.
pub fn progress_percent(balance: f64, target: Option<f64>) -> Option<f64> {
    match target {
        Some(t) if t > 0.0 => Some((balance.max(0.0) / t * 100.0).min(100.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_adds_to_balance() {
        assert_eq!(apply_deposit(100.0, 25.5).unwrap(), 125.5);
    }

    #[test]
    fn deposit_must_be_positive() {
        assert!(apply_deposit(100.0, 0.0).is_err());
        assert!(apply_deposit(100.0, -5.0).is_err());
    }

    #[test]
    fn withdrawal_cannot_exceed_balance() {
        assert!(apply_withdrawal(100.0, 100.01).is_err());
        assert_eq!(apply_withdrawal(100.0, 100.0).unwrap(), 0.0);
    }

    #[test]
    fn apply_dispatches_on_movement() {
        assert_eq!(apply(PotMovement::Withdrawal, 50.0, 20.0).unwrap(), 30.0);
        assert_eq!(PotMovement::Withdrawal.signed(20.0), -20.0);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress_percent(500.0, Some(1000.0)), Some(50.0));
        assert_eq!(progress_percent(5000.0, Some(1000.0)), Some(100.0));
        assert_eq!(progress_percent(500.0, None), None);
        assert_eq!(progress_percent(500.0, Some(0.0)), None);
    }
}
