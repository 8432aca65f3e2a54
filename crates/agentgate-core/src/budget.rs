use crate::error::{GatewayError, GatewayResult};

/// Refuse the call when the prepaid balance cannot cover the declared
/// ceiling. Equality passes. Runs strictly before any outbound call; the
/// balance itself is never decremented here (accounting is external).
pub fn check_budget(tokens_available: i64, max_cost: f64) -> GatewayResult<()> {
    if (tokens_available as f64) < max_cost {
        return Err(GatewayError::InsufficientBudget {
            available: tokens_available,
            max_cost,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_balance_passes() {
        assert!(check_budget(100, 100.0).is_ok());
    }

    #[test]
    fn fractionally_short_balance_fails() {
        let err = check_budget(100, 100.01).unwrap_err();
        assert!(matches!(err, GatewayError::InsufficientBudget { .. }));
    }

    #[test]
    fn ample_balance_passes() {
        assert!(check_budget(1000, 100.0).is_ok());
    }
}
