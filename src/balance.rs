use ethers::types::{Address, U256};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::constants::{NATIVE_DECIMALS, TOKEN_DECIMALS, TOKEN_DISPLAY_DP};
use crate::contracts::{balance_of_calldata, decode_uint256};
use crate::error::{AppError, Result};
use crate::wallet::{methods, WalletProvider};

/// Display balances for the connected account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub native: Decimal,
    pub token: Decimal,
}

/// Converts base units to a decimal amount: `raw / 10^decimals`, exact.
pub fn to_display_units(raw: U256, decimals: u32) -> Result<Decimal> {
    if raw > U256::from(i128::MAX as u128) {
        return Err(AppError::Conversion(format!("{raw} does not fit a decimal")));
    }
    let value = Decimal::try_from_i128_with_scale(raw.as_u128() as i128, decimals)
        .map_err(|e| AppError::Conversion(format!("{raw} at {decimals} decimals: {e}")))?;
    Ok(value.normalize())
}

/// Token amounts are shown to two places, halves rounded up.
pub fn round_for_display(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(TOKEN_DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

pub struct BalanceReader {
    token: Address,
}

impl BalanceReader {
    pub fn new(token: Address) -> Self {
        Self { token }
    }

    pub async fn read(&self, wallet: &dyn WalletProvider, account: Address) -> Result<Balances> {
        let native_raw = methods::get_balance(wallet, account).await?;
        let token_raw = decode_uint256(
            &methods::call(wallet, self.token, balance_of_calldata(account)).await?,
        )?;

        let balances = Balances {
            native: to_display_units(native_raw, NATIVE_DECIMALS)?,
            token: round_for_display(to_display_units(token_raw, TOKEN_DECIMALS)?),
        };
        tracing::debug!(
            "Balances for {:?}: native={} token={}",
            account,
            balances.native,
            balances.token
        );
        Ok(balances)
    }
}
