use ethers::abi::{AbiEncode, ParamType, Token};
use ethers::types::{Address, Bytes, U256};

use crate::error::{AppError, Result};

ethers::contract::abigen!(
    Erc20,
    r#"[
        function balanceOf(address account) view returns (uint256)
    ]"#
);

// Vault entry points. `withdraw` is overloaded, so calldata is built from
// the signatures directly rather than through generated bindings.
pub const VAULT_DEPOSIT: &str = "deposit(uint256,address)";
pub const VAULT_WITHDRAW: &str = "withdraw(uint256,address,address)";
pub const VAULT_WITHDRAW_ALL: &str = "withdraw()";

pub fn balance_of_calldata(account: Address) -> Bytes {
    Bytes::from(BalanceOfCall { account }.encode())
}

pub fn decode_uint256(data: &Bytes) -> Result<U256> {
    let tokens = ethers::abi::decode(&[ParamType::Uint(256)], data.as_ref())
        .map_err(|e| AppError::Conversion(format!("balanceOf returned {data}: {e}")))?;
    tokens
        .into_iter()
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(|| AppError::Conversion(format!("balanceOf returned {data}")))
}

fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = ethers::utils::id(signature).to_vec();
    data.extend(ethers::abi::encode(args));
    Bytes::from(data)
}

pub fn vault_deposit_calldata(amount: U256, beneficiary: Address) -> Bytes {
    encode_call(
        VAULT_DEPOSIT,
        &[Token::Uint(amount), Token::Address(beneficiary)],
    )
}

pub fn vault_withdraw_calldata(amount: U256, owner: Address, receiver: Address) -> Bytes {
    encode_call(
        VAULT_WITHDRAW,
        &[
            Token::Uint(amount),
            Token::Address(owner),
            Token::Address(receiver),
        ],
    )
}

pub fn vault_withdraw_all_calldata() -> Bytes {
    encode_call(VAULT_WITHDRAW_ALL, &[])
}
