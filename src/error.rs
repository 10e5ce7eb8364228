use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::constants::{WALLET_ERROR_UNRECOGNIZED_CHAIN, WALLET_ERROR_USER_REJECTED};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("Chain is not registered in the wallet: {0}")]
    UnrecognizedChain(String),

    #[error("Wallet error {code}: {message}")]
    Wallet { code: i64, message: String },

    #[error("Wallet transport error: {0}")]
    Transport(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet is on chain {actual:?}, expected {expected}")]
    WrongNetwork { expected: u64, actual: Option<u64> },

    #[error("Amount conversion failed: {0}")]
    Conversion(String),

    #[error("Balances unavailable: {0}")]
    BalanceUnavailable(String),

    #[error("Transaction {0} reverted")]
    TransactionReverted(String),

    #[error("Timed out waiting for confirmation of {0}")]
    ConfirmationTimeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How a failure should be treated by whoever presents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Recoverable,
    Fatal,
}

impl AppError {
    /// Maps an EIP-1193 / JSON-RPC error object onto the taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            WALLET_ERROR_USER_REJECTED => AppError::UserRejected(message),
            WALLET_ERROR_UNRECOGNIZED_CHAIN => AppError::UnrecognizedChain(message),
            _ => AppError::Wallet { code, message },
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AppError::UserRejected(_)
            | AppError::UnrecognizedChain(_)
            | AppError::Wallet { .. }
            | AppError::NotConnected
            | AppError::WrongNetwork { .. }
            | AppError::Conversion(_)
            | AppError::BalanceUnavailable(_)
            | AppError::TransactionReverted(_) => Severity::Recoverable,
            AppError::Transport(_)
            | AppError::ConfirmationTimeout(_)
            | AppError::Config(_)
            | AppError::Internal(_) => Severity::Fatal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::UserRejected(_) => "USER_REJECTED",
            AppError::UnrecognizedChain(_) => "UNRECOGNIZED_CHAIN",
            AppError::Wallet { .. } => "WALLET_ERROR",
            AppError::Transport(_) => "WALLET_TRANSPORT",
            AppError::NotConnected => "NOT_CONNECTED",
            AppError::WrongNetwork { .. } => "WRONG_NETWORK",
            AppError::Conversion(_) => "CONVERSION_FAILED",
            AppError::BalanceUnavailable(_) => "BALANCE_UNAVAILABLE",
            AppError::TransactionReverted(_) => "TRANSACTION_REVERTED",
            AppError::ConfirmationTimeout(_) => "CONFIRMATION_TIMEOUT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::UserRejected(_) => StatusCode::FORBIDDEN,
            AppError::NotConnected => StatusCode::UNAUTHORIZED,
            AppError::WrongNetwork { .. } | AppError::UnrecognizedChain(_) => {
                StatusCode::CONFLICT
            }
            AppError::Conversion(_) | AppError::TransactionReverted(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Wallet { .. } | AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::BalanceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ConfirmationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                severity: self.severity(),
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
