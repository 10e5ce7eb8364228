/// Application constants

// Network (Optimism)
pub const REQUIRED_CHAIN_ID: u64 = 10;
pub const REQUIRED_CHAIN_ID_HEX: &str = "0xa";
pub const NETWORK_CHAIN_NAME: &str = "Optimism";
pub const NETWORK_RPC_URL: &str = "https://rpc.ankr.com/optimism";
pub const NETWORK_CURRENCY_NAME: &str = "Optimism Ether";
pub const NETWORK_CURRENCY_SYMBOL: &str = "ETH";
pub const NETWORK_EXPLORER_URL: &str = "https://optimistic.etherscan.io/";

// Contract addresses (Optimism)
pub const USDC_ADDRESS: &str = "0x7F5c764cBc14f9669B88837ca1490cCa17c31607";
pub const RETURN_VAULT_ADDRESS: &str = "0xad17a225074191d5c8a37b50fda1ae278a2ee6a2";

// Decimal precision
pub const NATIVE_DECIMALS: u32 = 18;
pub const TOKEN_DECIMALS: u32 = 6;
pub const TOKEN_DISPLAY_DP: u32 = 2;

// Transfer amounts in base units
pub const DEFAULT_RAW_DEPOSIT_WEI: u128 = 10_000_000_000_000_000; // 0.01 ETH
pub const DEFAULT_VAULT_AMOUNT: u128 = 12_000_000; // 12 USDC

// EIP-1193 provider error codes
pub const WALLET_ERROR_USER_REJECTED: i64 = 4001;
pub const WALLET_ERROR_UNRECOGNIZED_CHAIN: i64 = 4902;

// Confirmation polling
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 1_500;
pub const RECEIPT_TIMEOUT_SECS: u64 = 600;
pub const MAX_RECEIPT_TIMEOUT_SECS: u64 = 86_400;
pub const WALLET_RPC_TIMEOUT_SECS: u64 = 120;

// Controller queue
pub const COMMAND_QUEUE_CAPACITY: usize = 32;
pub const WALLET_EVENT_CAPACITY: usize = 64;

// API version
pub const API_VERSION: &str = "v1";

// WebSocket configuration
pub const WS_HEARTBEAT_INTERVAL_SECS: u64 = 30;
pub const WS_CLIENT_TIMEOUT_SECS: u64 = 60;
