//! Global constants for the liquidity hub
//!
//! Central location for all protocol-wide constants

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seconds in a 365-day year, the accrual time base
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Settlement asset decimals (USDT = 6)
pub const SETTLEMENT_DECIMALS: u8 = 6;

/// Default annual rate paid to lenders in basis points (3%)
pub const DEFAULT_LENDING_RATE_BPS: u16 = 300;

/// Default annual rate charged to borrowers in basis points (6%)
pub const DEFAULT_BORROWING_RATE_BPS: u16 = 600;

/// Default loan-to-value cap in basis points (40%)
pub const DEFAULT_BORROWING_LIMIT_BPS: u16 = 4_000;

/// Default liquidation threshold in basis points (50%)
pub const DEFAULT_THRESHOLD_BPS: u16 = 5_000;

/// Maximum collateral items held by one position
pub const MAX_COLLATERAL_ITEMS: usize = 32;

/// Maximum byte length of a collection project URI
pub const MAX_URI_LENGTH: usize = 128;

/// ===== PDA SEEDS =====

/// Hub configuration account seed
pub const HUB_CONFIG_SEED: &[u8] = b"hub_config";

/// Global pool account seed
pub const HUB_POOL_SEED: &[u8] = b"hub_pool";

/// Lender position account seed
pub const LENDER_POSITION_SEED: &[u8] = b"lender_position";

/// Borrower position account seed
pub const BORROWER_POSITION_SEED: &[u8] = b"borrower_position";

/// Collection configuration account seed
pub const COLLECTION_SEED: &[u8] = b"collection";

/// Collateral lock record account seed
pub const LOCK_RECORD_SEED: &[u8] = b"lock_record";
