use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq)]
pub enum HubError {
    #[error("Amount must be greater than zero")]
    InvalidAmount = 0,

    #[error("Protocol is paused")]
    Paused = 1,

    #[error("Insufficient deposited balance")]
    InsufficientBalance = 2,

    #[error("Insufficient pool liquidity")]
    InsufficientLiquidity = 3,

    #[error("Borrow would exceed the collateral borrowing limit")]
    ExceedsBorrowingLimit = 4,

    #[error("Collateral required while a loan is outstanding")]
    CollateralRequiredForOutstandingLoan = 5,

    #[error("Item is already locked")]
    ItemAlreadyLocked = 6,

    #[error("Item is not locked by the caller")]
    ItemNotLockedByCaller = 7,

    #[error("Collection is not supported")]
    CollectionNotSupported = 8,

    #[error("Position is healthy")]
    PositionHealthy = 9,

    #[error("Unauthorized")]
    Unauthorized = 10,

    #[error("Parameter out of range")]
    ParameterOutOfRange = 11,

    #[error("Collateral item limit reached")]
    CollateralLimitReached = 12,

    #[error("Project URI too long")]
    UriTooLong = 13,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 14,

    #[error("Account not initialized")]
    NotInitialized = 15,

    #[error("Account already initialized")]
    AlreadyInitialized = 16,

    #[error("Invalid account data")]
    InvalidAccountData = 17,

    #[error("Invalid PDA")]
    InvalidPda = 18,
}

impl PrintProgramError for HubError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("HubError: {}", self);
    }
}

impl From<HubError> for ProgramError {
    fn from(e: HubError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for HubError {
    fn type_of() -> &'static str {
        "HubError"
    }
}
