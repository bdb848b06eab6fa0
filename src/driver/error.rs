//! Error types for the AXI DMA driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`InitError`]: Bring-up failures
//! - [`TransferError`]: Admission failures and abandoned transfers
//! - [`IoError`]: Bounded wait failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the waiting helpers that can fail for more than one reason.
//!
//! Hardware errors raised through the error interrupt are never returned from
//! `submit`. Recovery handles them, and the abandoned transfer's handler is
//! simply never invoked; the waiting helpers report it as
//! [`TransferError::Abandoned`].

// =============================================================================
// Initialization Errors
// =============================================================================

/// Initialization errors
///
/// Any of these is fatal to bring-up. Call `reset` before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// No hardware configuration exists for the requested device id
    ConfigNotFound,
    /// The engine was built with scatter-gather support
    UnsupportedMode,
    /// Binding an interrupt vector failed or no dispatch routine was configured
    InterruptSetupFailed,
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InitError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            InitError::ConfigNotFound => "hardware configuration not found",
            InitError::UnsupportedMode => "scatter-gather mode is not supported",
            InitError::InterruptSetupFailed => "interrupt setup failed",
        }
    }
}

// =============================================================================
// Transfer Errors
// =============================================================================

/// Transfer admission and completion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// A transfer is already in flight on this direction
    Busy,
    /// Length is zero or exceeds the length register
    InvalidLength,
    /// The hardware rejected the start; the channel was released again
    StartFailed,
    /// A hardware error interrupt reset the engine before the transfer completed
    Abandoned,
}

impl core::fmt::Display for TransferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransferError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransferError::Busy => "channel busy",
            TransferError::InvalidLength => "invalid transfer length",
            TransferError::StartFailed => "transfer start failed",
            TransferError::Abandoned => "transfer abandoned after hardware error",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Bounded wait errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Transfer(TransferError::Abandoned)) => { /* resubmit */ }
///     Err(Error::Io(IoError::Timeout)) => { /* stuck channel, reset */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Initialization error
    Init(InitError),
    /// Transfer error
    Transfer(TransferError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Init(e) => write!(f, "init: {}", e.as_str()),
            Error::Transfer(e) => write!(f, "transfer: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Error::Init(e)
    }
}

impl From<TransferError> for Error {
    fn from(e: TransferError) -> Self {
        Error::Transfer(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for initialization
pub type InitResult<T> = core::result::Result<T, InitError>;

/// Result type alias for transfer admission
pub type TransferResult<T> = core::result::Result<T, TransferError>;

/// Result type alias for bounded waits
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
