//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be grepped in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CFG_xxx: Configuration errors (fatal, raised before any network call)
//! - TOKEN_xxx: Request / token errors
//! - FORK_xxx, SIM_xxx: Simulation provider errors
//! - RPC_xxx, UPSTREAM_xxx: Transport and third-party API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing API key / credential
    ConfigMissingApiKey,
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Unsupported chain identifier
    ConfigUnsupportedChain,

    // ============================================
    // Request / Token Errors
    // ============================================
    /// Invalid request parameters
    ApiBadRequest,
    /// Invalid token or wallet address
    TokenInvalidAddress,
    /// Pair index knows no pool for the token
    TokenNoLiquidity,

    // ============================================
    // Simulation Errors
    // ============================================
    /// Fork could not be created
    ForkProvisionFailed,
    /// A simulated leg reverted or was refused
    SimulationRejected,
    /// Simulation produced unusable numbers
    SimulationFailed,

    // ============================================
    // Transport / External Service Errors
    // ============================================
    /// JSON-RPC endpoint returned an error
    RpcError,
    /// JSON-RPC endpoint returned something we could not decode
    RpcInvalidResponse,
    /// Third-party HTTP API answered with a non-success status
    UpstreamApiError,
    /// External service timeout
    ExternalTimeout,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigUnsupportedChain => "CFG_UNSUPPORTED_CHAIN",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::TokenInvalidAddress => "TOKEN_INVALID_ADDRESS",
            Self::TokenNoLiquidity => "TOKEN_NO_LIQUIDITY",

            Self::ForkProvisionFailed => "FORK_PROVISION_FAILED",
            Self::SimulationRejected => "SIM_REJECTED",
            Self::SimulationFailed => "SIM_FAILED",

            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",
            Self::UpstreamApiError => "UPSTREAM_API_ERROR",
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Designed honeypot signal rather than a service failure
    pub fn is_terminal_signal(&self) -> bool {
        matches!(self, Self::TokenNoLiquidity)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Missing API key
    pub fn missing_api_key(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingApiKey,
            format!("Missing API key: {}", key_name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Unsupported chain
    pub fn unsupported_chain(chain: &str) -> Self {
        Self::new(
            ErrorCode::ConfigUnsupportedChain,
            format!("Unsupported chain: {}", chain),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Invalid token address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenInvalidAddress, msg)
    }

    /// Pair index returned no pools
    pub fn no_liquidity() -> Self {
        Self::new(
            ErrorCode::TokenNoLiquidity,
            "No liquidity pools found for this token.",
        )
    }

    /// Fork provider refused to create a fork
    pub fn fork_provision(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ForkProvisionFailed, msg)
    }

    /// Simulated leg rejected
    pub fn simulation_rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SimulationRejected, msg)
    }

    /// Simulation failed (generic)
    pub fn simulation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SimulationFailed, msg)
    }

    /// JSON-RPC error
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    /// Undecodable JSON-RPC response
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    /// Third-party API failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamApiError, msg)
    }

    /// Timeout
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalTimeout, msg)
    }
}

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExternalTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcError, "Connection failed")
        } else if err.is_decode() {
            Self::new(ErrorCode::RpcInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

impl From<alloy_sol_types::Error> for AppError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::new(
            ErrorCode::RpcInvalidResponse,
            format!("ABI decode error: {}", err),
        )
    }
}
