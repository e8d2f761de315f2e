//! # Error Handling
//!
//! This module defines the centralized error type for `kustomap`. It uses the
//! `thiserror` library to build a single `Error` enum that covers every failure
//! that can abort a scan, with descriptive, human-readable messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all terminal failures. Each variant carries the
//!   context needed to explain what went wrong (the offending URL, the
//!   manifest path, the rate-limit reset time, ...).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Conditions that must *not* abort a scan (a branch that could not be
//! confirmed, a single unparsable manifest, an unresolved reference, a
//! dangling edge, a cycle) are deliberately absent from this enum. They are
//! reported as [`crate::phases::ScanWarning`] values instead.

use thiserror::Error;

/// Main error type for kustomap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The source URL matched neither of the known hosting-provider shapes.
    #[error("Invalid source URL {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    InvalidSourceUrl {
        url: String,
        message: String,
        /// Optional hint describing the expected URL shape
        hint: Option<String>,
    },

    /// The hosting provider reported an exhausted request quota.
    ///
    /// `reset_at` is the provider-reported reset time as a Unix timestamp,
    /// when the provider sent one.
    #[error("Rate limit exceeded for {provider}{}", reset_at.map(|t| format!(" (quota resets at unix time {})", t)).unwrap_or_default())]
    RateLimitExceeded {
        provider: String,
        reset_at: Option<u64>,
    },

    /// A transient failure (network error or 5xx) persisted after every retry.
    #[error("Provider request failed for {url} after {attempts} attempt(s): {message}")]
    TransientProvider {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The provider rejected the request with a non-retryable client error.
    #[error("Provider request to {url} failed with HTTP {status}: {message}")]
    ProviderRequest {
        url: String,
        status: u16,
        message: String,
    },

    /// The provider answered with a body that could not be understood.
    #[error("Unexpected response from {url}: {message}")]
    ProviderResponse { url: String, message: String },

    /// A manifest could not be decoded into an object.
    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },

    /// No manifest was found anywhere in the scanned scope.
    #[error("No kustomization manifest found in {scope}")]
    NoManifestsFound { scope: String },

    /// The local directory could not be scanned.
    #[error("Local scan error for {path}: {message}")]
    LocalScan { path: String, message: String },

    /// The settings file could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The fetch worker pool could not be started.
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl Error {
    /// Whether the failure is worth another attempt under the retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientProvider { .. } | Error::Io(_))
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
