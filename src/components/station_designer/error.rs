//! Error types for the designer's persistence and viewport seams.

use thiserror::Error;

/// Errors surfaced at a designer action boundary.
///
/// The `Display` text is what the user sees in the alert.
#[derive(Error, Debug)]
pub enum DesignerError {
	/// No user is logged in.
	#[error("Please log in to save or load designs.")]
	NotLoggedIn,

	/// An update was requested before any design was created or loaded.
	#[error("Select a design first!")]
	NoDesignSelected,

	/// Save-as-new was requested with a blank name.
	#[error("Please enter a design name.")]
	EmptyDesignName,

	/// The backend could not be reached or rejected the request.
	#[error("Request failed: {0}")]
	Transport(#[from] TransportError),

	/// The backend answered with something that is not a design.
	#[error("Unexpected response: {0}")]
	Payload(#[from] PayloadError),
}

/// Failures talking to the remote store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
	/// Network-level failure (DNS, CORS, connection reset).
	#[error("network error: {0}")]
	Request(String),

	/// Non-2xx HTTP status.
	#[error("server responded with status {status}")]
	Status { status: u16, body: String },

	/// The request body could not be serialized.
	#[error("could not encode request: {0}")]
	Encode(String),
}

/// Why a payload field could not be decoded into a list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
	#[error("field is missing or null")]
	Missing,

	#[error("field is not an array")]
	NotAnArray,

	#[error("field is a string but not valid JSON: {0}")]
	InvalidJson(String),

	#[error("array item could not be decoded: {0}")]
	InvalidItem(String),
}

/// Why the viewport centre could not be projected into canvas space.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
	#[error("canvas is not initialized")]
	NotInitialized,

	#[error("viewport has no usable size or scale")]
	Degenerate,
}
