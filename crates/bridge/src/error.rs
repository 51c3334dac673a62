//! Bridge error taxonomy.

/// A convenient type alias for `Result` with `E` = [`BridgeError`].
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Possible bridge failures.
///
/// None of these are thrown across the message boundary; callers turn them
/// into a user-visible notice after [`RetryPolicy`](crate::RetryPolicy) has
/// had its say.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
	/// No editor frame could be located on the page.
	#[error("no editor frame found on the page")]
	FrameNotFound,
	/// The readiness handshake did not complete in time.
	#[error("editor frame did not answer the readiness handshake")]
	HandshakeTimeout,
	/// The frame or its message target is missing; nothing was posted.
	#[error("message could not be posted to the editor frame")]
	SendFailed,
	/// The presentation load ran out of time.
	#[error("presentation load timed out")]
	LoadTimeout,
	/// The editor reported a `ppt-load-error` for the presentation.
	#[error("editor rejected the presentation load: {0}")]
	LoadRejected(String),
	/// A correlated request saw no matching event before its deadline.
	#[error("request `{0}` timed out")]
	RequestTimeout(String),
	/// The editor answered a correlated request with an error event.
	#[error("editor reported an error for `{action}`: {message}")]
	PeerRejected {
		/// Action of the failing request.
		action: String,
		/// Error message carried by the event.
		message: String,
	},
}
