//! Correlated request/response over the one-way command channel.
//!
//! A correlated request is a command whose completion is observed via a
//! later asynchronous event rather than a direct return value. Each send
//! allocates a unique correlation id that the editor echoes back on its
//! reply event; matching is by id when the echo is present, so concurrent
//! requests for the same action cannot consume each other's responses.
//! Peers that never echo ids fall back to the caller's action-family
//! predicate, preserving the original wire contract.

use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::channel::send_command_with_id;
use crate::envelope::EventFrame;
use crate::error::{BridgeError, Result};
use crate::frame::FrameHandle;
use crate::session::BridgeSession;

/// Send a command and wait for its terminal reply event.
///
/// `matcher` selects the terminal events of the command's action family
/// (e.g. both the loaded and the load-error event for a load command). The
/// first event that satisfies the matcher and carries either our
/// correlation id or no id at all settles the call; later duplicates are
/// no-ops. The subscription is released exactly once, on success, rejection
/// or timeout alike. The matched frame is returned so the caller can tell
/// apart the terminal events it asked for.
///
/// # Errors
///
/// * [`BridgeError::SendFailed`] when the command cannot be posted.
/// * [`BridgeError::PeerRejected`] when the matched event carries an error.
/// * [`BridgeError::RequestTimeout`] when no event matches in time.
pub async fn send_awaiting(
	session: &BridgeSession,
	handle: &FrameHandle,
	action: &str,
	data: Value,
	matcher: impl Fn(&EventFrame) -> bool,
	timeout: Duration,
) -> Result<EventFrame> {
	let request_id = session.next_request_id();
	// Subscribe before sending so the reply cannot arrive unobserved.
	let mut events = session.events();
	send_command_with_id(handle, action, data, request_id)?;
	debug!(action, request_id, "correlated request sent");

	let deadline = Instant::now() + timeout;
	loop {
		let Ok(received) = timeout_at(deadline, events.next_event()).await else {
			warn!(action, request_id, "correlated request timed out");
			return Err(BridgeError::RequestTimeout(action.to_owned()));
		};
		let Some(frame) = received else {
			return Err(BridgeError::RequestTimeout(action.to_owned()));
		};
		if !matcher(&frame) {
			continue;
		}
		// An id echo for a different request is someone else's reply.
		if frame.request_id.is_some_and(|echoed| echoed != request_id) {
			continue;
		}
		return match frame.error {
			Some(message) => Err(BridgeError::PeerRejected {
				action: frame.action,
				message,
			}),
			None => Ok(frame),
		};
	}
}
