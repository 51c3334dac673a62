//! Readiness handshake between the host page and the editor frame.

use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::envelope::{Envelope, event};
use crate::frame::FrameHandle;
use crate::session::BridgeSession;

/// Readiness handshake configuration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
	/// How long to wait for a `pong` or `initialized` reply.
	pub timeout: Duration,
	/// Treat a loaded-but-silent frame as ready when the probe times out.
	///
	/// This favors availability over strict correctness: an editor build
	/// that never learned to answer pings still gets commands. Disable to
	/// require an actual reply.
	pub optimistic_readiness: bool,
}

impl Default for ProbeConfig {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(2),
			optimistic_readiness: true,
		}
	}
}

/// Wait until the editor frame can receive commands.
///
/// Returns `true` immediately when the session latch is already set. With no
/// frame, or a frame whose document has not loaded, returns `false` without
/// sending anything. Otherwise sends a `ping` and accepts either a `pong` or
/// an `initialized` event as success, latching the session. On timeout the
/// result follows [`ProbeConfig::optimistic_readiness`]; the optimistic
/// `true` does not latch, so a later call probes again.
pub async fn wait_for_ready(
	session: &BridgeSession,
	handle: Option<&FrameHandle>,
	config: &ProbeConfig,
) -> bool {
	if session.ready_latch() {
		return true;
	}
	let Some(handle) = handle else {
		debug!("readiness probe skipped: no editor frame");
		return false;
	};
	if !handle.is_loaded() {
		debug!(src = %handle.src(), "readiness probe skipped: frame not loaded");
		return false;
	}

	// Subscribe before posting so a fast reply cannot slip past us.
	let mut events = session.events();
	if handle.post(Envelope::Ping).is_err() {
		warn!(src = %handle.src(), "readiness probe failed: frame target gone");
		return false;
	}
	session.mark_probe_sent();

	let deadline = Instant::now() + config.timeout;
	loop {
		let Ok(received) = timeout_at(deadline, events.next()).await else {
			// The frame is loaded but silent.
			if config.optimistic_readiness {
				debug!("readiness probe timed out; assuming ready (loaded frame)");
				return true;
			}
			debug!("readiness probe timed out");
			return false;
		};
		match received {
			Some(Envelope::Pong) => {
				session.latch_ready();
				return true;
			}
			Some(Envelope::Event { action, .. }) if action == event::INITIALIZED => {
				session.latch_ready();
				return true;
			}
			Some(_) => {}
			None => return false,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::frame::{FrameInfo, PageFrames};

	fn frame_info(loaded: bool) -> FrameInfo {
		FrameInfo {
			element_id: Some("editor-frame".to_owned()),
			container: None,
			src: "https://cdn.example/pptist/index.html".to_owned(),
			loaded,
		}
	}

	#[tokio::test]
	async fn pong_within_timeout_latches() {
		let session = BridgeSession::new();
		let mut frames = PageFrames::new();
		let mut inbox = frames.register(frame_info(true));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		let probe_config = ProbeConfig::default();
		let probe = wait_for_ready(&session, Some(&handle), &probe_config);
		let peer = async {
			// Answer the ping once it shows up in the frame inbox.
			assert_eq!(inbox.recv().await, Some(Envelope::Ping));
			session.deliver(Envelope::Pong);
		};
		let (ready, ()) = tokio::join!(probe, peer);
		assert!(ready);
		assert!(session.ready_latch());
		assert_eq!(session.state(), crate::BridgeState::Ready);
	}

	#[tokio::test]
	async fn latched_session_skips_the_handshake() {
		let session = BridgeSession::new();
		session.deliver(Envelope::Pong);
		let mut frames = PageFrames::new();
		let mut inbox = frames.register(frame_info(true));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		assert!(wait_for_ready(&session, Some(&handle), &ProbeConfig::default()).await);
		// No ping was sent for the short-circuited call.
		assert!(inbox.try_recv().is_err());
	}

	#[tokio::test]
	async fn initialized_event_counts_as_success() {
		let session = BridgeSession::new();
		let mut frames = PageFrames::new();
		let mut inbox = frames.register(frame_info(true));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		let probe_config = ProbeConfig::default();
		let probe = wait_for_ready(&session, Some(&handle), &probe_config);
		let peer = async {
			assert_eq!(inbox.recv().await, Some(Envelope::Ping));
			session.deliver(Envelope::event(event::INITIALIZED, json!(null)));
		};
		let (ready, ()) = tokio::join!(probe, peer);
		assert!(ready);
		assert!(session.ready_latch());
	}

	#[tokio::test(start_paused = true)]
	async fn loaded_but_silent_frame_is_optimistically_ready() {
		let session = BridgeSession::new();
		let mut frames = PageFrames::new();
		let _inbox = frames.register(frame_info(true));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		assert!(wait_for_ready(&session, Some(&handle), &ProbeConfig::default()).await);
		// Optimistic success does not latch; the next call probes again.
		assert!(!session.ready_latch());
		assert_eq!(session.state(), crate::BridgeState::ProbeSent);
	}

	#[tokio::test(start_paused = true)]
	async fn strict_policy_reports_silence_as_not_ready() {
		let session = BridgeSession::new();
		let mut frames = PageFrames::new();
		let _inbox = frames.register(frame_info(true));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		let config = ProbeConfig {
			optimistic_readiness: false,
			..ProbeConfig::default()
		};
		assert!(!wait_for_ready(&session, Some(&handle), &config).await);
	}

	#[tokio::test]
	async fn absent_frame_is_not_ready() {
		let session = BridgeSession::new();
		assert!(!wait_for_ready(&session, None, &ProbeConfig::default()).await);
	}

	#[tokio::test]
	async fn unloaded_frame_is_not_ready() {
		let session = BridgeSession::new();
		let mut frames = PageFrames::new();
		let _inbox = frames.register(frame_info(false));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();
		assert!(!wait_for_ready(&session, Some(&handle), &ProbeConfig::default()).await);
	}
}
