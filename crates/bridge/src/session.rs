//! Per-page bridge session state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::envelope::{Envelope, EventFrame};

/// Capacity of the inbound event hub.
///
/// Subscribers that fall further behind than this skip the overwritten
/// events instead of blocking the host page.
const EVENT_HUB_CAPACITY: usize = 64;

/// Bridge lifecycle state.
///
/// The state only moves forward; once [`Ready`](Self::Ready) it never
/// reverts within the same page lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BridgeState {
	/// No probe has been sent yet.
	Uninitialized,
	/// A probe was sent and no reply has arrived.
	ProbeSent,
	/// The editor answered a probe or announced itself.
	Ready,
}

/// One bridge session per host page.
///
/// Created on first use and lives for the page's lifetime; it is never
/// explicitly destroyed. Holds the forward-only state machine, the sticky
/// readiness latch, the inbound event hub, and the correlation-id counter.
#[derive(Debug)]
pub struct BridgeSession {
	state_tx: watch::Sender<BridgeState>,
	ready_latch: AtomicBool,
	last_probe_at: Mutex<Option<Instant>>,
	inbound_tx: broadcast::Sender<Envelope>,
	next_request_id: AtomicU64,
}

impl Default for BridgeSession {
	fn default() -> Self {
		Self::new()
	}
}

impl BridgeSession {
	/// Create a fresh session in [`BridgeState::Uninitialized`].
	pub fn new() -> Self {
		let (state_tx, _) = watch::channel(BridgeState::Uninitialized);
		let (inbound_tx, _) = broadcast::channel(EVENT_HUB_CAPACITY);
		Self {
			state_tx,
			ready_latch: AtomicBool::new(false),
			last_probe_at: Mutex::new(None),
			inbound_tx,
			next_request_id: AtomicU64::new(1),
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> BridgeState {
		*self.state_tx.borrow()
	}

	/// Subscribe to lifecycle state changes.
	pub fn subscribe_state(&self) -> watch::Receiver<BridgeState> {
		self.state_tx.subscribe()
	}

	/// Wait until the session is [`Ready`](BridgeState::Ready).
	///
	/// Resolves immediately when readiness was already reached. There is no
	/// polling: the peer's `pong`/`initialized` announcement pushes the
	/// state change that wakes this future.
	pub async fn ready(&self) {
		let mut state_rx = self.state_tx.subscribe();
		loop {
			let state = *state_rx.borrow_and_update();
			if state == BridgeState::Ready {
				return;
			}
			if state_rx.changed().await.is_err() {
				return;
			}
		}
	}

	/// Advance the lifecycle state.
	///
	/// Backward transitions are ignored; the state machine only moves
	/// `Uninitialized → ProbeSent → Ready`.
	pub(crate) fn advance(&self, next: BridgeState) {
		self.state_tx.send_if_modified(|state| {
			if next > *state {
				*state = next;
				true
			} else {
				false
			}
		});
	}

	/// Whether the editor ever completed a handshake.
	///
	/// Sticky: once set it stays set for the page lifetime.
	pub fn ready_latch(&self) -> bool {
		self.ready_latch.load(Ordering::Acquire)
	}

	/// Latch readiness after a successful handshake.
	pub(crate) fn latch_ready(&self) {
		self.ready_latch.store(true, Ordering::Release);
		self.advance(BridgeState::Ready);
	}

	/// Record that a probe was just sent.
	pub(crate) fn mark_probe_sent(&self) {
		*self.last_probe_at.lock() = Some(Instant::now());
		self.advance(BridgeState::ProbeSent);
	}

	/// When the last probe was sent, if any.
	pub fn last_probe_at(&self) -> Option<Instant> {
		*self.last_probe_at.lock()
	}

	/// Allocate a correlation id for an outgoing command.
	pub(crate) fn next_request_id(&self) -> u64 {
		self.next_request_id.fetch_add(1, Ordering::Relaxed)
	}

	/// Deliver an inbound envelope from the editor frame (or a loopback
	/// message from the host itself) to every subscriber.
	///
	/// A `pong` or `initialized` arriving here also latches readiness, so a
	/// peer that announces itself unprompted is recognized without a probe.
	pub fn deliver(&self, envelope: Envelope) {
		match &envelope {
			Envelope::Pong => self.latch_ready(),
			Envelope::Event { action, .. } if action == crate::event::INITIALIZED => {
				self.latch_ready();
			}
			_ => {}
		}
		// Send only fails when no subscriber exists, which is fine for
		// fire-and-forget delivery.
		if self.inbound_tx.send(envelope).is_err() {
			debug!("inbound envelope dropped: no subscribers");
		}
	}

	/// Subscribe to inbound envelopes.
	///
	/// Dropping the stream is the unsubscribe; there is no separate removal
	/// step to forget on the timeout path.
	pub fn events(&self) -> EventStream {
		EventStream {
			rx: self.inbound_tx.subscribe(),
		}
	}
}

/// Subscription to the session's inbound envelopes.
///
/// Each stream observes envelopes in arrival order, starting from the moment
/// of subscription. Dropping the stream releases the subscription.
#[derive(Debug)]
pub struct EventStream {
	rx: broadcast::Receiver<Envelope>,
}

impl EventStream {
	/// Next inbound envelope, or `None` when the session is gone.
	pub async fn next(&mut self) -> Option<Envelope> {
		loop {
			match self.rx.recv().await {
				Ok(envelope) => return Some(envelope),
				Err(broadcast::error::RecvError::Lagged(skipped)) => {
					warn!(skipped, "event subscriber lagged behind the hub");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Next editor event, skipping non-event envelopes.
	pub async fn next_event(&mut self) -> Option<EventFrame> {
		loop {
			let envelope = self.next().await?;
			if let Some(frame) = envelope.as_event() {
				return Some(frame);
			}
		}
	}
}
