//! The wire format shared by every message crossing the frame boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command actions the editor understands.
pub mod command {
	/// Load a presentation from a URL or an inline document.
	pub const LOAD_PPT: &str = "load-ppt";
	/// Step one slide forward or back.
	pub const NAVIGATE: &str = "navigate";
	/// Jump to a slide by index.
	pub const GOTO_SLIDE: &str = "goto-slide";
	/// Toggle the drawing overlay.
	pub const TOGGLE_DRAWING: &str = "toggle-drawing";
	/// Ask the editor for the current presentation document.
	pub const GET_PPT_DATA: &str = "get-ppt-data";
}

/// Event actions the editor emits.
pub mod event {
	/// The editor finished booting and can receive commands.
	pub const INITIALIZED: &str = "initialized";
	/// A presentation load started.
	pub const PPT_LOADING: &str = "ppt-loading";
	/// A presentation load finished.
	pub const PPT_LOADED: &str = "ppt-loaded";
	/// A presentation load failed.
	pub const PPT_LOAD_ERROR: &str = "ppt-load-error";
	/// Reply to [`command::GET_PPT_DATA`].
	pub const PPT_DATA: &str = "ppt-data";
	/// The visible slide changed.
	pub const SLIDE_CHANGE: &str = "slide-change";
}

/// Payload of an [`Envelope::Import`] loopback message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPayload {
	/// File name as presented to the import pipeline.
	pub name: String,
	/// File content, base64 or text depending on the importer.
	pub content: String,
}

/// A message crossing the host/editor boundary.
///
/// The `type` tag and field names are the wire contract and must not change;
/// the editor side matches on them verbatim. `requestId` is optional on both
/// commands and events so peers that never echo it stay compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
	/// Readiness probe, host to editor.
	#[serde(rename = "ping")]
	Ping,
	/// Readiness reply, editor to host.
	#[serde(rename = "pong")]
	Pong,
	/// A command, host to editor.
	#[serde(rename = "pptist-command")]
	Command {
		/// Command action name, see [`command`].
		action: String,
		/// Command payload.
		#[serde(default, skip_serializing_if = "Value::is_null")]
		data: Value,
		/// Correlation id echoed back by the editor's reply event.
		#[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
		request_id: Option<u64>,
	},
	/// An event, editor to host.
	#[serde(rename = "pptist-event")]
	Event {
		/// Event action name, see [`event`].
		action: String,
		/// Event payload.
		#[serde(default, skip_serializing_if = "Value::is_null")]
		data: Value,
		/// Error message when the event reports a failure.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		error: Option<String>,
		/// Correlation id copied from the originating command.
		#[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
		request_id: Option<u64>,
	},
	/// File import loopback, host to itself.
	#[serde(rename = "IMPORT_FILE")]
	Import {
		/// The file being imported.
		data: ImportPayload,
	},
}

impl Envelope {
	/// Build a command envelope without a correlation id.
	pub fn command(action: impl Into<String>, data: Value) -> Self {
		Self::Command {
			action: action.into(),
			data,
			request_id: None,
		}
	}

	/// Build an event envelope without a correlation id.
	pub fn event(action: impl Into<String>, data: Value) -> Self {
		Self::Event {
			action: action.into(),
			data,
			error: None,
			request_id: None,
		}
	}

	/// View this envelope as an event, if it is one.
	pub fn as_event(&self) -> Option<EventFrame> {
		match self {
			Self::Event {
				action,
				data,
				error,
				request_id,
			} => Some(EventFrame {
				action: action.clone(),
				data: data.clone(),
				error: error.clone(),
				request_id: *request_id,
			}),
			_ => None,
		}
	}
}

/// An editor event as observed by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
	/// Event action name.
	pub action: String,
	/// Event payload.
	pub data: Value,
	/// Error message when the event reports a failure.
	pub error: Option<String>,
	/// Correlation id echoed from the originating command.
	pub request_id: Option<u64>,
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn ping_wire_shape() {
		let wire = serde_json::to_value(Envelope::Ping).unwrap();
		assert_eq!(wire, json!({"type": "ping"}));
	}

	#[test]
	fn command_wire_shape() {
		let env = Envelope::command(command::NAVIGATE, json!({"direction": "next"}));
		let wire = serde_json::to_value(&env).unwrap();
		assert_eq!(
			wire,
			json!({
				"type": "pptist-command",
				"action": "navigate",
				"data": {"direction": "next"},
			})
		);
	}

	#[test]
	fn request_id_omitted_when_absent() {
		let wire = serde_json::to_value(Envelope::command(command::TOGGLE_DRAWING, json!(null)))
			.unwrap();
		assert!(wire.get("requestId").is_none());
		assert!(wire.get("data").is_none());
	}

	#[test]
	fn event_roundtrip_with_error() {
		let wire = json!({
			"type": "pptist-event",
			"action": "ppt-load-error",
			"error": "bad file",
			"requestId": 7,
		});
		let env: Envelope = serde_json::from_value(wire).unwrap();
		let frame = env.as_event().unwrap();
		assert_eq!(frame.action, event::PPT_LOAD_ERROR);
		assert_eq!(frame.error.as_deref(), Some("bad file"));
		assert_eq!(frame.request_id, Some(7));
	}

	#[test]
	fn import_wire_shape() {
		let env = Envelope::Import {
			data: ImportPayload {
				name: "deck.pptx".into(),
				content: "AAAA".into(),
			},
		};
		let wire = serde_json::to_value(&env).unwrap();
		assert_eq!(
			wire,
			json!({
				"type": "IMPORT_FILE",
				"data": {"name": "deck.pptx", "content": "AAAA"},
			})
		);
	}
}
