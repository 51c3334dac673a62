//! Fire-and-forget command dispatch.

use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::frame::FrameHandle;

/// Post a command to the editor frame.
///
/// Fire-and-forget: success means the envelope was handed to the frame's
/// message target, not that the peer acted on it.
///
/// # Errors
///
/// [`BridgeError::SendFailed`](crate::BridgeError::SendFailed) when the frame
/// or its message target is missing; nothing else fails here.
pub fn send_command(handle: &FrameHandle, action: &str, data: Value) -> Result<()> {
	handle.post(Envelope::command(action, data))
}

/// Post a command carrying a correlation id.
pub(crate) fn send_command_with_id(
	handle: &FrameHandle,
	action: &str,
	data: Value,
	request_id: u64,
) -> Result<()> {
	handle.post(Envelope::Command {
		action: action.to_owned(),
		data,
		request_id: Some(request_id),
	})
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::envelope::command;
	use crate::error::BridgeError;
	use crate::frame::{FrameInfo, PageFrames};

	fn editor_frame(frames: &mut PageFrames) -> tokio::sync::mpsc::UnboundedReceiver<Envelope> {
		frames.register(FrameInfo {
			element_id: Some("editor-frame".to_owned()),
			container: None,
			src: "https://cdn.example/pptist/index.html".to_owned(),
			loaded: true,
		})
	}

	#[tokio::test]
	async fn command_reaches_the_frame_inbox() {
		let mut frames = PageFrames::new();
		let mut inbox = editor_frame(&mut frames);
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();

		send_command(&handle, command::GOTO_SLIDE, json!({"index": 3})).unwrap();
		assert_eq!(
			inbox.recv().await,
			Some(Envelope::command(command::GOTO_SLIDE, json!({"index": 3})))
		);
	}

	#[tokio::test]
	async fn closed_target_reports_send_failed() {
		let mut frames = PageFrames::new();
		let inbox = editor_frame(&mut frames);
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();
		drop(inbox);

		assert_eq!(
			send_command(&handle, command::TOGGLE_DRAWING, json!(null)),
			Err(BridgeError::SendFailed)
		);
	}
}
