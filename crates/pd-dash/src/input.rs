//! Asynchronous input requests.
//!
//! Core logic that needs free text from the user (note edits) sends an
//! [`InputRequest`] and awaits the reply instead of blocking on a prompt.
//! Whatever drives the UI owns the [`InputReceiver`] and answers each request
//! with `Some(text)` or `None` for cancel. A dropped reply sender is a cancel.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// One pending question for the user.
#[derive(Debug)]
pub struct InputRequest {
    pub prompt: String,
    /// Pre-filled value (e.g. the current notes).
    pub initial: String,
    reply: oneshot::Sender<Option<String>>,
}

impl InputRequest {
    /// Answer the request. `None` cancels.
    pub fn respond(self, answer: Option<String>) {
        let _ = self.reply.send(answer);
    }

    pub fn cancel(self) {
        self.respond(None);
    }
}

/// Receiving side, owned by the UI.
pub type InputReceiver = mpsc::Receiver<InputRequest>;

/// Sending side, cloned into whatever needs to ask.
#[derive(Debug, Clone)]
pub struct Prompter {
    tx: mpsc::Sender<InputRequest>,
}

impl Prompter {
    /// Ask the user and wait for an answer. Returns `None` on cancel, or if
    /// no UI is listening.
    pub async fn ask(&self, prompt: impl Into<String>, initial: impl Into<String>) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        let request = InputRequest { prompt: prompt.into(), initial: initial.into(), reply };
        if self.tx.send(request).await.is_err() {
            debug!("[input] no responder attached");
            return None;
        }
        answer.await.ok().flatten()
    }
}

/// Create a prompter and its receiver.
pub fn prompt_channel(buffer: usize) -> (Prompter, InputReceiver) {
    let (tx, rx) = mpsc::channel(buffer);
    (Prompter { tx }, rx)
}
