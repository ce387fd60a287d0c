//! Intents sent to the session by the rendering layer and background tasks.

use tokio::sync::mpsc;

use crate::models::{Marker, MarkerId};

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerCommand {
    /// The user asked to delete a marker from its popup.
    Delete { id: MarkerId },
    /// A create that lost the timeout race succeeded later.
    Reconcile { local_id: MarkerId, marker: Marker },
}

pub type CommandSender = mpsc::UnboundedSender<MarkerCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<MarkerCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}
