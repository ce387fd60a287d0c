use pulse_core::remote::RemoteStore;
use pulse_core::{MarkerId, PulseSession};

use crate::commands::common::load_markers;
use crate::error::CliError;

pub async fn run_delete<R: RemoteStore>(
    session: &mut PulseSession<R>,
    id: &str,
) -> Result<(), CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::EmptyMarkerId);
    }
    let id = MarkerId::new(id);

    load_markers(session).await;
    match session.delete_marker(&id).await {
        Ok(Some(marker)) => println!("{}", marker.id),
        Ok(None) => println!("{id} (already removed)"),
        Err(error) => return Err(CliError::Core(error.into())),
    }
    Ok(())
}
