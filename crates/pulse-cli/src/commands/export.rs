use std::path::Path;

use pulse_core::export::render_markers_export;
use pulse_core::remote::RemoteStore;
use pulse_core::util::now_millis;
use pulse_core::PulseSession;

use crate::cli::ExportFormat;
use crate::commands::common::load_markers;
use crate::error::CliError;

pub async fn run_export<R: RemoteStore>(
    session: &mut PulseSession<R>,
    format: ExportFormat,
    category: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    load_markers(session).await;

    let markers = session.store().apply_filter(category);
    let rendered = render_markers_export(
        &markers,
        session.viewport().resolver(),
        now_millis(),
        format.into(),
    )?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
