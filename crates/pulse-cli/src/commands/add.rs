use pulse_core::remote::RemoteStore;
use pulse_core::submission::SubmissionOutcome;
use pulse_core::{Coordinate, MarkerDraft, PulseSession, Urgency};

use crate::commands::common::{join_text, load_markers, print_notice};
use crate::error::CliError;

/// Fields collected from `pulse add`.
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub coordinate: Coordinate,
    pub category: String,
    pub urgency: Urgency,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub anonymous: bool,
    pub description: Vec<String>,
}

impl AddArgs {
    pub fn into_draft(self) -> Result<MarkerDraft, CliError> {
        let description = join_text(&self.description).ok_or(CliError::EmptyDescription)?;
        let mut draft = MarkerDraft::new(self.category, description, self.coordinate)
            .with_urgency(self.urgency);
        if let Some(title) = self.title.filter(|title| !title.trim().is_empty()) {
            draft = draft.with_title(title);
        }
        draft.tags = self
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        draft.anonymous = self.anonymous;
        Ok(draft)
    }
}

pub async fn run_add<R: RemoteStore>(
    session: &mut PulseSession<R>,
    args: AddArgs,
) -> Result<(), CliError> {
    let draft = args.into_draft()?;
    load_markers(session).await;

    let (outcome, notice) = session.submit(draft).await;
    match outcome {
        SubmissionOutcome::Rejected { error, .. } => Err(CliError::Rejected(error.user_message())),
        SubmissionOutcome::Confirmed(marker) | SubmissionOutcome::LocalFallback { marker, .. } => {
            let region = &session.viewport().resolver().resolve(&marker.coordinate).name;
            println!("{}  {region}", marker.id);
            print_notice(&notice);
            Ok(())
        }
    }
}
