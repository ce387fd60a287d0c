use pulse_core::moderation::ContentModerator;

use crate::commands::common::join_text;
use crate::error::CliError;

pub async fn run_moderate(moderator: &ContentModerator, text_parts: &[String]) -> Result<(), CliError> {
    let text = join_text(text_parts).ok_or(CliError::EmptyDescription)?;
    let result = moderator.moderate(&text).await;

    println!("{}", result.clean);
    if result.flagged {
        eprintln!("flagged");
    }
    Ok(())
}
