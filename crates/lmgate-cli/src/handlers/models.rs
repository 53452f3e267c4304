//! `lmgate models`: one-shot model listing.

use crate::bootstrap::build_client;
use crate::commands::UpstreamArgs;
use crate::error::CliError;

pub async fn execute(args: &UpstreamArgs) -> Result<(), CliError> {
    let client = build_client(args, None)?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No chat models available");
        return Ok(());
    }
    for model in models {
        println!("{}  {}  {}", model.id, model.vendor, model.family);
    }
    Ok(())
}
