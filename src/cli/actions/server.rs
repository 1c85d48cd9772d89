use crate::api::{self, handlers::verify::VerifyConfig};
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            database,
            bot_username,
        } => {
            let dsn = database.dsn()?;

            let config = VerifyConfig::new(bot_username);

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}
