use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::taskoj::{new, store::Store};
use anyhow::Result;
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, db } => {
            let key = globals.signing_key()?;

            let store = Store::open(&db).await?;

            info!("Listening on port {port}, database {db}");

            new(port, store, key).await?;
        }
    }

    Ok(())
}
