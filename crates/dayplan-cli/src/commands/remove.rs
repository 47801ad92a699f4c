use anyhow::{bail, Result};

use super::{context, refresh_cache};

pub async fn run(id: String) -> Result<()> {
    let ctx = context()?;

    if !ctx.api.delete_task(&id).await? {
        bail!("no task with id {id}");
    }
    println!("Removed {id}");

    refresh_cache(&ctx.api, &ctx.cache).await;
    Ok(())
}
