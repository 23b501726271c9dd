//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    if settings.database_url.is_none() {
        settings.ensure_directories()?;
    }

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let tables = ctx.list_tables().await?;
    tracing::debug!("Schema ready: {}", tables.join(", "));

    println!(
        "{} Initialized database at {}",
        style("✓").green(),
        ctx.pool().database_url()
    );

    Ok(())
}
