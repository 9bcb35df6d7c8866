use crate::config::AppConfig;
use crate::database::Database;

pub async fn handle(config: &AppConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    db.close().await;
    println!("Migrations applied");
    Ok(())
}
