use tokio::process::Command;

use crate::settings::Config;

pub async fn db_migrate(config: &Config) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("run")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await
        .unwrap();
}

pub async fn db_revert(config: &Config) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("revert")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await
        .unwrap();
}
