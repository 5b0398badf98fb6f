use std::path::Path;

use vgen_sync::check_rsync;
use vgen_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env()?;

    println!("vgen-selfcheck: starting with configuration:");
    for (key, value) in config.describe() {
        println!("  {:<20} {}", key, value);
    }

    let rsync = check_rsync(&config.rsync_bin)?;
    println!("vgen-selfcheck: rsync found at {}", rsync.display());

    ensure_identity_file(&config.ssh_key_path)?;
    ensure_dir(&config.rsync_source).await?;
    if let Some(dir) = config.log.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(dir).await?;
    }

    println!("vgen-selfcheck: ok");
    Ok(())
}

fn ensure_identity_file(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "ssh identity file {} does not exist",
            path.display()
        ));
    }
    Ok(())
}

async fn ensure_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {}", path.display(), e))?;
    Ok(())
}
