use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gis_cli::main_entry().await
}
