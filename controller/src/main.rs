mod host;
mod tank;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
