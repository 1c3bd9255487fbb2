#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lendscope_lib::run().await
}
