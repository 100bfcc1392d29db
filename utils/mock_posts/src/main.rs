use std::env;

use mock_posts::Fault;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::var("MOCK_POSTS_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("🚀 posts API running at http://{}", listener.local_addr()?);

    axum::serve(listener, mock_posts::router(Fault::None)).await?;

    Ok(())
}
