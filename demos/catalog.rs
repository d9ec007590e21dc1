use std::sync::Arc;

use serde::Deserialize;
use storefront_http::{
    AuthToken, Backends, RequestDescriptor, RetryPolicy, SharedCredentials, TracingNotifier,
};

#[derive(Debug, Deserialize)]
struct Game {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let credentials = SharedCredentials::new();
    if let Ok(token) = std::env::var("STOREFRONT_ACCESS_TOKEN") {
        credentials.set(AuthToken::new("Bearer ", token));
    }

    let backends = Backends::from_env(Arc::new(credentials), Arc::new(TracingNotifier))?;

    let page = backends
        .catalog
        .get_page::<Game>("/games", &[("page", "1"), ("page_size", "20")])
        .await?;
    if page.is_empty() {
        println!("catalog returned no games");
    }
    for game in page.items() {
        println!("{} {}", game.id, game.name);
    }

    let ticket = RequestDescriptor::post("/tickets/1/answer").text("Thanks for reaching out!");
    let response = backends
        .core
        .send_with_policy(&ticket, &RetryPolicy::never())
        .await?;
    println!("answer submitted: {}", response.status);

    Ok(())
}
