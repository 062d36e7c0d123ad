use anyhow::Context;
use url::Url;

use gridline::client;
use gridline::http::request::Method;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8080/".to_string());
    let url = Url::parse(&target).with_context(|| format!("invalid URL {}", target))?;

    let response = client::fetch(Method::GET, &url, &[]).await?;

    println!("{} {}", response.head.protocol, response.head.status.as_u16());
    for (key, value) in &response.head.fields {
        println!("{}: {}", key, value);
    }
    println!();
    println!("{}", String::from_utf8_lossy(&response.body));

    Ok(())
}
