//! Minimal end-to-end tour of the brain API over the in-memory store.
//!
//! Run with `cargo run -p botbrain --example quotes`.

use std::sync::Arc;

use serde_json::json;

use botbrain::{Brain, BrainConfig, UserContext};
use botbrain_store::MemoryStore;

#[tokio::main]
async fn main() -> botbrain::BrainResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = BrainConfig::from_env_lookup(|var| std::env::var(var).ok())?;
    let brain = Brain::new(config, Arc::new(MemoryStore::new()))?;

    // Scalar and list data under the application namespace.
    brain.set("motd", &json!("be excellent to each other")).await?;
    brain.rpush("quotes", &json!({"by": "alice", "text": "ship it"})).await?;
    brain.rpush("quotes", &json!({"by": "bob", "text": "works on my machine"})).await?;

    println!("motd   = {}", brain.get("motd").await?);
    println!("quotes = {:?}", brain.lgetall("quotes").await?);
    println!("keys   = {:?}", brain.keys("").await?);

    // The user directory lives outside the data tree.
    let alice = brain
        .user_for_id("u1", Some(&UserContext::in_room("general")))
        .await?;
    println!("user   = {} in {:?}", alice.name, alice.room);
    println!("fuzzy  = {:?}", brain.users_for_fuzzy_name("u").await?.len());

    // reset() clears data keys but leaves the directory alone.
    brain.reset().await?;
    println!("after reset: keys = {:?}, users = {}",
        brain.keys("").await?,
        brain.users().await?.len());

    brain.close().await
}
