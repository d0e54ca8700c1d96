//! Echo - typed JSON request/response over TCP.
//!
//! This example demonstrates:
//! - Binding a typed listener on an ephemeral port
//! - Dialing it with a typed client
//! - Exchanging serde structs without touching bytes
//!
//! ```text
//! RUST_LOG=typed_sockets=debug cargo run --example echo
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;
use typed_sockets::codec::Json;
use typed_sockets::{dial_stream, TypedListener};

/// Message carried in both directions.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
struct Echo {
    seq: u32,
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let listener = TypedListener::<Json<Echo>>::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let server = tokio::spawn(async move {
        let mut conn = listener.accept().await?;
        // Without framing, a quiet peer is the end of a message
        conn.set_read_deadline(Instant::now() + Duration::from_millis(200));

        let mut request = Json::<Echo>::default();
        conn.read(&mut request).await?;
        println!("server got: {}", request);

        conn.write(&request).await?;
        Ok::<_, typed_sockets::TypedSocketError>(())
    });

    let mut client = dial_stream::<Json<Echo>>("127.0.0.1", port).await?;
    client
        .write(&Json(Echo {
            seq: 1,
            message: "hello".to_string(),
        }))
        .await?;

    let mut reply = Json::<Echo>::default();
    client.read_from(&mut reply).await?;
    println!("client got: {}", reply);

    server.await??;
    client.close().await?;
    Ok(())
}
