//! Datagram - typed MsgPack values over UDP.
//!
//! ```text
//! cargo run --example datagram
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;
use typed_sockets::codec::MsgPack;
use typed_sockets::{dial_datagram, Connection, ConnectionKind, DatagramStream, TypedConnection};

#[derive(Serialize, Deserialize, Debug, Default)]
struct Sample {
    sensor: String,
    celsius: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let collector = DatagramStream::bind("127.0.0.1:0").await?;
    let port = collector.local_addr()?.port();

    let mut sensor = dial_datagram::<MsgPack<Sample>>("127.0.0.1", port).await?;
    collector.connect(sensor.local_addr()?).await?;
    let mut collector = TypedConnection::<MsgPack<Sample>, _>::new(collector, ConnectionKind::Datagram);

    for reading in [20.5, 21.0, 21.25] {
        sensor
            .write(&MsgPack(Sample {
                sensor: "greenhouse".to_string(),
                celsius: reading,
            }))
            .await?;

        // One datagram per read: stop as soon as the socket goes quiet
        collector.set_read_deadline(Instant::now() + Duration::from_millis(50));
        let mut sample = MsgPack::<Sample>::default();
        collector.read(&mut sample).await?;
        println!("{}", sample);
    }

    Ok(())
}
