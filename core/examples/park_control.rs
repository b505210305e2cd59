// park/examples/park_control.rs

use park::{Park, ParkConfig, ParkError, Payload, StageContext, Status};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ParkError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Park Control Example ---");

  let config = ParkConfig::builder()
    .lanes(2)
    .stage("slow_square", |_ctx: StageContext, p: Payload<u64>| async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      let mut value = p.write();
      *value *= *value;
      Ok::<_, anyhow::Error>(())
    })
    .build()?;
  let park = Park::with_config(config);

  // A channel keeps the park open until the sender is dropped or the park is stopped.
  let (tx, rx) = mpsc::channel::<u64>(8);
  let mut outputs = park.start(rx)?;

  let producer = tokio::spawn(async move {
    for n in 0.. {
      if tx.send(n).await.is_err() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  });

  tokio::time::sleep(Duration::from_millis(100)).await;
  park.pause()?;
  info!(submitted = park.submitted(), "Paused.");
  tokio::time::sleep(Duration::from_millis(100)).await;
  park.resume()?;
  info!("Resumed.");
  tokio::time::sleep(Duration::from_millis(100)).await;

  park.shutdown()?;
  while let Some(item) = outputs.next_succeeded().await {
    info!(item = %item.id(), value = *item.payload().read(), "Squared.");
  }
  park.wait(Some(Duration::from_secs(5))).await?;
  producer.abort();

  assert_eq!(park.status(), Status::Closed);
  info!(progress = ?park.progress(), "Park closed.");

  park.reset().await?;
  info!(status = %park.status(), "Park reset and ready for another run.");
  Ok(())
}
