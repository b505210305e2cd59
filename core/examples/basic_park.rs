// park/examples/basic_park.rs

use park::{from_iter, Park, ParkConfig, ParkError, Payload, StageContext};
use tracing::info;

// Each order is priced, then checked against a credit limit.
#[derive(Clone, Debug, Default)]
struct Order {
  id: u32,
  quantity: u32,
  unit_price: u32,
  total: u32,
}

#[tokio::main]
async fn main() -> Result<(), ParkError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Park Example ---");

  let config = ParkConfig::builder()
    .lanes(3)
    .stage("price", |_ctx: StageContext, order: Payload<Order>| async move {
      let mut order = order.write();
      order.total = order.quantity * order.unit_price;
      Ok::<_, anyhow::Error>(())
    })
    .stage("credit_check", |ctx: StageContext, order: Payload<Order>| async move {
      let total = order.read().total;
      if total > 500 {
        anyhow::bail!("order total {total} is over the credit limit");
      }
      info!(lane = ctx.lane, item = %ctx.item, total, "Order approved.");
      Ok(())
    })
    .listener(|ev| {
      let progress = ev.progress;
      info!(
        "Progress: {}/{} finished",
        progress.finished(),
        progress.total.map_or("?".to_string(), |t| t.to_string())
      );
    })
    .build()?;

  let park = Park::with_config(config);
  let orders: Vec<Order> = (1..=10)
    .map(|id| Order {
      id,
      quantity: id,
      unit_price: 60,
      ..Default::default()
    })
    .collect();

  let outputs = park.start(from_iter(orders))?;
  let (approved, rejected) = outputs.collect().await;
  park.wait(None).await?;

  for item in &approved {
    let order = item.payload().read();
    info!("Approved order {} for {}", order.id, order.total);
  }
  for item in &rejected {
    let order = item.payload().read();
    if let Some(err) = item.error() {
      info!("Rejected order {}: {}", order.id, err);
    }
  }

  info!(
    "Park finished as {}: {} approved, {} rejected",
    park.status(),
    park.succeeded(),
    park.failed()
  );
  Ok(())
}
