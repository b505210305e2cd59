// park/src/core/stage.rs

//! Defines a single stage of the chain and the function type that implements it.

use crate::core::item::ItemId;
use crate::core::payload::Payload;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a stage function.
///
/// A stage receives the invocation context and a handle to the item's payload,
/// mutates the payload in place and resolves to `Ok(())` to pass the item on,
/// or to an error to route it to the failure sink.
///
/// Stage functions are shared by every lane, hence `Arc` and `Sync`.
pub type StageFn<T> =
  Arc<dyn Fn(StageContext, Payload<T>) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send + Sync>;

/// Wraps a user closure into a `StageFn`, converting its error type into `anyhow::Error`.
pub fn stage_fn<T, F, Fut, E>(f: F) -> StageFn<T>
where
  T: Send + Sync + 'static,
  F: Fn(StageContext, Payload<T>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), E>> + Send + 'static,
  E: Into<anyhow::Error> + 'static,
{
  Arc::new(move |ctx, payload| {
    let user_fut = f(ctx, payload);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

/// A named stage in the chain.
pub struct StageDef<T: Send + Sync + 'static> {
  pub name: Arc<str>,
  pub handler: StageFn<T>,
}

impl<T: Send + Sync + 'static> StageDef<T> {
  pub fn new<F, Fut, E>(name: impl Into<String>, handler: F) -> Self
  where
    F: Fn(StageContext, Payload<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<anyhow::Error> + 'static,
  {
    Self {
      name: Arc::from(name.into()),
      handler: stage_fn(handler),
    }
  }
}

impl<T: Send + Sync + 'static> Clone for StageDef<T> {
  fn clone(&self) -> Self {
    Self {
      name: Arc::clone(&self.name),
      handler: Arc::clone(&self.handler),
    }
  }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StageDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StageDef").field("name", &self.name).finish()
  }
}

/// What a stage function knows about the invocation it is serving.
#[derive(Debug, Clone)]
pub struct StageContext {
  pub lane: usize,
  pub stage: usize,
  pub stage_name: Arc<str>,
  pub item: ItemId,
}
