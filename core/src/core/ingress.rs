// park/src/core/ingress.rs

//! Defines the `Ingress<T>` trait: the sequential source of payloads a park consumes.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// A sequential provider of payloads.
///
/// `next_payload` is only ever called by one lane at a time (the shared intake is
/// locked around it) and must be cancel-safe: a lane may drop the returned future
/// when the run is told to stop.
#[async_trait]
pub trait Ingress<T>: Send + 'static
where
  T: Send + 'static,
{
  /// Yields the next payload, or `None` once the input is exhausted.
  async fn next_payload(&mut self) -> Option<T>;

  /// The exact number of payloads this source will yield, if known up front.
  fn size_hint(&self) -> Option<usize> {
    None
  }
}

#[async_trait]
impl<T: Send + 'static> Ingress<T> for mpsc::Receiver<T> {
  async fn next_payload(&mut self) -> Option<T> {
    self.recv().await
  }
}

#[async_trait]
impl<T: Send + 'static> Ingress<T> for mpsc::UnboundedReceiver<T> {
  async fn next_payload(&mut self) -> Option<T> {
    self.recv().await
  }
}

/// Adapts any iterator into an `Ingress`.
#[derive(Debug)]
pub struct IterIngress<I>(I);

impl<I> IterIngress<I> {
  pub fn new<C>(items: C) -> Self
  where
    C: IntoIterator<IntoIter = I>,
  {
    IterIngress(items.into_iter())
  }
}

#[async_trait]
impl<T, I> Ingress<T> for IterIngress<I>
where
  T: Send + 'static,
  I: Iterator<Item = T> + Send + 'static,
{
  async fn next_payload(&mut self) -> Option<T> {
    self.0.next()
  }

  fn size_hint(&self) -> Option<usize> {
    match self.0.size_hint() {
      (lower, Some(upper)) if lower == upper => Some(lower),
      _ => None,
    }
  }
}

/// Shorthand for `IterIngress::new`.
pub fn from_iter<C>(items: C) -> IterIngress<C::IntoIter>
where
  C: IntoIterator,
{
  IterIngress::new(items)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn iter_ingress_reports_exact_size() {
    let mut ingress = from_iter(vec![1, 2, 3]);
    assert_eq!(Ingress::<i32>::size_hint(&ingress), Some(3));
    assert_eq!(ingress.next_payload().await, Some(1));
    assert_eq!(Ingress::<i32>::size_hint(&ingress), Some(2));
  }

  #[tokio::test]
  async fn unbounded_iterators_have_no_size() {
    let ingress = from_iter((0..).filter(|n| n % 2 == 0));
    assert_eq!(Ingress::<i32>::size_hint(&ingress), None);
  }

  #[tokio::test]
  async fn channel_ingress_ends_when_senders_drop() {
    let (tx, mut rx) = mpsc::channel(4);
    tx.send(7).await.unwrap();
    drop(tx);
    assert_eq!(rx.next_payload().await, Some(7));
    assert_eq!(rx.next_payload().await, None);
  }
}
