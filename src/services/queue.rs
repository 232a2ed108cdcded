use std::future::Future;
use tokio::sync::{oneshot, watch};

/// Completion signal for a write queued on a manager worker
///
/// Resolves to the state the write produced. If the worker is gone before
/// answering, resolves to the last published state instead.
pub fn completion<T>(
    done: oneshot::Receiver<T>,
    state: watch::Receiver<T>,
) -> impl Future<Output = T> + Send + 'static
where
    T: Clone + Send + Sync + 'static,
{
    async move {
        match done.await {
            Ok(value) => value,
            Err(_) => state.borrow().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion_resolves_to_reply() {
        let (_state_tx, state_rx) = watch::channel(0);
        let (done_tx, done_rx) = oneshot::channel();

        done_tx.send(7).unwrap();
        assert_eq!(completion(done_rx, state_rx).await, 7);
    }

    #[tokio::test]
    async fn test_completion_falls_back_to_published_state() {
        let (state_tx, state_rx) = watch::channel(0);
        let (done_tx, done_rx) = oneshot::channel::<i32>();

        state_tx.send_replace(3);
        drop(done_tx);
        assert_eq!(completion(done_rx, state_rx).await, 3);
    }
}
