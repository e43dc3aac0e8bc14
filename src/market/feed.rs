//! Mock push channel
//!
//! Simulates a market data WebSocket: a repeating timer republishes a
//! randomized tick for a fixed stock to every subscriber. There is no
//! backpressure and no delivery guarantee; a slow subscriber just lags.
//! Reconnecting must never leave two timers running, so `connect`
//! aborts any previous timer task first.

use crate::market::types::{MarketType, QuoteSnapshot};
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// Broadcast buffer; laggards drop old ticks rather than blocking the timer
const FEED_CHANNEL_CAPACITY: usize = 32;

/// Mock market data feed
pub struct MarketFeed {
    interval: Duration,
    tx: broadcast::Sender<QuoteSnapshot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MarketFeed {
    pub fn new(interval: Duration) -> Self {
        let (tx, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        Self {
            interval,
            tx,
            task: Mutex::new(None),
        }
    }

    /// Start pushing ticks. Any previously running timer is aborted so
    /// a re-connect cannot double the push rate.
    pub fn connect(&self) {
        let mut task = self.task.lock();

        if let Some(old) = task.take() {
            old.abort();
        }

        let tx = self.tx.clone();
        let interval = self.interval;

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of tokio's interval fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // Ignore send errors; no subscribers is a valid state
                let _ = tx.send(mock_tick());
            }
        }));

        info!("Mock feed connected, pushing every {:?}", self.interval);
    }

    /// Stop pushing ticks
    pub fn disconnect(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!("Mock feed disconnected");
        }
    }

    /// Register a subscriber. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteSnapshot> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn is_connected(&self) -> bool {
        self.task.lock().is_some()
    }
}

impl Drop for MarketFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

/// Randomized tick for the fixed demo stock (Ping An Bank, 000001)
pub fn mock_tick() -> QuoteSnapshot {
    let mut rng = rand::thread_rng();

    QuoteSnapshot {
        code: "000001".to_string(),
        name: "Ping An Bank".to_string(),
        price: 11.57 + (rng.gen::<f64>() - 0.5) * 0.5,
        change: (rng.gen::<f64>() - 0.5) * 0.2,
        change_percent: (rng.gen::<f64>() - 0.5) * 1.0,
        open: 11.52,
        high: 11.58,
        low: 11.45,
        volume: 38_611_600 + rng.gen_range(0..1_000_000),
        turnover: 445_456_418.0 + rng.gen_range(0..10_000_000) as f64,
        market: MarketType::AShare,
        time: Utc::now().to_rfc3339(),
        pe: 5.26,
        pb: 0.46,
        turnover_rate: 1.23,
        amplitude: 1.12,
        prev_close: 11.55,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[test]
    fn test_mock_tick_shape() {
        for _ in 0..50 {
            let tick = mock_tick();
            assert_eq!(tick.code, "000001");
            assert!(tick.price >= 11.32 && tick.price <= 11.82);
            assert!(tick.volume >= 38_611_600);
            assert_eq!(tick.prev_close, 11.55);
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_ticks() {
        let feed = MarketFeed::new(Duration::from_millis(10));
        let mut rx = feed.subscribe();
        feed.connect();

        let tick = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("feed did not push within a second")
            .expect("channel closed");
        assert_eq!(tick.code, "000001");

        feed.disconnect();
    }

    #[tokio::test]
    async fn test_disconnect_stops_pushes() {
        let feed = MarketFeed::new(Duration::from_millis(10));
        let mut rx = feed.subscribe();
        feed.connect();

        // Wait for the feed to be demonstrably running
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        feed.disconnect();
        assert!(!feed.is_connected());

        // Drain anything already buffered, then expect silence
        while rx.try_recv().is_ok() {}
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_reconnect_does_not_leak_timer() {
        let feed = MarketFeed::new(Duration::from_millis(10));
        let mut rx = feed.subscribe();

        // A second connect must replace, not stack, the timer; if the
        // first timer leaked, ticks would survive the disconnect below.
        feed.connect();
        feed.connect();

        timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        feed.disconnect();
        while rx.try_recv().is_ok() {}
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_drops_receiver() {
        let feed = MarketFeed::new(Duration::from_millis(10));
        let rx = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);
        drop(rx);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
