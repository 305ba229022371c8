use tokio::sync::watch;

/// Sending half of a cooperative stop channel.
///
/// Requesting a stop is idempotent and latched: receivers that subscribe or
/// check after the request still observe it. This is the primitive pipeline
/// implementations are expected to build their [`crate::pipeline::Pipeline::stop`]
/// contract on.
#[derive(Debug, Clone)]
pub struct StopTx(watch::Sender<bool>);

impl StopTx {
    /// Requests a cooperative stop.
    ///
    /// Returns an error only when no receivers are alive anymore, which callers
    /// are usually free to ignore.
    pub fn stop(&self) -> Result<(), watch::error::SendError<bool>> {
        self.0.send(true)
    }

    /// Returns true if a stop has already been requested.
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Creates a new receiver observing this channel.
    pub fn subscribe(&self) -> StopRx {
        StopRx(self.0.subscribe())
    }
}

/// Receiving half of a cooperative stop channel.
#[derive(Debug, Clone)]
pub struct StopRx(watch::Receiver<bool>);

impl StopRx {
    /// Resolves once a stop has been requested.
    ///
    /// Resolves immediately when the stop was requested before this call, so a
    /// run loop that checks late never misses the signal. A dropped [`StopTx`]
    /// counts as a stop request.
    pub async fn stopped(&mut self) {
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }

    /// Returns true if a stop has already been requested.
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }
}

/// Creates a new pair of [`StopTx`] and [`StopRx`].
pub fn create_stop_channel() -> (StopTx, StopRx) {
    let (tx, rx) = watch::channel(false);
    (StopTx(tx), StopRx(rx))
}
