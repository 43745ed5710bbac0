use crate::error::AssetError;
use std::time::Duration;
use web_time::Instant;

/// The sending half of a [`LoadHandle`], owned by whatever performs the load.
pub struct LoadSender<T> {
    sender: oneshot::Sender<Result<T, AssetError>>,
}

impl<T> LoadSender<T> {
    /// Delivers the outcome of the load.
    ///
    /// Delivering to a handle that was cancelled or dropped is not an error; the
    /// value is simply discarded.
    pub fn resolve(self, result: Result<T, AssetError>) {
        let _ = self.sender.send(result);
    }
}

enum HandleState<T> {
    Waiting(oneshot::Receiver<Result<T, AssetError>>),
    Cancelled,
    Taken,
}

/// A pending asset request.
///
/// Handles are polled from the frame loop with [`LoadHandle::try_take`], which never
/// blocks. The outcome is yielded exactly once. A handle can carry a deadline, after
/// which it resolves to [`AssetError::Timeout`], and it can be cancelled, after which
/// a late result from the loader is discarded.
pub struct LoadHandle<T> {
    url: String,
    state: HandleState<T>,
    timeout: Option<(Instant, Duration)>,
}

impl<T> LoadHandle<T> {
    /// Creates a connected sender/handle pair for a request of `url`.
    pub fn channel(url: &str) -> (LoadSender<T>, LoadHandle<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            LoadSender { sender },
            LoadHandle {
                url: url.to_string(),
                state: HandleState::Waiting(receiver),
                timeout: None,
            },
        )
    }

    /// A handle that is already resolved.
    pub fn ready(url: &str, result: Result<T, AssetError>) -> LoadHandle<T> {
        let (sender, handle) = Self::channel(url);
        sender.resolve(result);
        handle
    }

    /// Fails the request with [`AssetError::Timeout`] if it is still pending `after`
    /// the given instant.
    pub fn with_timeout(mut self, start: Instant, after: Duration) -> Self {
        self.timeout = Some((start + after, after));
        self
    }

    /// The requested location.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Abandons the request. The next call to `try_take` yields [`AssetError::Cancelled`].
    pub fn cancel(&mut self) {
        if matches!(self.state, HandleState::Waiting(_)) {
            self.state = HandleState::Cancelled;
        }
    }

    /// `true` once the outcome has been taken.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, HandleState::Taken)
    }

    /// Takes the outcome if it is available, using the current time for timeouts.
    pub fn try_take(&mut self) -> Option<Result<T, AssetError>> {
        self.try_take_at(Instant::now())
    }

    /// Takes the outcome if it is available at `now`.
    ///
    /// Returns `None` while the request is pending and after the outcome was taken.
    pub fn try_take_at(&mut self, now: Instant) -> Option<Result<T, AssetError>> {
        let outcome = match &self.state {
            HandleState::Taken => return None,
            HandleState::Cancelled => Err(AssetError::Cancelled),
            HandleState::Waiting(receiver) => match receiver.try_recv() {
                Ok(result) => result,
                Err(oneshot::TryRecvError::Empty) => match self.timeout {
                    Some((deadline, after)) if now >= deadline => Err(AssetError::Timeout {
                        url: self.url.clone(),
                        after,
                    }),
                    _ => return None,
                },
                Err(oneshot::TryRecvError::Disconnected) => Err(AssetError::Network(format!(
                    "{}: the loader stopped before answering",
                    self.url
                ))),
            },
        };

        self.state = HandleState::Taken;
        Some(outcome)
    }

    /// Blocks until the outcome is available.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait(mut self) -> Result<T, AssetError> {
        match std::mem::replace(&mut self.state, HandleState::Taken) {
            HandleState::Waiting(receiver) => {
                let received = match self.timeout {
                    Some((deadline, after)) => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        receiver.recv_timeout(remaining).map_err(|e| match e {
                            oneshot::RecvTimeoutError::Timeout => AssetError::Timeout {
                                url: self.url.clone(),
                                after,
                            },
                            oneshot::RecvTimeoutError::Disconnected => {
                                AssetError::Network(format!("{}: the loader stopped", self.url))
                            }
                        })?
                    }
                    None => receiver.recv().map_err(|_| {
                        AssetError::Network(format!("{}: the loader stopped", self.url))
                    })?,
                };
                received
            }
            HandleState::Cancelled | HandleState::Taken => Err(AssetError::Cancelled),
        }
    }
}

impl<T> std::fmt::Debug for LoadHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            HandleState::Waiting(_) => "waiting",
            HandleState::Cancelled => "cancelled",
            HandleState::Taken => "taken",
        };
        f.debug_struct("LoadHandle")
            .field("url", &self.url)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_is_yielded_once() {
        let mut handle = LoadHandle::ready("a.jpg", Ok(7u32));
        assert_eq!(handle.try_take(), Some(Ok(7)));
        assert!(handle.is_finished());
        assert_eq!(handle.try_take(), None);
    }

    #[test]
    fn pending_until_resolved() {
        let (sender, mut handle) = LoadHandle::<u32>::channel("a.jpg");
        assert_eq!(handle.try_take(), None);
        sender.resolve(Err(AssetError::NotFound("a.jpg".into())));
        assert_eq!(
            handle.try_take(),
            Some(Err(AssetError::NotFound("a.jpg".into())))
        );
    }

    #[test]
    fn cancelled_handle_discards_late_result() {
        let (sender, mut handle) = LoadHandle::<u32>::channel("a.glb");
        handle.cancel();
        sender.resolve(Ok(1));
        assert_eq!(handle.try_take(), Some(Err(AssetError::Cancelled)));
        assert_eq!(handle.try_take(), None);
    }

    #[test]
    fn deadline_turns_into_timeout() {
        let start = Instant::now();
        let (_sender, handle) = LoadHandle::<u32>::channel("slow.glb");
        let mut handle = handle.with_timeout(start, Duration::from_secs(5));

        assert_eq!(handle.try_take_at(start + Duration::from_secs(4)), None);
        assert_eq!(
            handle.try_take_at(start + Duration::from_secs(5)),
            Some(Err(AssetError::Timeout {
                url: "slow.glb".into(),
                after: Duration::from_secs(5)
            }))
        );
    }

    #[test]
    fn dropped_loader_is_a_network_error() {
        let (sender, mut handle) = LoadHandle::<u32>::channel("a.glb");
        drop(sender);
        assert!(matches!(handle.try_take(), Some(Err(AssetError::Network(_)))));
    }

    #[test]
    fn wait_blocks_for_threaded_loader() {
        let (sender, handle) = LoadHandle::<u32>::channel("a.glb");
        std::thread::spawn(move || sender.resolve(Ok(3)));
        assert_eq!(handle.wait(), Ok(3));
    }
}
