use tokio::sync::Notify;

/// Lets the `restart` command ask the gateway session to shut down so the
/// outer loop can bring up a fresh one.
#[derive(Debug, Default)]
pub struct Lifecycle {
    restart: Notify,
}

impl Lifecycle {
    pub fn request_restart(&self) {
        // notify_one keeps a permit if nobody is waiting yet.
        self.restart.notify_one();
    }

    pub async fn restart_requested(&self) {
        self.restart.notified().await;
    }
}
