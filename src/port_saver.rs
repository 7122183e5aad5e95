use anyhow::Context;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use tokio::sync::watch;

/// Reports the port Rocket actually bound to, which matters when the
/// configured port is 0.
pub fn create_pair() -> (PortSaver, Port) {
    let (sender, receiver) = watch::channel(None);
    (PortSaver { sender }, Port { receiver })
}

#[derive(Clone)]
pub struct Port {
    receiver: watch::Receiver<Option<u16>>,
}

impl Port {
    /// Waits until the server has lifted off.
    pub async fn get(&self) -> Result<u16, anyhow::Error> {
        let mut receiver = self.receiver.clone();
        loop {
            let current = *receiver.borrow();
            if let Some(port) = current {
                return Ok(port);
            }
            receiver
                .changed()
                .await
                .context("The server stopped before reporting its port.")?;
        }
    }
}

pub struct PortSaver {
    sender: watch::Sender<Option<u16>>,
}

#[rocket::async_trait]
impl Fairing for PortSaver {
    fn info(&self) -> Info {
        Info {
            name: "Port Saver",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let port = rocket.config().port;
        if self.sender.send(Some(port)).is_err() {
            tracing::warn!(port, "Nobody is waiting for the bound port");
        }
    }
}
