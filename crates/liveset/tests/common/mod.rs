//! A scripted stand-in for AbletonOSC on a loopback UDP socket.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use liveproto::{decode, ClientConfig, OscArg, OscClient, OscMessage};
use liveset::LiveSet;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Fake Live: records every message and answers queries it has a value for.
///
/// Replies mimic AbletonOSC by echoing the request arguments (the object
/// indices) before the configured values.
pub struct FakeLive {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<OscMessage>>>,
    handle: JoinHandle<()>,
}

impl FakeLive {
    pub async fn spawn(values: HashMap<&'static str, Vec<OscArg>>) -> Self {
        Self::spawn_with(move |request: &OscMessage| {
            values.get(request.address.as_str()).map(|value| {
                let mut reply = request.args.clone();
                reply.extend(value.iter().cloned());
                reply
            })
        })
        .await
    }

    /// Answer with whatever `respond` returns, or stay silent on `None`.
    pub async fn spawn_with<F>(respond: F) -> Self
    where
        F: Fn(&OscMessage) -> Option<Vec<OscArg>> + Send + Sync + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 65_507];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    return;
                };
                let Ok(messages) = decode(&buf[..len]) else {
                    continue;
                };
                for request in messages {
                    log.lock().unwrap().push(request.clone());
                    if let Some(args) = respond(&request) {
                        let reply = OscMessage::new(request.address.clone(), args);
                        let bytes = reply.encode().unwrap();
                        socket.send_to(&bytes, from).await.unwrap();
                    }
                }
            }
        });

        Self {
            addr,
            received,
            handle,
        }
    }

    pub fn received(&self) -> Vec<OscMessage> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages arrived and return them.
    pub async fn wait_for(&self, count: usize) -> Vec<OscMessage> {
        let start = Instant::now();
        loop {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            assert!(
                start.elapsed() < Duration::from_secs(2),
                "fake Live got {} messages, wanted {}",
                received.len(),
                count
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Open a client against this fake with a short timeout.
    pub async fn connect(&self) -> LiveSet {
        let config = ClientConfig::new("test", self.addr)
            .with_listen("127.0.0.1:0".parse().unwrap())
            .with_timeout(Duration::from_millis(500));
        LiveSet::new(OscClient::open(config).await.unwrap())
    }
}

impl Drop for FakeLive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
