//! Scripted fake of the provider API shared by the lifecycle tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nimbus_api::{
    CreateServerRequest, Error as ApiError, Flavor, Image, Interface, InterfaceAddress,
    Result as ApiResult, Server, UpdateServerRequest, VolumeAttachment,
};
use nimbus_reconcile::ServerApi;

/// What one `get_server` call yields. The last entry repeats once the
/// script runs dry, so a finished transition stays finished across the
/// extra reads the lifecycle performs.
#[derive(Clone, Copy)]
pub enum Get {
    /// Snapshot with this status and published SSH host keys.
    Status(&'static str),
    /// Snapshot whose SSH host keys are not published yet.
    Bare(&'static str),
    NotFound,
}

#[derive(Default)]
struct Inner {
    gets: Mutex<VecDeque<Get>>,
    deletes: Mutex<VecDeque<ApiResult<()>>>,
    calls: Mutex<Vec<String>>,
    creates: Mutex<Vec<CreateServerRequest>>,
}

/// Cheaply clonable so one handle drives the lifecycle while the test
/// keeps another for assertions.
#[derive(Clone, Default)]
pub struct FakeApi {
    inner: Arc<Inner>,
}

impl FakeApi {
    pub fn with_gets(gets: &[Get]) -> Self {
        let api = Self::default();
        api.push_gets(gets);
        api
    }

    pub fn push_gets(&self, gets: &[Get]) {
        self.inner.gets.lock().unwrap().extend(gets.iter().copied());
    }

    pub fn push_delete_result(&self, result: ApiResult<()>) {
        self.inner.deletes.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    pub fn get_count(&self) -> usize {
        self.calls().iter().filter(|c| *c == "get").count()
    }

    pub fn created(&self) -> Vec<CreateServerRequest> {
        self.inner.creates.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.inner.calls.lock().unwrap().push(call.into());
    }

    fn next_get(&self) -> Get {
        let mut gets = self.inner.gets.lock().unwrap();
        if gets.len() > 1 {
            gets.pop_front().unwrap()
        } else {
            *gets.front().expect("get script is empty")
        }
    }

    /// Template snapshot used for every scripted response.
    pub fn server(status: &str, host_keys_published: bool) -> Server {
        Server {
            uuid: "srv-1".into(),
            href: "https://api.nimbus-cloud.ch/v1/servers/srv-1".into(),
            name: "db-1".into(),
            flavor: Flavor {
                slug: "flex-4".into(),
            },
            image: Image {
                slug: "debian-12".into(),
            },
            status: status.into(),
            volumes: vec![VolumeAttachment {
                volume_type: "ssd".into(),
                device_path: "/dev/vda".into(),
                size_gb: 50,
            }],
            interfaces: vec![
                Interface {
                    interface_type: "public".into(),
                    addresses: vec![InterfaceAddress {
                        version: 4,
                        address: "203.0.113.5".into(),
                    }],
                },
                Interface {
                    interface_type: "private".into(),
                    addresses: vec![InterfaceAddress {
                        version: 4,
                        address: "10.0.0.2".into(),
                    }],
                },
            ],
            ssh_fingerprints: vec!["SHA256:abc".into()],
            ssh_host_keys: if host_keys_published {
                vec!["ssh-ed25519 HOST".into()]
            } else {
                vec![]
            },
            anti_affinity_with: vec![],
        }
    }
}

#[async_trait]
impl ServerApi for FakeApi {
    async fn create_server(&self, req: &CreateServerRequest) -> ApiResult<Server> {
        self.record("create");
        self.inner.creates.lock().unwrap().push(req.clone());
        Ok(Self::server("changing", false))
    }

    async fn get_server(&self, _uuid: &str) -> ApiResult<Server> {
        self.record("get");
        match self.next_get() {
            Get::Status(status) => Ok(Self::server(status, true)),
            Get::Bare(status) => Ok(Self::server(status, false)),
            Get::NotFound => Err(ApiError::NotFound),
        }
    }

    async fn update_server(&self, _uuid: &str, req: &UpdateServerRequest) -> ApiResult<()> {
        self.record(format!("update:{}", req.status));
        Ok(())
    }

    async fn delete_server(&self, _uuid: &str) -> ApiResult<()> {
        self.record("delete");
        self.inner
            .deletes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
