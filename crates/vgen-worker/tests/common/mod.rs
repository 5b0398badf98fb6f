//! Shared test doubles for runner and scheduler tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing_subscriber::fmt::MakeWriter;

use vgen_api_client::{ClientError, ClientResult, VideoGenerator};
use vgen_models::{Category, GenerateVideoRequest};
use vgen_sync::{FileSyncer, SshCredentials, SyncError, SyncOutput, SyncResult};
use vgen_worker::WorkerConfig;

/// Records every request. `failing` categories get HTTP 500, `unreachable`
/// ones a transport error.
#[derive(Default)]
pub struct RecordingGenerator {
    requests: Mutex<Vec<GenerateVideoRequest>>,
    failing: Vec<Category>,
    unreachable: Vec<Category>,
}

impl RecordingGenerator {
    pub fn failing(categories: &[Category]) -> Self {
        Self {
            failing: categories.to_vec(),
            ..Self::default()
        }
    }

    pub fn unreachable(categories: &[Category]) -> Self {
        Self {
            unreachable: categories.to_vec(),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<GenerateVideoRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerateVideoRequest) -> ClientResult<()> {
        self.requests.lock().unwrap().push(request.clone());

        if self.unreachable.contains(&request.category) {
            // Nothing listens on port 1
            let err = reqwest::Client::new()
                .post("http://127.0.0.1:1/api/generate-video")
                .send()
                .await
                .unwrap_err();
            return Err(ClientError::Network(err));
        }
        if self.failing.contains(&request.category) {
            return Err(ClientError::RequestFailed {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: format!("cannot render {}", request.category),
            });
        }
        Ok(())
    }
}

/// How the fake syncer finishes.
#[derive(Debug, Clone, Copy)]
pub enum SyncBehavior {
    Succeed,
    SucceedWithWarnings,
    Exit(i32),
    Timeout,
    NotFound,
    SpawnError,
}

/// Counts mirror calls and remembers the last arguments.
pub struct FakeSyncer {
    behavior: SyncBehavior,
    calls: AtomicU32,
    last_call: Mutex<Option<(String, String, SshCredentials)>>,
}

impl FakeSyncer {
    pub fn new(behavior: SyncBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<(String, String, SshCredentials)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSyncer for FakeSyncer {
    async fn mirror(
        &self,
        source: &str,
        destination: &str,
        credentials: &SshCredentials,
    ) -> SyncResult<SyncOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some((
            source.to_string(),
            destination.to_string(),
            credentials.clone(),
        ));

        match self.behavior {
            SyncBehavior::Succeed => Ok(SyncOutput {
                stdout: "sent 1024 bytes  received 64 bytes".to_string(),
                stderr: String::new(),
            }),
            SyncBehavior::SucceedWithWarnings => Ok(SyncOutput {
                stdout: "sent 1024 bytes  received 64 bytes".to_string(),
                stderr: "file has vanished: \"/data/output/tmp.mp4\"".to_string(),
            }),
            SyncBehavior::Exit(code) => Err(SyncError::failed(
                Some(code),
                "ssh: connect to host example.com port 22: Connection refused",
            )),
            SyncBehavior::Timeout => Err(SyncError::Timeout(600)),
            SyncBehavior::NotFound => Err(SyncError::RsyncNotFound("rsync".to_string())),
            SyncBehavior::SpawnError => Err(SyncError::Spawn(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied (os error 13)",
            ))),
        }
    }
}

pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        rsync_source: "/data/output".to_string(),
        rsync_dest: "deploy@web:~/web/x".to_string(),
        ssh_key_path: "/keys/deploy".into(),
        ..WorkerConfig::default()
    }
}

/// In-memory log sink for a scoped subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }

    /// Install a subscriber writing into this buffer for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
