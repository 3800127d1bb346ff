// Test helpers are intentionally partially used
#![allow(dead_code)]

use async_trait::async_trait;
use attendance_capture::domain::{
    FixedClock, PhotoStorage, Repository, Role, SessionInfo, SessionStore, StorageError,
    StoredFile, User,
};
use attendance_capture::{
    build_router, create_noop_metrics, create_router, AppConfig, AppState, ConsentFlow,
    DriveConfig, MemoryRepository,
};
use attendance_capture::domain::{AttendanceService, PunctualityPolicy};
use chrono::{DateTime, Local, TimeZone};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use tokio::net::TcpListener;
use uuid::Uuid;

// ============================================================================
// Fakes
// ============================================================================

/// In-process session store keyed by random tokens.
#[derive(Default)]
pub struct FakeSessions {
    sessions: Mutex<HashMap<String, SessionInfo>>,
}

#[async_trait]
impl SessionStore for FakeSessions {
    async fn create(&self, info: &SessionInfo) -> anyhow::Result<String> {
        // ---
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.lock().unwrap().insert(token.clone(), info.clone());
        Ok(token)
    }

    async fn validate(&self, token: &str) -> anyhow::Result<Option<SessionInfo>> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Photo storage that keeps uploads in memory and can be told to fail.
#[derive(Default)]
pub struct FakeStorage {
    files: Mutex<HashMap<String, (String, Vec<u8>)>>,
    failure: Mutex<Option<StorageError>>,
}

impl FakeStorage {
    // ---
    pub fn fail_with(&self, err: StorageError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .values()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Stores a file directly, bypassing the API.
    pub fn put(&self, file_id: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), ("direct.jpg".to_string(), bytes.to_vec()));
    }
}

#[async_trait]
impl PhotoStorage for FakeStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        _mime_type: &str,
    ) -> Result<StoredFile, StorageError> {
        // ---
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let file_id = format!("file-{}", Uuid::new_v4().simple());
        self.files
            .lock()
            .unwrap()
            .insert(file_id.clone(), (file_name.to_string(), bytes));

        Ok(StoredFile {
            web_view_link: format!("https://drive.test/{file_id}/view"),
            web_content_link: None,
            file_id,
        })
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        // ---
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StorageError::Unknown("HTTP 404 Not Found: File not found".to_string()))
    }
}

// ============================================================================
// Test Setup
// ============================================================================

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

/// Environment for routers built from configuration: in-memory repository,
/// lazily connected Redis and a Drive client with no refresh token.
pub fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        set_env_if_unset!("ATTENDANCE_REPOSITORY", "memory");
        set_env_if_unset!("ATTENDANCE_REDIS_URL", "redis://127.0.0.1:6379");
        set_env_if_unset!("GOOGLE_CLIENT_ID", "test-client");
        set_env_if_unset!("GOOGLE_CLIENT_SECRET", "test-secret");
        set_env_if_unset!("ATTENDANCE_METRICS_TYPE", "noop");

        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Serves a router assembled from the current environment.
pub async fn server_from_env() -> TestServer {
    // ---
    let config = AppConfig::from_env().expect("test configuration should load");
    let app = build_router(&config).await.expect("Should be able to create router");
    TestServer::serve(app).await
}

/// Drive settings pointing at `base`, e.g. a fake Google server.
pub fn drive_config(base: &str, refresh_token: Option<&str>) -> DriveConfig {
    // ---
    DriveConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        redirect_uri: "http://localhost:8080/api/oauth2callback".to_string(),
        folder_id: Some("attendance-folder".to_string()),
        auth_url: format!("{base}/o/oauth2/v2/auth"),
        token_url: format!("{base}/token"),
        upload_url: format!("{base}/upload/drive/v3/files"),
        files_url: format!("{base}/drive/v3/files"),
    }
}

pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A fully wired application over in-memory fakes and a controllable clock.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub repository: Arc<MemoryRepository>,
    pub sessions: Arc<FakeSessions>,
    pub storage: Arc<FakeStorage>,
    pub state: AppState,
}

impl Harness {
    // ---
    pub fn at(now: DateTime<Local>) -> Self {
        // ---
        let clock = Arc::new(FixedClock::new(now));
        let repository = Arc::new(MemoryRepository::new(clock.clone()));
        let sessions = Arc::new(FakeSessions::default());
        let storage = Arc::new(FakeStorage::default());
        let metrics = create_noop_metrics().unwrap();

        let service = AttendanceService::new(
            repository.clone(),
            clock.clone(),
            PunctualityPolicy::default(),
            metrics.clone(),
        );
        let consent = Arc::new(ConsentFlow::new(drive_config("http://127.0.0.1:9", None)));

        let state = AppState::new(
            service,
            sessions.clone(),
            storage.clone(),
            consent,
            metrics,
        );

        Self {
            clock,
            repository,
            sessions,
            storage,
            state,
        }
    }

    /// Creates a user and returns a bearer token for them.
    pub async fn login(&self, username: &str, role: Role) -> (User, String) {
        // ---
        let user = self
            .repository
            .create_user(User::new(
                username.to_string(),
                format!("{username} Tester"),
                "not-a-real-hash".to_string(),
                role,
            ))
            .await
            .unwrap();

        let token = self
            .sessions
            .create(&SessionInfo {
                user_id: user.id,
                username: user.username.clone(),
                role,
            })
            .await
            .unwrap();

        (user, token)
    }
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(state: AppState) -> Self {
        // ---
        Self::serve(create_router(state)).await
    }

    pub async fn serve(app: axum::Router) -> Self {
        // ---
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
