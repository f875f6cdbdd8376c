use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenAuthenticator;
use auth::TokenCodec;
use chrono::Duration;
use chrono::Utc;
use identity_service::credential::errors::AuthError;
use identity_service::credential::models::Credential;
use identity_service::credential::models::NewCredential;
use identity_service::credential::models::PasswordPolicy;
use identity_service::credential::models::ProvisionCredentialCommand;
use identity_service::credential::models::UserId;
use identity_service::credential::models::Username;
use identity_service::credential::ports::AuthServicePort;
use identity_service::credential::ports::CredentialStore;
use identity_service::credential::service::AuthenticationService;
use identity_service::inbound::http::router::create_router;
use serde_json::json;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Credential store kept in process memory, keyed by username
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, Credential>>,
    next_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn get(&self, username: &str) -> Option<Credential> {
        self.credentials.lock().unwrap().get(username).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, AuthError> {
        Ok(self.get(username.as_str()))
    }

    async fn save(&self, credential: Credential) -> Result<Credential, AuthError> {
        let mut credentials = self.credentials.lock().unwrap();
        let existing = credentials
            .get_mut(credential.username.as_str())
            .ok_or_else(|| AuthError::UnknownUser(credential.username.to_string()))?;

        if existing.updated_at != credential.updated_at {
            return Err(AuthError::StaleCredential(credential.username.to_string()));
        }

        let mut saved = credential;
        saved.updated_at = Utc::now().max(existing.updated_at + Duration::microseconds(1));
        *existing = saved.clone();

        Ok(saved)
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, AuthError> {
        let mut credentials = self.credentials.lock().unwrap();
        if credentials.contains_key(credential.username.as_str()) {
            return Err(AuthError::UsernameTaken(credential.username.to_string()));
        }

        let created = Credential {
            id: UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            username: credential.username,
            password_hash: credential.password_hash,
            role: credential.role,
            full_name: credential.full_name,
            first_login_pending: true,
            updated_at: Utc::now(),
        };
        credentials.insert(created.username.as_str().to_string(), created.clone());

        Ok(created)
    }
}

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub store: Arc<InMemoryCredentialStore>,
    pub auth_service: Arc<AuthenticationService<InMemoryCredentialStore>>,
    pub token_codec: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_codec =
            TokenCodec::new(TEST_SECRET, Duration::hours(24)).expect("Failed to build codec");
        let shared_codec = Arc::new(token_codec.clone());

        // Cheap Argon2 cost keeps the suite fast
        let password_hasher =
            PasswordHasher::with_params(1024, 1, 1).expect("Failed to build hasher");

        let store = Arc::new(InMemoryCredentialStore::default());
        let auth_service = Arc::new(AuthenticationService::new(
            Arc::clone(&store),
            password_hasher,
            Arc::clone(&shared_codec),
            PasswordPolicy::default(),
        ));
        let token_authenticator = Arc::new(TokenAuthenticator::new(shared_codec));

        let router = create_router(Arc::clone(&auth_service), token_authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            store,
            auth_service,
            token_codec,
        }
    }

    /// Create a STUDENT account with a pending first login
    pub async fn provision(&self, username: &str, password: &str) {
        let outcome = self
            .auth_service
            .provision(ProvisionCredentialCommand {
                username: Username::new(username).unwrap(),
                full_name: format!("{} Example", username),
                role: Role::Student,
                initial_password: password.to_string(),
            })
            .await
            .expect("Failed to provision account");
        assert!(outcome.succeeded, "provisioning failed: {:?}", outcome);
    }

    /// Log in and return the response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the issued token
    pub async fn login_token(&self, username: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .login(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Login did not return a token")
            .to_string()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }
}
