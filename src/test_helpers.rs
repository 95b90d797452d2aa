//! Shared fixtures for unit tests: sample records, an in-memory backend,
//! a scriptable identity provider, and an axum stub of the REST API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, put};

use crate::cache::QueryCache;
use crate::gateway::{GatewayError, ShelterApi};
use crate::identity::{AuthBroadcaster, AuthSubscription, AuthUser, IdentityError, IdentityProvider, Session};
use crate::notice::Notifier;
use crate::screens::ScreenContext;
use crate::shelter::{
    Address, AddressDraft, Contact, ContactDraft, DEFAULT_OWNER_EMAIL, Shelter, ShelterDraft, ShelterStatus,
};

// =============================================================================
// SAMPLE DATA
// =============================================================================

/// The reference valid draft.
pub fn valid_draft() -> ShelterDraft {
    ShelterDraft {
        name: "Abrigo Central".into(),
        total_capacity: 100,
        current_capacity: 40,
        available_resources: "Água, cobertores".into(),
        status: ShelterStatus::Open,
        user_email: DEFAULT_OWNER_EMAIL.into(),
        address: AddressDraft {
            street: "Rua A".into(),
            number: 10,
            district: "Centro".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            cep: "01000-000".into(),
        },
        contact: ContactDraft { email: "a@b.org".into(), phone: "11987654321".into() },
    }
}

pub fn shelter_from_draft(id: u64, draft: &ShelterDraft) -> Shelter {
    Shelter {
        id,
        name: draft.name.clone(),
        total_capacity: u32::try_from(draft.total_capacity).unwrap_or(0),
        current_capacity: u32::try_from(draft.current_capacity).unwrap_or(0),
        available_resources: draft.available_resources.clone(),
        status: draft.status,
        last_update: Some("2025-06-01T12:00:00".into()),
        address: Address {
            id: Some(id * 10),
            street: draft.address.street.clone(),
            number: u32::try_from(draft.address.number).unwrap_or(0),
            district: draft.address.district.clone(),
            city: draft.address.city.clone(),
            state: draft.address.state.clone(),
            cep: draft.address.cep.clone(),
        },
        contact: Contact {
            id: Some(id * 10 + 1),
            email: draft.contact.email.clone(),
            phone: draft.contact.phone.clone(),
        },
        user_email: draft.user_email.clone(),
    }
}

pub fn sample_shelter(id: u64) -> Shelter {
    shelter_from_draft(id, &valid_draft())
}

pub fn sample_user(uid: &str) -> AuthUser {
    AuthUser {
        uid: uid.to_owned(),
        email: Some(format!("{uid}@example.com")),
        display_name: None,
        created_at: chrono::DateTime::from_timestamp_millis(1_700_000_000_000),
    }
}

// =============================================================================
// FAKE API
// =============================================================================

/// In-memory `ShelterApi` with per-operation call counters.
#[derive(Default)]
pub struct FakeApi {
    shelters: Mutex<Vec<Shelter>>,
    next_id: AtomicU64,
    failing: AtomicBool,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1), ..Self::default() }
    }

    pub fn with_shelters(shelters: Vec<Shelter>) -> Self {
        let next = shelters.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self { shelters: Mutex::new(shelters), next_id: AtomicU64::new(next), ..Self::default() }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn network_calls(&self) -> usize {
        [&self.list_calls, &self.get_calls, &self.create_calls, &self.update_calls, &self.delete_calls]
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(GatewayError::Status { status: 500, body: "boom".into() })
        } else {
            Ok(())
        }
    }
}

fn not_found() -> GatewayError {
    GatewayError::Status { status: 404, body: String::new() }
}

#[async_trait::async_trait]
impl ShelterApi for FakeApi {
    async fn list(&self) -> Result<Vec<Shelter>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.shelters.lock().unwrap().clone())
    }

    async fn get(&self, id: u64) -> Result<Shelter, GatewayError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.shelters.lock().unwrap().iter().find(|s| s.id == id).cloned().ok_or_else(not_found)
    }

    async fn create(&self, draft: &ShelterDraft) -> Result<Shelter, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let shelter = shelter_from_draft(id, draft);
        self.shelters.lock().unwrap().push(shelter.clone());
        Ok(shelter)
    }

    async fn update(&self, id: u64, draft: &ShelterDraft) -> Result<Shelter, GatewayError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut shelters = self.shelters.lock().unwrap();
        let slot = shelters.iter_mut().find(|s| s.id == id).ok_or_else(not_found)?;
        *slot = shelter_from_draft(id, draft);
        Ok(slot.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), GatewayError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut shelters = self.shelters.lock().unwrap();
        let before = shelters.len();
        shelters.retain(|s| s.id != id);
        if shelters.len() == before { Err(not_found()) } else { Ok(()) }
    }
}

// =============================================================================
// FAKE IDENTITY
// =============================================================================

/// Scriptable `IdentityProvider` backed by an account map.
pub struct FakeIdentity {
    broadcaster: AuthBroadcaster,
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    fail_sign_out: AtomicBool,
    created: AtomicUsize,
}

impl FakeIdentity {
    /// Provider that has not reported any state yet.
    pub fn pending() -> Self {
        Self {
            broadcaster: AuthBroadcaster::new(),
            accounts: Mutex::new(HashMap::new()),
            fail_sign_out: AtomicBool::new(false),
            created: AtomicUsize::new(0),
        }
    }

    pub fn signed_out() -> Self {
        let identity = Self::pending();
        identity.publish(Session::SignedOut);
        identity
    }

    pub fn signed_in(user: AuthUser) -> Self {
        let identity = Self::pending();
        identity.publish(Session::SignedIn(user));
        identity
    }

    pub fn publish(&self, session: Session) {
        self.broadcaster.publish(session);
    }

    pub fn add_account(&self, email: &str, password: &str, user: AuthUser) {
        self.accounts.lock().unwrap().insert(email.to_owned(), (password.to_owned(), user));
    }

    pub fn fail_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }

    pub fn accounts_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let user = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some((stored, user)) if stored == password => user.clone(),
                Some(_) => return Err(IdentityError::Provider { code: "INVALID_PASSWORD".into() }),
                None => return Err(IdentityError::Provider { code: "EMAIL_NOT_FOUND".into() }),
            }
        };
        self.publish(Session::SignedIn(user.clone()));
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let user = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(IdentityError::Provider { code: "EMAIL_EXISTS".into() });
            }
            let user = AuthUser {
                uid: format!("uid-{}", accounts.len() + 1),
                email: Some(email.to_owned()),
                display_name: None,
                created_at: None,
            };
            accounts.insert(email.to_owned(), (password.to_owned(), user.clone()));
            user
        };
        self.created.fetch_add(1, Ordering::SeqCst);
        self.publish(Session::SignedIn(user.clone()));
        Ok(user)
    }

    async fn update_display_name(&self, name: &str) -> Result<AuthUser, IdentityError> {
        let mut user = self.broadcaster.current_user().ok_or(IdentityError::NotSignedIn)?;
        user.display_name = Some(name.to_owned());
        self.publish(Session::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(IdentityError::Request("network down".into()));
        }
        self.publish(Session::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.broadcaster.subscribe()
    }
}

// =============================================================================
// SCREEN CONTEXT
// =============================================================================

pub fn test_context(api: Arc<FakeApi>, identity: Arc<FakeIdentity>, session: Session, notifier: Notifier) -> ScreenContext {
    ScreenContext { api, identity, cache: QueryCache::new(), notifier, session }
}

// =============================================================================
// AXUM STUB BACKEND
// =============================================================================

/// Stub of the shelter REST API. Counts every request and can be told to
/// fail with a status or to stall past the client timeout.
#[derive(Clone, Default)]
pub struct StubBackend {
    shelters: Arc<Mutex<Vec<Shelter>>>,
    next_id: Arc<AtomicU64>,
    pub hits: Arc<AtomicUsize>,
    fail_status: Arc<Mutex<Option<u16>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    last_content_type: Arc<Mutex<Option<String>>>,
}

impl StubBackend {
    pub fn with_shelters(shelters: Vec<Shelter>) -> Self {
        let next = shelters.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self { shelters: Arc::new(Mutex::new(shelters)), next_id: Arc::new(AtomicU64::new(next)), ..Self::default() }
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn stall_for(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.last_content_type.lock().unwrap().clone()
    }

    async fn gate(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let content_type = headers.get("content-type").and_then(|v| v.to_str().ok()).map(str::to_owned);
        *self.last_content_type.lock().unwrap() = content_type;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let fail = *self.fail_status.lock().unwrap();
        match fail {
            Some(code) => Err(StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)),
            None => Ok(()),
        }
    }
}

async fn stub_list(State(stub): State<StubBackend>, headers: HeaderMap) -> Result<Json<Vec<Shelter>>, StatusCode> {
    stub.gate(&headers).await?;
    Ok(Json(stub.shelters.lock().unwrap().clone()))
}

async fn stub_get(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Shelter>, StatusCode> {
    stub.gate(&headers).await?;
    let found = stub.shelters.lock().unwrap().iter().find(|s| s.id == id).cloned();
    found.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn stub_create(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Json(draft): Json<ShelterDraft>,
) -> Result<(StatusCode, Json<Shelter>), StatusCode> {
    stub.gate(&headers).await?;
    let id = stub.next_id.fetch_add(1, Ordering::SeqCst);
    let shelter = shelter_from_draft(id, &draft);
    stub.shelters.lock().unwrap().push(shelter.clone());
    Ok((StatusCode::CREATED, Json(shelter)))
}

async fn stub_update(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(draft): Json<ShelterDraft>,
) -> Result<Json<Shelter>, StatusCode> {
    stub.gate(&headers).await?;
    let mut shelters = stub.shelters.lock().unwrap();
    let slot = shelters.iter_mut().find(|s| s.id == id).ok_or(StatusCode::NOT_FOUND)?;
    *slot = shelter_from_draft(id, &draft);
    Ok(Json(slot.clone()))
}

async fn stub_delete(State(stub): State<StubBackend>, headers: HeaderMap, Path(id): Path<u64>) -> StatusCode {
    if let Err(status) = stub.gate(&headers).await {
        return status;
    }
    let mut shelters = stub.shelters.lock().unwrap();
    let before = shelters.len();
    shelters.retain(|s| s.id != id);
    if shelters.len() == before { StatusCode::NOT_FOUND } else { StatusCode::NO_CONTENT }
}

/// Serve `stub` on an ephemeral local port and return its base URL.
pub async fn spawn_stub_backend(stub: StubBackend) -> String {
    let app = Router::new()
        .route("/api/shelters", get(stub_list).post(stub_create))
        .route("/api/shelters/{id}", get(stub_get))
        .route("/api/shelters/update/{id}", put(stub_update))
        .route("/api/shelters/delete/{id}", delete(stub_delete))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
