//! Session store
//!
//! Holds the signed-in user's token and profile fields. The session is a flat
//! key-value JSON file (`~/.local/share/wiltv/session.json` on Linux) so it
//! survives restarts, and every write is broadcast to subscribers through a
//! `tokio::sync::watch` channel so screens can react to login/logout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::Customer;

const SESSION_FILE: &str = "session.json";

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable record of the signed-in user
///
/// Serialized as a flat object of string keys; absent fields are omitted, so
/// an empty session is `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_path: Option<String>,
}

/// Credentials that can be replayed to obtain a fresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    AccessCode(String),
    Password { email: String, password: String },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Stored re-login credentials. Access code wins over email/password.
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(code) = self.access_code.as_ref().filter(|c| !c.is_empty()) {
            return Some(Credentials::AccessCode(code.clone()));
        }
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !password.is_empty() => Some(Credentials::Password {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Owner of the persisted session
///
/// One store is created per process and shared by handle (`Arc`) with every
/// component that reads or writes the session.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    tx: watch::Sender<Session>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Default session path (`<data_dir>/wiltv/session.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("wiltv").join(SESSION_FILE))
    }

    /// Open the store at the default path
    pub fn open_default() -> Result<Self, SessionError> {
        let path = Self::default_path().ok_or(SessionError::NoDataDir)?;
        Self::open(path)
    }

    /// Load the session at `path`; a missing file yields an empty session
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Session::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), authenticated = session.is_authenticated(), "session loaded");

        let (tx, _rx) = watch::channel(session);
        Ok(Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current session value
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().auth_token.clone()
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.tx.borrow().credentials()
    }

    /// Receiver that observes every subsequent session write
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Mutate the session, persist it, then notify subscribers
    pub fn update<F>(&self, f: F) -> Result<Session, SessionError>
    where
        F: FnOnce(&mut Session),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = self.snapshot();
        f(&mut next);
        self.persist(&next)?;
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    /// Record a successful login
    pub fn save_login(
        &self,
        token: &str,
        customer: &Customer,
        credentials: Option<Credentials>,
    ) -> Result<Session, SessionError> {
        info!(customer_id = customer.id, "login stored");
        self.update(|s| {
            s.auth_token = Some(token.to_string());
            s.user_id = Some(customer.id.to_string());
            s.customer_name = customer.name.clone();
            s.profile_photo_path = customer.profile_photo.clone();
            if let Some(email) = &customer.email {
                s.email = Some(email.clone());
            }
            // Only the method just used may be replayed on the next 401
            match credentials {
                Some(Credentials::AccessCode(code)) => {
                    s.access_code = Some(code);
                    s.password = None;
                }
                Some(Credentials::Password { email, password }) => {
                    s.email = Some(email);
                    s.password = Some(password);
                    s.access_code = None;
                }
                None => {
                    if let Some(code) = &customer.access_code {
                        s.access_code = Some(code.clone());
                    }
                }
            }
        })
    }

    /// Replace the token only (after a transparent re-login)
    pub fn set_token(&self, token: &str) -> Result<Session, SessionError> {
        self.update(|s| s.auth_token = Some(token.to_string()))
    }

    /// Clear every field and remove the file
    pub fn logout(&self) -> Result<(), SessionError> {
        info!("session cleared");
        self.update(|s| *s = Session::default())?;
        Ok(())
    }

    /// Make sure the device identity fields sent with login are populated
    ///
    /// The hardware address is not portable to read, so a generated UUID is
    /// stored once and reused as the device identifier.
    pub fn ensure_device_identity(&self, device_name: &str) -> Result<Session, SessionError> {
        let client_ip = match local_ip_address::local_ip() {
            Ok(ip) => Some(ip.to_string()),
            Err(e) => {
                warn!("could not determine local IP: {}", e);
                None
            }
        };

        self.update(|s| {
            if s.device_mac_address.is_none() {
                s.device_mac_address = Some(uuid::Uuid::new_v4().to_string());
            }
            if client_ip.is_some() {
                s.client_ip = client_ip;
            }
            if s.device_name.is_none() {
                s.device_name = Some(device_name.to_string());
            }
        })
    }

    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        if *session == Session::default() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(session)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
