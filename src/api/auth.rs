//! Login and account endpoints
//!
//! Access-code and email/password login, token exchange, the customer
//! profile, and channel authorization for the push bridge.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::client::{ApiClient, ApiError, ApiRequest, DataEnvelope};
use crate::models::Customer;
use crate::session::Credentials;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    customer: Customer,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Signature returned by `/broadcasting/auth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAuth {
    pub auth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
}

impl ApiClient {
    /// Sign in with an access code and store the session
    pub async fn login_with_access_code(&self, access_code: &str) -> Result<Customer, ApiError> {
        self.login(Credentials::AccessCode(access_code.to_string()))
            .await
    }

    /// Sign in with email and password and store the session
    pub async fn login_with_password(&self, email: &str, password: &str) -> Result<Customer, ApiError> {
        self.login(Credentials::Password {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    async fn login(&self, credentials: Credentials) -> Result<Customer, ApiError> {
        let response = self.request_login(&credentials).await?;
        self.session()
            .save_login(&response.token, &response.customer, Some(credentials))?;
        info!(customer_id = response.customer.id, "signed in");
        Ok(response.customer)
    }

    /// Replay stored credentials and persist the new token
    pub(crate) async fn relogin(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let response = self.request_login(credentials).await?;
        self.session().set_token(&response.token)?;
        Ok(response.token)
    }

    async fn request_login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let session = self.session().snapshot();
        let device = json!({
            "mac_address": session.device_mac_address,
            "device_name": session.device_name,
            "ip": session.client_ip,
        });

        let req = match credentials {
            Credentials::AccessCode(code) => {
                let mut body = device;
                body["access_code"] = json!(code);
                ApiRequest::post("/login/access-code", body)
            }
            Credentials::Password { email, password } => {
                let mut body = device;
                body["email"] = json!(email);
                body["password"] = json!(password);
                ApiRequest::post("/login", body)
            }
        };

        self.send_public(&req).await
    }

    /// Exchange the current token for one scoped to `customer_id`
    pub async fn token_for_customer(&self, customer_id: u64) -> Result<String, ApiError> {
        let session = self.session().snapshot();
        let req = ApiRequest::post(
            "/token-for-customer",
            json!({
                "customer_id": customer_id,
                "mac_address": session.device_mac_address,
            }),
        );
        let response: TokenResponse = self.send_authorized(&req).await?;
        self.session().set_token(&response.token)?;
        Ok(response.token)
    }

    /// Fetch the signed-in customer's profile
    pub async fn customer(&self) -> Result<Customer, ApiError> {
        let envelope: DataEnvelope<Customer> =
            self.send_authorized(&ApiRequest::get("/customer")).await?;
        envelope.data.ok_or(ApiError::EmptyBody)
    }

    /// Authorize a private push channel subscription
    pub async fn authorize_channel(&self, socket_id: &str, channel_name: &str) -> Result<ChannelAuth, ApiError> {
        let req = ApiRequest::post(
            "/broadcasting/auth",
            json!({
                "socket_id": socket_id,
                "channel_name": channel_name,
            }),
        );
        self.send_authorized(&req).await
    }

    /// Forget the local session
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().logout()?;
        Ok(())
    }
}
