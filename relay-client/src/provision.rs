//! Storage provisioning operations over the relay.
//!
//! A thin façade: each operation builds a [`RequestEnvelope`] with its fixed
//! endpoint and verb, a fresh request id and the caller's payload, then hands
//! it to the relay client. No business rules live here. Failures bubble up
//! unchanged and the decrypted response comes back verbatim; persisting
//! results (api keys, account rows) is the caller's concern.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use relay_types::{Method, ProtocolError, RequestEnvelope, ResponseEnvelope};

use crate::client::{ClientError, RelayClient};
use crate::status::StatusReport;
use crate::transport::Transport;

/// Payload for provisioning a new company account on the file server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Billing email; doubles as the company login.
    pub company_email: String,
    /// Storage quota in gigabytes.
    pub quota_gb: u64,
    /// Initial admin password for the company account.
    pub admin_password: String,
}

/// Payload for adding a sub-user under an existing company account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUser {
    /// Company the user belongs to.
    pub company_email: String,
    /// Company api key returned by create-company.
    pub api_key: String,
    /// Login name for the new user.
    pub username: String,
    /// Password for the new user.
    pub password: String,
}

/// Payload for removing a sub-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    /// Company the user belongs to.
    pub company_email: String,
    /// Company api key.
    pub api_key: String,
    /// Login name of the user to remove.
    pub username: String,
}

/// Payload for changing a company's storage quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuota {
    /// Company to update.
    pub company_email: String,
    /// Company api key.
    pub api_key: String,
    /// New quota in gigabytes.
    pub new_quota_gb: u64,
}

/// One-method-per-remote-operation façade over the relay client.
pub struct StorageProvisioner<T: Transport> {
    relay: RelayClient<T>,
}

impl<T: Transport> StorageProvisioner<T> {
    /// Wrap a relay client.
    pub fn new(relay: RelayClient<T>) -> Self {
        Self { relay }
    }

    /// The underlying relay client, for cancellation-aware callers that
    /// build their own envelopes.
    pub fn relay(&self) -> &RelayClient<T> {
        &self.relay
    }

    /// Provision a company account with its quota and admin credentials.
    ///
    /// On success the response data carries the company `api_key` that every
    /// follow-up operation needs.
    pub async fn create_company(
        &self,
        payload: CreateCompany,
    ) -> Result<ResponseEnvelope, ClientError> {
        self.call("/api/create-company", Method::Post, to_payload(&payload)?)
            .await
    }

    /// Add a sub-user under a company account.
    pub async fn add_user(&self, payload: AddUser) -> Result<ResponseEnvelope, ClientError> {
        self.call("/api/add-user", Method::Post, to_payload(&payload)?)
            .await
    }

    /// Fetch a customer's account and usage details.
    pub async fn get_customer(
        &self,
        email: &str,
        api_key: &str,
    ) -> Result<ResponseEnvelope, ClientError> {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .append_pair("api_key", api_key)
            .finish();
        self.call(
            &format!("/api/get-customer?{query}"),
            Method::Get,
            Value::Object(Default::default()),
        )
        .await
    }

    /// Remove a sub-user from a company account.
    pub async fn delete_user(&self, payload: DeleteUser) -> Result<ResponseEnvelope, ClientError> {
        self.call("/api/delete-user", Method::Delete, to_payload(&payload)?)
            .await
    }

    /// Change a company's storage quota.
    pub async fn update_quota(
        &self,
        payload: UpdateQuota,
    ) -> Result<ResponseEnvelope, ClientError> {
        self.call("/api/update-quota", Method::Put, to_payload(&payload)?)
            .await
    }

    /// End-to-end health check through the encrypted channel.
    pub async fn health_check(&self) -> Result<ResponseEnvelope, ClientError> {
        self.call("/api/health", Method::Get, Value::Object(Default::default()))
            .await
    }

    /// Relay availability without touching the encrypted channel.
    pub async fn check_status(&self) -> StatusReport {
        self.relay.check_status().await
    }

    async fn call(
        &self,
        endpoint: &str,
        method: Method,
        payload: Value,
    ) -> Result<ResponseEnvelope, ClientError> {
        let request = RequestEnvelope::new(endpoint, method, payload);
        self.relay.execute(request).await
    }
}

fn to_payload<P: Serialize>(payload: &P) -> Result<Value, ClientError> {
    serde_json::to_value(payload)
        .map_err(ProtocolError::Serialization)
        .map_err(ClientError::from)
}
