//! HTTP implementation of the UserDirectory probe.
//!
//! Calls `GET {peer}/api/users/{id}` on the peer user service, racing the
//! caller's cancellation signal. Status mapping per the order-creation
//! contract: 200 reports the user's actual status, 404 means unknown user,
//! anything 5xx or a transport error means the peer is unavailable, and a
//! caller that gives up mid-probe surfaces as Cancelled.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::OrdersConfig;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::UserStatus;
use crate::ports::{Cancellation, UserDirectory, UserProbe};

/// Reqwest-backed implementation of `UserDirectory`.
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    /// Creates a probe client against the configured peer service.
    pub fn new(config: &OrdersConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.peer_timeout())
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            base_url: config.peer_service_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProbeBody {
    status: UserStatus,
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn probe(
        &self,
        user_id: &UserId,
        cancel: &Cancellation,
    ) -> Result<UserProbe, DomainError> {
        let url = format!("{}/api/users/{}", self.base_url, user_id);

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(DomainError::new(
                    ErrorCode::Cancelled,
                    "Caller abandoned the request during the user probe",
                ));
            }
            result = self.client.get(&url).send() => result.map_err(|e| {
                DomainError::new(
                    ErrorCode::PeerUnavailable,
                    format!("User service unreachable: {}", e),
                )
            })?,
        };

        match response.status() {
            StatusCode::OK => {
                let body: ProbeBody = response.json().await.map_err(|e| {
                    DomainError::new(
                        ErrorCode::PeerUnavailable,
                        format!("User service returned an unreadable body: {}", e),
                    )
                })?;
                Ok(match body.status {
                    UserStatus::Active => UserProbe::Active,
                    UserStatus::Inactive => UserProbe::Inactive,
                })
            }
            StatusCode::NOT_FOUND => Ok(UserProbe::NotFound),
            status => Err(DomainError::new(
                ErrorCode::PeerUnavailable,
                format!("User service answered {}", status),
            )),
        }
    }
}
