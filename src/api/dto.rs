//! Data Transfer Objects for API requests and responses.
//!
//! Request fields arrive loosely typed (`String`, `i64`) so that bad input
//! is reported as a field-level validation error instead of a JSON parse
//! failure.

use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};
use crate::domain::{Client, ClientId, Lane, Priority, ReorderRequest};

// =============================================================================
// Client DTOs
// =============================================================================

/// Request body for `PUT /api/v1/clients/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    /// Destination lane name.
    #[serde(default)]
    pub status: Option<String>,
    /// Destination rank; must be positive.
    #[serde(default)]
    pub priority: Option<i64>,
}

impl UpdateClientRequest {
    /// Validates the body and turns it into a [`ReorderRequest`] for `target`.
    ///
    /// Zero and negative priorities are rejected rather than read as "no
    /// priority given".
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every invalid field.
    pub fn validate(&self, target: ClientId) -> Result<ReorderRequest, ValidationError> {
        let mut errors = Vec::new();

        let status = match self.status.as_deref().map(str::parse::<Lane>).transpose() {
            Ok(status) => status,
            Err(error) => {
                errors.push(FieldError::new(
                    "status",
                    format!("{error}; expected one of backlog, in-progress, complete"),
                ));
                None
            }
        };

        let priority = match self.priority.map(Priority::new).transpose() {
            Ok(priority) => priority,
            Err(error) => {
                errors.push(FieldError::new("priority", error.to_string()));
                None
            }
        };

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        Ok(ReorderRequest {
            target,
            status,
            priority,
        })
    }
}

/// Query string for `GET /api/v1/clients`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListClientsQuery {
    /// Only return clients in this lane.
    #[serde(default)]
    pub status: Option<String>,
}

impl ListClientsQuery {
    /// Parses the lane filter.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `status` is not a known lane.
    pub fn lane(&self) -> Result<Option<Lane>, ValidationError> {
        self.status
            .as_deref()
            .map(str::parse::<Lane>)
            .transpose()
            .map_err(|error| ValidationError::single("status", error.to_string()))
    }
}

/// Response DTO for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientResponse {
    /// Client id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Notes.
    pub description: Option<String>,
    /// Lane name.
    pub status: Lane,
    /// Rank within the lane.
    pub priority: u32,
}

impl From<&Client> for ClientResponse {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.get(),
            name: client.name.clone(),
            description: client.description.clone(),
            status: client.status,
            priority: client.priority.get(),
        }
    }
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self::from(&client)
    }
}

// =============================================================================
// Tests
// =============================================================================
