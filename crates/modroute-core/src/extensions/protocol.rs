//! JSON-RPC 2.0 style exchange of the extension catalog
//!
//! The privileged side computes the catalog once and owns a [`CatalogHost`].
//! The view side holds a [`CatalogClient`] and receives an immutable copy on
//! every request. Only serialized messages cross the channel.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

use super::catalog::ExtensionCatalog;
use crate::error::ProtocolError;

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Method returning the installable extension catalog
pub const GET_AVAILABLE_MODS: &str = "GET_AVAILABLE_MODS";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Request sent by the view side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: u64,
}

impl CatalogRequest {
    pub fn new(method: &str, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            id,
        }
    }
}

/// Error object of a failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Response sent by the privileged side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub jsonrpc: String,
    /// Result (mutually exclusive with error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExtensionCatalog>,
    /// Error (mutually exclusive with result)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: u64,
}

impl CatalogResponse {
    fn success(id: u64, catalog: ExtensionCatalog) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(catalog),
            error: None,
            id,
        }
    }

    fn failure(id: u64, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcError { code, message }),
            id,
        }
    }

    /// The catalog, or the remote error
    pub fn into_result(self) -> Result<ExtensionCatalog, ProtocolError> {
        if let Some(err) = self.error {
            return Err(ProtocolError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        self.result.ok_or_else(|| ProtocolError::Remote {
            code: error_codes::INTERNAL_ERROR,
            message: "Empty response".to_string(),
        })
    }
}

/// Create a connected host/client pair serving `catalog`
pub fn catalog_channel(catalog: ExtensionCatalog) -> (CatalogHost, CatalogClient) {
    let (request_tx, request_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();
    (
        CatalogHost {
            catalog,
            requests: request_rx,
            responses: response_tx,
        },
        CatalogClient {
            requests: request_tx,
            responses: response_rx,
            next_id: 1,
        },
    )
}

/// Privileged end: answers catalog requests from its snapshot
pub struct CatalogHost {
    catalog: ExtensionCatalog,
    requests: Receiver<String>,
    responses: Sender<String>,
}

impl CatalogHost {
    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    /// Answer one request, blocking until it arrives
    ///
    /// Returns `Ok(false)` once the client is gone.
    pub fn serve_one(&self) -> Result<bool, ProtocolError> {
        let Ok(raw) = self.requests.recv() else {
            return Ok(false);
        };
        let reply = serde_json::to_string(&self.handle(&raw))?;
        self.responses
            .send(reply)
            .map_err(|_| ProtocolError::Disconnected)?;
        Ok(true)
    }

    /// Answer requests until the client disconnects
    pub fn serve(&self) -> Result<(), ProtocolError> {
        while self.serve_one()? {}
        debug!("Catalog client disconnected");
        Ok(())
    }

    fn handle(&self, raw: &str) -> CatalogResponse {
        let request: CatalogRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed catalog request: {}", e);
                return CatalogResponse::failure(0, error_codes::PARSE_ERROR, e.to_string());
            }
        };

        if request.method == GET_AVAILABLE_MODS {
            CatalogResponse::success(request.id, self.catalog.clone())
        } else {
            CatalogResponse::failure(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )
        }
    }
}

/// View end: requests catalog copies from the host
pub struct CatalogClient {
    requests: Sender<String>,
    responses: Receiver<String>,
    next_id: u64,
}

impl CatalogClient {
    /// Fetch the catalog, blocking until the host answers
    pub fn request_catalog(&mut self) -> Result<ExtensionCatalog, ProtocolError> {
        self.call(GET_AVAILABLE_MODS)?.into_result()
    }

    /// Send `method` and wait for the matching response
    pub fn call(&mut self, method: &str) -> Result<CatalogResponse, ProtocolError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = serde_json::to_string(&CatalogRequest::new(method, id))?;
        self.requests
            .send(request)
            .map_err(|_| ProtocolError::Disconnected)?;

        let raw = self
            .responses
            .recv()
            .map_err(|_| ProtocolError::Disconnected)?;
        let response: CatalogResponse = serde_json::from_str(&raw)?;
        if response.id != id {
            return Err(ProtocolError::MismatchedId {
                expected: id,
                got: response.id,
            });
        }
        Ok(response)
    }
}
