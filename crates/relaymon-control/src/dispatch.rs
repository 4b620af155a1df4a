use crate::protocol::{Operation, PluginDescriptor, Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// External business logic invoked by the dispatcher to service a named
/// operation.
///
/// The channel does not implement plugin storage or management itself; the
/// surrounding agent supplies a handler. Implementations must be
/// `Send + Sync` because the listener duty runs on the runtime's worker
/// threads.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Computes the result payload for one operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be serviced; the dispatcher
    /// converts it into an error response for the controller.
    async fn handle(
        &self,
        operation: &Operation,
        plugin: Option<&PluginDescriptor>,
    ) -> anyhow::Result<serde_json::Value>;
}

/// Maps each inbound request onto the command handler, producing exactly one
/// response correlated by the request's uuid.
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn CommandHandler>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn CommandHandler>) -> Self {
        Self { handler }
    }

    /// Never fails: unknown operations and handler errors both become error
    /// responses sent back to the controller.
    pub async fn dispatch(&self, request: &Request) -> Response {
        if let Operation::Unknown(op) = &request.operation {
            tracing::warn!(operation = %op, uuid = %request.uuid, "unrecognized operation");
            return Response::error(&request.uuid, "invalid operation request");
        }

        match self
            .handler
            .handle(&request.operation, request.plugin.as_ref())
            .await
        {
            Ok(data) => Response::success(&request.uuid, data),
            Err(e) => {
                tracing::warn!(
                    operation = %request.operation,
                    uuid = %request.uuid,
                    error = %e,
                    "operation failed"
                );
                Response::error(&request.uuid, e.to_string())
            }
        }
    }
}
