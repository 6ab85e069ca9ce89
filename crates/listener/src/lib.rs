//! PushGate front door.
//!
//! Two ways to hand a delivery to [`dispatch::Dispatcher`]:
//!
//! - [`build_router`] / [`serve`]: an axum server with `POST <webhook_path>`
//!   for deliveries and `GET /health` for liveness checks.
//! - [`GatewayEvent`] / [`handle_event`]: the API-gateway proxy event shape,
//!   for running behind a gateway or replaying a captured event.
//!
//! Both paths answer with the same status, JSON body, and response headers
//! (`Content-Type: application/json`, `Access-Control-Allow-Origin: *`).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing, header conversion, and socket handling
//! live here. Every decision about a delivery is made by the [`dispatch`]
//! crate.

mod gateway;
mod response;
mod server;

#[cfg(test)]
mod test_support;

pub use gateway::{handle_event, GatewayEvent, GatewayResponse, HttpContext, RequestContext};
pub use response::{WebhookReply, RESPONSE_HEADERS};
pub use server::{build_router, serve, HEALTH_PATH};
