//! Websocket fan-out relay.

mod handler;
mod relay;

pub use handler::{ws_routes, RelayFeed};
pub use relay::{RelayBridge, RelayFrame, CORE_TOPICS};
