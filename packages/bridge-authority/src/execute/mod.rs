//! Execute handlers for the bridge authority.
//!
//! Handlers are organized by category:
//! - `signers` - Threshold, roster, mode and ownership management
//! - `pause` - Pause, unpause, pause manager and hash cancellation
//! - `assets` - Deposits and signature-gated withdrawals
//! - `upgrade` - Upgrade paths and the post-upgrade manager action

mod assets;
mod pause;
mod signers;
mod upgrade;

pub use assets::*;
pub use pause::*;
pub use signers::*;
pub use upgrade::*;

use crate::events::Response;
use crate::signers::Authorization;

/// Record how a protected call was authorized
pub(crate) fn with_authorization(response: Response, auth: &Authorization) -> Response {
    match auth {
        Authorization::Owner => response.add_attribute("authorized_by", "owner"),
        Authorization::PauseManager => response.add_attribute("authorized_by", "pause_manager"),
        Authorization::Signatures { nonce, signers } => response
            .add_attribute("authorized_by", "signatures")
            .add_attribute("nonce", nonce)
            .add_attribute("signature_count", signers.len()),
    }
}
