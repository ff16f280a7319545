//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (about to be sent)
//!     → credentials.rs (read `token` from the store, every time)
//!     → authorize(): set `authorization: Bearer <token>` if present
//!     → RequestDescriptor (ready for transport)
//! ```
//!
//! # Design Decisions
//! - Absent or empty token: request proceeds without the header
//! - Unreadable store: logged, request proceeds unauthenticated
//! - The header is replaced, never appended, so it appears exactly once

pub mod credentials;

pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore, TOKEN_KEY,
};

use crate::http::RequestDescriptor;

/// Authorization header name.
pub const AUTHORIZATION: &str = "authorization";

/// Format a token as a bearer credential.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Attach the current credential, if any.
pub fn authorize(request: RequestDescriptor, store: &dyn CredentialStore) -> RequestDescriptor {
    match store.get(TOKEN_KEY) {
        Ok(Some(token)) if !token.is_empty() => request.with_header(AUTHORIZATION, bearer(&token)),
        Ok(_) => request,
        Err(e) => {
            tracing::warn!(
                request_id = %request.id(),
                error = %e,
                "Credential store unreadable, sending request unauthenticated"
            );
            request
        }
    }
}
