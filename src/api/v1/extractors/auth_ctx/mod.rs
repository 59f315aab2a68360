/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - hand the identity the access gate decoded (AuthCtx) to handlers
 * - axum-facing code lives in core, the type itself in types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
