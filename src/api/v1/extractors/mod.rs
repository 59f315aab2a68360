/*
 * Responsibility
 * - request-scoped values handed to handlers (Lang, AuthCtx, LocalizedJson)
 */
pub mod auth_ctx;
pub mod json;
pub mod lang;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json::LocalizedJson;
