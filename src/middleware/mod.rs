/*
 * Responsibility
 * - middleware entry points (re-export)
 * - auth::access::apply (bearer gate), cors::apply, http::apply
 */
pub mod auth;
pub mod cors;
pub mod http;
