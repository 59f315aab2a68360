/*
 * Responsibility
 * - message key definitions, locale tables, Accept-Language negotiation
 * - request-scoped `Lang` used by handlers and the auth gate
 */
pub mod catalog;
pub mod keys;
pub mod lang;

pub use catalog::{Catalog, CatalogError};
pub use keys::MessageKey;
pub use lang::Lang;
