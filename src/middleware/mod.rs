/*
 * Responsibility
 * - Public interface of the middleware layer
 * - permission guard, cors, http-level layers, security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
