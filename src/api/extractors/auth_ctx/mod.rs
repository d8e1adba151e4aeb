/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the verified identity (AuthCtx) to handlers
 * - axum-specific glue lives in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
