//! Purpose: WebDriver BiDi value codec library used by the `bidival` CLI and tests.
//! Exports: `api` (public surface), `core` (wire model, codec, errors), `json`, `notice`.
//! Role: Maps protocol-serialized values to native dynamic values and back.
//! Invariants: Decoding is pure and synchronous; no hidden global state.
//! Invariants: Only unsupported tags are absorbed; other failures reach the caller.
pub mod api;
pub mod core;
pub mod inspect;
pub mod json;
pub mod notice;
