//! Data the renderer works on.
//!
//! - `tilemap` is the decoded, flattened map description
//! - `texture` wraps the GPU textures and their upload
//! - `uniforms` are the host mirrors of both uniform buffers

pub mod texture;
pub mod tilemap;
pub mod uniforms;
