//! Fetching assets from disk (native) or over HTTP (wasm).
//!
//! Every asset is addressed by a root directory and a file name relative to
//! it. Natively the root is a directory on disk, on the web it is a path below
//! the page origin. All loaders are async so the startup phase can fetch
//! shaders, bitmaps and the map description concurrently.

use crate::{
    data_structures::tilemap::TileMap,
    error::{Error, Result},
};

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> std::io::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| std::io::Error::other("no browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| std::io::Error::other(format!("{e:?}")))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))
        .map_err(std::io::Error::other)?;
    base.join(file_name).map_err(std::io::Error::other)
}

#[cfg(target_arch = "wasm32")]
async fn fetch(root: &str, file_name: &str) -> std::io::Result<reqwest::Response> {
    let url = format_url(root, file_name)?;
    reqwest::get(url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(std::io::Error::other)
}

fn io_error(file_name: &str, source: std::io::Error) -> Error {
    Error::Io {
        path: file_name.to_string(),
        source,
    }
}

pub async fn load_string(root: &str, file_name: &str) -> Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = async {
        fetch(root, file_name)
            .await?
            .text()
            .await
            .map_err(std::io::Error::other)
    }
    .await;
    #[cfg(not(target_arch = "wasm32"))]
    let txt = tokio::fs::read_to_string(std::path::Path::new(root).join(file_name)).await;

    let txt = txt.map_err(|e| io_error(file_name, e))?;
    log::debug!("fetched {file_name} ({} bytes)", txt.len());
    Ok(txt)
}

pub async fn load_binary(root: &str, file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = async {
        fetch(root, file_name)
            .await?
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(std::io::Error::other)
    }
    .await;
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(std::path::Path::new(root).join(file_name)).await;

    let data = data.map_err(|e| io_error(file_name, e))?;
    log::debug!("fetched {file_name} ({} bytes)", data.len());
    Ok(data)
}

/// Fetch and decode a Tiled JSON map.
pub async fn load_map(root: &str, file_name: &str) -> Result<TileMap> {
    let json = load_string(root, file_name).await?;
    let map = TileMap::from_json(&json)?;
    log::info!(
        "loaded map {file_name}: {}x{} tiles, {} layers",
        map.width(),
        map.height(),
        map.layer_count()
    );
    Ok(map)
}
