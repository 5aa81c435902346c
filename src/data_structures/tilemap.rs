//! Layered tile maps.
//!
//! A [`TileMap`] is a stack of equally sized layers of tile indices, flattened
//! layer-major into one buffer so it can be uploaded to the GPU as a single
//! vertically stacked `R32Uint` image.

use serde::Deserialize;

use crate::error::DecodeError;

/// Tile edge length used when the map description does not declare one.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// An immutable stack of tile layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: u32,
    height: u32,
    layer_count: u32,
    tile_width: u32,
    tile_height: u32,
    layer_names: Vec<String>,
    data: Vec<u32>,
}

impl TileMap {
    /// Build a map from already separated layers.
    ///
    /// Every layer must hold exactly `width * height` indices.
    pub fn from_layers(width: u32, height: u32, layers: &[&[u32]]) -> Result<Self, DecodeError> {
        if layers.is_empty() {
            return Err(DecodeError::NoLayers);
        }
        let tiles_per_layer = checked_tiles_per_layer(width, height, layers.len())?;
        for (idx, layer) in layers.iter().enumerate() {
            if layer.len() != tiles_per_layer {
                return Err(DecodeError::LayerData {
                    layer: idx,
                    expected: tiles_per_layer,
                    found: layer.len(),
                });
            }
        }
        let data = layers.concat();
        Ok(Self {
            width,
            height,
            layer_count: layers.len() as u32,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            layer_names: (0..layers.len()).map(|i| format!("layer {i}")).collect(),
            data,
        })
    }

    /// Decode a Tiled JSON (`.tmj`) map description.
    ///
    /// Only tile layers are kept. Layers must all share the dimensions of the
    /// first one; a mismatch is rejected rather than truncated or padded.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let desc: MapDescription = serde_json::from_str(json)?;
        desc.into_tilemap()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Size of one tile in the atlas, in pixels.
    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// The flat layer-major index buffer.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Indices of layer `idx`, or `None` past the last layer.
    pub fn layer(&self, idx: u32) -> Option<&[u32]> {
        if idx >= self.layer_count {
            return None;
        }
        let len = self.tiles_per_layer();
        let start = idx as usize * len;
        Some(&self.data[start..start + len])
    }

    pub fn tile(&self, layer: u32, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.layer(layer)
            .map(|tiles| tiles[(y * self.width + x) as usize])
    }

    pub fn tiles_per_layer(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Bytes of one texel row of the index texture.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * std::mem::size_of::<u32>() as u32
    }

    /// `(width, height)` of the index texture: all layers stacked vertically.
    pub fn texture_extent(&self) -> (u32, u32) {
        (self.width, self.height * self.layer_count)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Tiles in one layer of a `width` x `height` map with `layers` layers.
///
/// Rejects empty layers, and maps whose index buffer or stacked texture
/// height would not fit the integer types used to address them.
fn checked_tiles_per_layer(width: u32, height: u32, layers: usize) -> Result<usize, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyLayer {
            layer: 0,
            width,
            height,
        });
    }
    let per_layer = width.checked_mul(height);
    let stacked_rows = u32::try_from(layers)
        .ok()
        .and_then(|layers| height.checked_mul(layers));
    let row_bytes = width.checked_mul(std::mem::size_of::<u32>() as u32);
    let total = per_layer.and_then(|tiles| (tiles as usize).checked_mul(layers));
    match (per_layer, stacked_rows, row_bytes, total) {
        (Some(tiles), Some(_), Some(_), Some(_)) => Ok(tiles as usize),
        _ => Err(DecodeError::MapTooLarge {
            width,
            height,
            layers,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct MapDescription {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    tilewidth: Option<u32>,
    #[serde(default)]
    tileheight: Option<u32>,
    #[serde(default)]
    layers: Vec<LayerDescription>,
}

#[derive(Debug, Deserialize)]
struct LayerDescription {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    data: Option<LayerData>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LayerData {
    Tiles(Vec<u32>),
    // base64/zlib strings, or anything else that is not a list of ids
    Encoded(serde::de::IgnoredAny),
}

impl LayerDescription {
    fn is_tile_layer(&self) -> bool {
        self.kind.as_deref().is_none_or(|kind| kind == "tilelayer")
    }
}

impl MapDescription {
    fn into_tilemap(self) -> Result<TileMap, DecodeError> {
        let layers: Vec<LayerDescription> = self
            .layers
            .into_iter()
            .filter(LayerDescription::is_tile_layer)
            .collect();
        if layers.is_empty() {
            return Err(DecodeError::NoLayers);
        }

        let dims = |idx: usize, layer: &LayerDescription| -> Result<(u32, u32), DecodeError> {
            match (layer.width.or(self.width), layer.height.or(self.height)) {
                (Some(w), Some(h)) => Ok((w, h)),
                _ => Err(DecodeError::MissingDimensions { layer: idx }),
            }
        };

        let (width, height) = dims(0, &layers[0])?;
        let tiles_per_layer = checked_tiles_per_layer(width, height, layers.len())?;
        let tile_width = self.tilewidth.unwrap_or(DEFAULT_TILE_SIZE);
        let tile_height = self.tileheight.unwrap_or(DEFAULT_TILE_SIZE);
        if tile_width == 0 || tile_height == 0 {
            return Err(DecodeError::TileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        // grown from the decoded arrays, never from the declared dimensions
        let mut data = Vec::new();
        let mut layer_names = Vec::with_capacity(layers.len());

        for (idx, layer) in layers.iter().enumerate() {
            let found = dims(idx, layer)?;
            if found != (width, height) {
                return Err(DecodeError::LayerDimensions {
                    layer: idx,
                    expected: (width, height),
                    found,
                });
            }
            let tiles = match &layer.data {
                Some(LayerData::Tiles(tiles)) => tiles.as_slice(),
                Some(LayerData::Encoded(_)) => {
                    return Err(DecodeError::UnsupportedEncoding { layer: idx });
                }
                None => &[],
            };
            if tiles.len() != tiles_per_layer {
                return Err(DecodeError::LayerData {
                    layer: idx,
                    expected: tiles_per_layer,
                    found: tiles.len(),
                });
            }
            data.extend_from_slice(tiles);
            layer_names.push(layer.name.clone().unwrap_or_else(|| format!("layer {idx}")));
        }

        Ok(TileMap {
            width,
            height,
            layer_count: layers.len() as u32,
            tile_width,
            tile_height,
            layer_names,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_json(width: u32, height: u32, fill: u32) -> String {
        let data: Vec<String> = (0..width * height).map(|_| fill.to_string()).collect();
        format!(
            r#"{{"type":"tilelayer","width":{width},"height":{height},"data":[{}]}}"#,
            data.join(",")
        )
    }

    #[test]
    fn copies_each_layer_into_its_slice() {
        let json = r#"{
            "width": 3, "height": 2, "tilewidth": 8, "tileheight": 8,
            "layers": [
                {"type":"tilelayer","name":"ground","width":3,"height":2,"data":[1,2,3,4,5,6]},
                {"type":"tilelayer","name":"decor","width":3,"height":2,"data":[0,0,7,0,8,0]}
            ]
        }"#;
        let map = TileMap::from_json(json).unwrap();

        assert_eq!(map.data().len(), 3 * 2 * 2);
        assert_eq!(map.layer(0).unwrap(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(map.layer(1).unwrap(), &[0, 0, 7, 0, 8, 0]);
        assert_eq!(map.layer(2), None);
        assert_eq!(map.tile_size(), (8, 8));
        assert_eq!(map.layer_names(), &["ground".to_string(), "decor".to_string()]);
    }

    #[test]
    fn tile_lookup_is_row_major() {
        let map = TileMap::from_layers(3, 2, &[&[1, 2, 3, 4, 5, 6]]).unwrap();
        assert_eq!(map.tile(0, 0, 0), Some(1));
        assert_eq!(map.tile(0, 2, 0), Some(3));
        assert_eq!(map.tile(0, 0, 1), Some(4));
        assert_eq!(map.tile(0, 3, 0), None);
    }

    #[test]
    fn rejects_mismatched_layer_dimensions() {
        let json = format!(r#"{{"layers":[{},{}]}}"#, layer_json(10, 10, 1), layer_json(8, 8, 1));
        let err = TileMap::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LayerDimensions {
                layer: 1,
                expected: (10, 10),
                found: (8, 8)
            }
        ));
    }

    #[test]
    fn rejects_maps_without_tile_layers() {
        let err = TileMap::from_json(r#"{"layers":[]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NoLayers));

        let objects_only = r#"{"layers":[{"type":"objectgroup","objects":[]}]}"#;
        let err = TileMap::from_json(objects_only).unwrap_err();
        assert!(matches!(err, DecodeError::NoLayers));
    }

    #[test]
    fn skips_object_layers() {
        let json = format!(
            r#"{{"layers":[{},{{"type":"objectgroup","objects":[]}},{}]}}"#,
            layer_json(2, 2, 1),
            layer_json(2, 2, 2)
        );
        let map = TileMap::from_json(&json).unwrap();
        assert_eq!(map.layer_count(), 2);
        assert_eq!(map.layer(1).unwrap(), &[2, 2, 2, 2]);
    }

    #[test]
    fn layer_dimensions_fall_back_to_the_map() {
        let json = r#"{"width":2,"height":1,"layers":[{"data":[5,6]}]}"#;
        let map = TileMap::from_json(json).unwrap();
        assert_eq!((map.width(), map.height()), (2, 1));
        assert_eq!(map.tile_size(), (DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE));

        let err = TileMap::from_json(r#"{"layers":[{"data":[5,6]}]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDimensions { layer: 0 }));
    }

    #[test]
    fn rejects_short_layers_and_encoded_data() {
        let short = r#"{"layers":[{"width":2,"height":2,"data":[1,2,3]}]}"#;
        assert!(matches!(
            TileMap::from_json(short).unwrap_err(),
            DecodeError::LayerData { layer: 0, expected: 4, found: 3 }
        ));

        let encoded = r#"{"layers":[{"width":2,"height":2,"data":"AAAA","encoding":"base64"}]}"#;
        assert!(matches!(
            TileMap::from_json(encoded).unwrap_err(),
            DecodeError::UnsupportedEncoding { layer: 0 }
        ));
    }

    #[test]
    fn rejects_oversized_maps_without_overflowing() {
        let huge = r#"{"layers":[{"width":65536,"height":65536,"data":[]}]}"#;
        assert!(matches!(
            TileMap::from_json(huge).unwrap_err(),
            DecodeError::MapTooLarge {
                width: 65536,
                height: 65536,
                layers: 1
            }
        ));

        // each layer fits, the stacked texture height does not
        let tall = format!(
            r#"{{"layers":[{},{}]}}"#,
            r#"{"width":1,"height":3000000000,"data":[]}"#,
            r#"{"width":1,"height":3000000000,"data":[]}"#
        );
        assert!(matches!(
            TileMap::from_json(&tall).unwrap_err(),
            DecodeError::MapTooLarge { layers: 2, .. }
        ));
    }

    #[test]
    fn rejects_empty_maps() {
        let empty = r#"{"layers":[{"width":0,"height":0,"data":[]}]}"#;
        assert!(matches!(
            TileMap::from_json(empty).unwrap_err(),
            DecodeError::EmptyLayer { layer: 0, width: 0, height: 0 }
        ));
        assert!(matches!(
            TileMap::from_layers(4, 0, &[&[]]).unwrap_err(),
            DecodeError::EmptyLayer { width: 4, height: 0, .. }
        ));
    }

    #[test]
    fn rejects_zero_tile_size() {
        let json = r#"{"tilewidth":0,"tileheight":16,"layers":[{"width":1,"height":1,"data":[1]}]}"#;
        assert!(matches!(
            TileMap::from_json(json).unwrap_err(),
            DecodeError::TileSize { width: 0, height: 16 }
        ));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(matches!(TileMap::from_json("{").unwrap_err(), DecodeError::Json(_)));
    }

    #[test]
    fn texture_extent_stacks_layers() {
        let zeros = [0u32; 12];
        let map = TileMap::from_layers(4, 3, &[&zeros, &zeros]).unwrap();
        assert_eq!(map.texture_extent(), (4, 6));
        assert_eq!(map.bytes_per_row(), 16);
        assert_eq!(map.as_bytes().len(), 4 * 3 * 2 * 4);
    }
}
