use crate::{PreloadError, PreloadResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::path::Path;

/// Number of faces in a cube texture, ordered +X, -X, +Y, -Y, +Z, -Z
pub const CUBE_FACE_COUNT: usize = 6;

/// Logical key of a requested asset. Loaded results are stored and looked up by this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AssetName(String);

impl AssetName {
    pub fn new<T: Into<String>>(name: T) -> Self {
        AssetName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AssetName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AssetName {
    fn eq(
        &self,
        other: &str,
    ) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AssetName {
    fn eq(
        &self,
        other: &&str,
    ) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for AssetName {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AssetName {
    fn from(name: &str) -> Self {
        AssetName(name.to_string())
    }
}

impl From<String> for AssetName {
    fn from(name: String) -> Self {
        AssetName(name)
    }
}

/// Which loader a request is dispatched to. The serialized names match the `type` field used by
/// source manifests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    #[serde(rename = "texture")]
    Texture,
    #[serde(rename = "cubeTexture")]
    CubeTexture,
    #[serde(rename = "glTF")]
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPath {
    Single(String),
    CubeFaces([String; CUBE_FACE_COUNT]),
}

/// One asset to fetch. Built through the per-kind constructors so the path always has the shape
/// its kind expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    name: AssetName,
    kind: AssetKind,
    path: AssetPath,
}

impl LoadRequest {
    pub fn texture<N: Into<AssetName>, P: Into<String>>(
        name: N,
        path: P,
    ) -> Self {
        LoadRequest {
            name: name.into(),
            kind: AssetKind::Texture,
            path: AssetPath::Single(path.into()),
        }
    }

    pub fn cube_texture<N: Into<AssetName>>(
        name: N,
        face_paths: [String; CUBE_FACE_COUNT],
    ) -> Self {
        LoadRequest {
            name: name.into(),
            kind: AssetKind::CubeTexture,
            path: AssetPath::CubeFaces(face_paths),
        }
    }

    pub fn model<N: Into<AssetName>, P: Into<String>>(
        name: N,
        path: P,
    ) -> Self {
        LoadRequest {
            name: name.into(),
            kind: AssetKind::Model,
            path: AssetPath::Single(path.into()),
        }
    }

    pub fn name(&self) -> &AssetName {
        &self.name
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn path(&self) -> &AssetPath {
        &self.path
    }
}

/// The fixed, ordered set of requests for one session. The length is the number of completions
/// that must arrive before the batch is ready. Names are expected to be unique but this is not
/// checked, a repeated name means the later completion overwrites the earlier result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBatch {
    requests: Vec<LoadRequest>,
}

impl LoadBatch {
    pub fn new(requests: Vec<LoadRequest>) -> Self {
        LoadBatch { requests }
    }

    pub fn requests(&self) -> &[LoadRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn from_manifest_str(json_str: &str) -> PreloadResult<LoadBatch> {
        let sources: Vec<AssetSourceJson> = {
            profiling::scope!("serde_json::from_str");
            serde_json::from_str(json_str)?
        };

        let mut requests = Vec::with_capacity(sources.len());
        for source in sources {
            requests.push(source.into_request()?);
        }

        Ok(LoadBatch { requests })
    }

    pub fn load_manifest_file(manifest_file_path: &Path) -> PreloadResult<LoadBatch> {
        log::info!("Loading source manifest {:?}", manifest_file_path);
        let json_str = std::fs::read_to_string(manifest_file_path)?;
        Self::from_manifest_str(&json_str)
    }
}

//
// Source manifest file format, an array of these entries:
//
// { "name": "floorColorTexture", "type": "texture", "path": "textures/dirt/color.jpg" }
// { "name": "environmentMap", "type": "cubeTexture", "path": ["px.jpg", ... 6 total] }
//
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSourcePathJson {
    Single(String),
    List(Vec<String>),
}

#[derive(Serialize, Deserialize)]
pub struct AssetSourceJson {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub path: AssetSourcePathJson,
}

impl AssetSourceJson {
    fn into_request(self) -> PreloadResult<LoadRequest> {
        match (self.kind, self.path) {
            (AssetKind::Texture, AssetSourcePathJson::Single(path)) => {
                Ok(LoadRequest::texture(self.name, path))
            }
            (AssetKind::Model, AssetSourcePathJson::Single(path)) => {
                Ok(LoadRequest::model(self.name, path))
            }
            (AssetKind::CubeTexture, AssetSourcePathJson::List(paths)) => {
                let path_count = paths.len();
                let face_paths: [String; CUBE_FACE_COUNT] =
                    paths.try_into().map_err(|_| PreloadError::InvalidSource {
                        name: self.name.clone(),
                        reason: format!(
                            "cube texture needs {} face paths, found {}",
                            CUBE_FACE_COUNT, path_count
                        ),
                    })?;
                Ok(LoadRequest::cube_texture(self.name, face_paths))
            }
            (kind, _) => Err(PreloadError::InvalidSource {
                name: self.name,
                reason: format!("path has the wrong shape for asset type {:?}", kind),
            }),
        }
    }
}
