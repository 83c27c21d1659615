use preload_base::CUBE_FACE_COUNT;

// Decoded image, always 8 bits per channel RGBA regardless of the source format
#[derive(Clone)]
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl std::fmt::Debug for TextureAsset {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TextureAsset")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_length", &self.rgba8.len())
            .finish()
    }
}

// Faces are ordered +X, -X, +Y, -Y, +Z, -Z and all share the same dimensions
#[derive(Clone, Debug)]
pub struct CubeTextureAsset {
    pub faces: [TextureAsset; CUBE_FACE_COUNT],
}

impl CubeTextureAsset {
    pub fn face_size(&self) -> (u32, u32) {
        (self.faces[0].width, self.faces[0].height)
    }
}

pub struct ModelAsset {
    pub document: gltf::Document,
    pub buffers: Vec<gltf::buffer::Data>,
    pub images: Vec<gltf::image::Data>,
}

impl std::fmt::Debug for ModelAsset {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ModelAsset")
            .field("meshes", &self.document.meshes().count())
            .field("nodes", &self.document.nodes().count())
            .field("animations", &self.document.animations().count())
            .field("buffers", &self.buffers.len())
            .field("images", &self.images.len())
            .finish()
    }
}

#[derive(Debug)]
pub enum LoadedAsset {
    Texture(TextureAsset),
    CubeTexture(CubeTextureAsset),
    Model(ModelAsset),
}

impl LoadedAsset {
    pub fn as_texture(&self) -> Option<&TextureAsset> {
        match self {
            LoadedAsset::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn as_cube_texture(&self) -> Option<&CubeTextureAsset> {
        match self {
            LoadedAsset::CubeTexture(cube_texture) => Some(cube_texture),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelAsset> {
        match self {
            LoadedAsset::Model(model) => Some(model),
            _ => None,
        }
    }
}
