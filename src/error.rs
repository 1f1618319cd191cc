//! Error types for scene setup.
//!
//! Every failure in this crate happens while a scene is being built: loading a
//! mesh, decoding a texture, validating an effect, or bringing up the GPU.
//! Per-frame `update`/`draw` never fail.

use thiserror::Error;

/// A mesh or texture could not be loaded.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Resource key that was being loaded.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported mesh format.
    #[error("unknown mesh format '{extension}' for '{path}'")]
    UnknownFormat {
        /// Resource key that was being loaded.
        path: String,
        /// Lower-cased extension, empty when the path has none.
        extension: String,
    },

    /// The mesh data was invalid or corrupt.
    #[error("failed to parse mesh '{path}': {message}")]
    Parse {
        /// Resource key that was being loaded.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The mesh contained no vertices, so no bounding box can be built.
    #[error("mesh '{0}' has no vertices")]
    EmptyMesh(String),

    /// Texture coordinates do not line up with positions.
    #[error("mesh '{path}' has {positions} positions but {tex_coords} texture coordinates")]
    MismatchedTexCoords {
        /// Resource key that was being loaded.
        path: String,
        /// Number of vertex positions.
        positions: usize,
        /// Number of texture coordinates.
        tex_coords: usize,
    },

    /// The texture is empty or larger than the device allows.
    #[error("texture '{path}' is {width}x{height}, sides must be within 1..={max}")]
    TextureSize {
        /// Resource key that was being loaded.
        path: String,
        /// Decoded width in texels.
        width: u32,
        /// Decoded height in texels.
        height: u32,
        /// Largest side the device accepts.
        max: u32,
    },

    /// The texture image could not be decoded.
    #[error("failed to load texture '{path}': {source}")]
    Image {
        /// Resource key that was being loaded.
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// An effect (shader) could not be set up.
#[derive(Error, Debug)]
pub enum ShaderError {
    /// The shader file could not be read.
    #[error("failed to read effect '{path}': {source}")]
    Io {
        /// Resource key that was being loaded.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The WGSL source did not parse.
    #[error("failed to compile effect '{path}':\n{message}")]
    Compile {
        /// Resource key that was being loaded.
        path: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// The module parsed but failed validation.
    #[error("effect '{path}' failed validation: {message}")]
    Validation {
        /// Resource key that was being loaded.
        path: String,
        /// Validator diagnostic.
        message: String,
    },

    /// A required entry point is missing or has the wrong stage.
    #[error("effect '{path}' has no {stage} entry point named '{name}'")]
    MissingEntryPoint {
        /// Resource key that was being loaded.
        path: String,
        /// Expected entry point name.
        name: &'static str,
        /// Expected pipeline stage.
        stage: &'static str,
    },

    /// A required global is missing or bound to the wrong slot.
    #[error("effect '{path}' has no variable '{name}' at @group({group}) @binding({binding})")]
    MissingVariable {
        /// Resource key that was being loaded.
        path: String,
        /// Expected variable name.
        name: &'static str,
        /// Expected bind group.
        group: u32,
        /// Expected binding index.
        binding: u32,
    },

    /// The vertex entry point does not accept the textured vertex layout.
    #[error("effect '{path}' does not match the vertex layout: {message}")]
    InputLayout {
        /// Resource key that was being loaded.
        path: String,
        /// What did not match.
        message: String,
    },

    /// The GPU rejected the render pipeline.
    #[error("failed to create pipeline for effect '{path}': {message}")]
    Pipeline {
        /// Resource key that was being loaded.
        path: String,
        /// Device diagnostic.
        message: String,
    },
}

/// Any failure while initializing a single scene object.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Mesh or texture failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Effect failure.
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Scene construction failed. Always fatal.
#[derive(Error, Debug)]
pub enum SceneError {
    /// An object failed to initialize.
    #[error("failed to initialize scene object '{name}'")]
    ObjectSetup {
        /// Name of the object that failed.
        name: String,
        #[source]
        source: SetupError,
    },

    /// The window or GPU device could not be created.
    #[error("graphics setup failed: {0}")]
    Gpu(String),

    /// The window could not be opened.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not start or stopped with an error.
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
