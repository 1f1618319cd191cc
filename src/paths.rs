//! Resource keys for the kitchen level.
//!
//! Keys starting with `builtin:` never touch the filesystem. File keys are
//! relative to the working directory, and an object whose file is missing
//! fails to initialize.

use crate::geometry::{BUILTIN_CUBE, BUILTIN_PLANE};
use crate::texture::{BUILTIN_MISSING, BUILTIN_TILES, BUILTIN_WHITE};

/// Content directory holding the file-based models and textures.
pub const CONTENT_DIR: &str = "Content";

pub const MODEL_CUBE: &str = BUILTIN_CUBE;
pub const MODEL_PLANE: &str = BUILTIN_PLANE;
pub const MODEL_PLAYER: &str = BUILTIN_CUBE;
pub const MODEL_KITCHEN_COUNTER: &str = "Content/Models/kitchenCounter.obj";
pub const MODEL_APPLE: &str = "Content/Models/apple.obj";

pub const TEXTURE_MISSING: &str = BUILTIN_MISSING;
pub const TEXTURE_TILES: &str = BUILTIN_TILES;
pub const TEXTURE_PLAYER: &str = BUILTIN_WHITE;
pub const TEXTURE_KITCHEN_COUNTER: &str = "Content/Textures/CounterPhotoRealistic.jpg";
pub const TEXTURE_APPLE: &str = "Content/Textures/appleD.jpg";
