use std::f32::consts::PI;

use anyhow::Context;
use telliverse::{
    AppConfig, BoundsSpace, GameConfig, Scene, SceneObject, Vec3, logging, paths, run,
};
use tracing::info;

/// Where the camera starts before the player hands it a tracked position.
const CAMERA_START: Vec3 = Vec3::new(-2.0, 6.0, 20.0);

/// Build the kitchen level.
fn kitchen(game: &GameConfig, aspect: f32) -> Scene {
    let mut scene = Scene::new(game.camera(aspect));
    scene.set_quit_key(game.quit_key);
    scene
        .camera_rig_mut()
        .camera_mut()
        .set_position(CAMERA_START);

    let mut floor = SceneObject::described(paths::MODEL_CUBE, "Floor", 0)
        .with_texture(paths::TEXTURE_TILES)
        .with_bounds_space(game.bounds_space);
    floor.set_position_scaled(Vec3::ZERO, 10.0, Vec3::new(0.0, -1.0, 0.0));
    let floor = scene.add(floor);

    let mut counter = SceneObject::described(paths::MODEL_KITCHEN_COUNTER, "Kitchen Counter", 1)
        .with_texture(paths::TEXTURE_KITCHEN_COUNTER)
        .with_bounds_space(game.bounds_space);
    counter.set_position_scaled(Vec3::new(0.0, PI, 0.0), 0.8, Vec3::new(0.0, -6.0, -10.0));
    scene.add(counter);

    let mut player = SceneObject::described(paths::MODEL_PLAYER, "Player", 2)
        .with_texture(paths::TEXTURE_PLAYER)
        .with_player(game.player.clone())
        .with_bounds_space(game.bounds_space);
    player.set_position_scaled(Vec3::new(0.0, 1.1, 0.0), 0.5, Vec3::new(-2.0, 5.0, -10.0));
    let player = scene.add(player);

    scene.follow(player);
    scene.watch_collision(player, floor);
    scene.on_collision(|event| {
        if event.changed && event.colliding {
            info!("the player landed on the floor");
        }
    });

    scene
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::new()
        .title("Hero of the Telliverse")
        .size(1024, 768);
    // The level places everything with scale and translation, so its boxes
    // must follow the world matrix for the player to land on the floor.
    let game = GameConfig::new().bounds_space(BoundsSpace::World);

    run(config, move |gpu| kitchen(&game, gpu.aspect())).context("the game stopped with an error")?;

    info!("goodbye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telliverse::{
        EffectHandle, MeshData, MeshHandle, ResourceError, ResourceLoader, SceneError,
        SetupError, ShaderError, TextureData, TextureHandle,
    };

    /// Reads meshes and textures from disk without a GPU.
    #[derive(Default)]
    struct DiskLoader {
        uploads: usize,
    }

    impl ResourceLoader for DiskLoader {
        fn load_effect(&mut self, _: &str) -> Result<EffectHandle, ShaderError> {
            Ok(EffectHandle::from_index(0))
        }

        fn upload_mesh(&mut self, _: &MeshData) -> MeshHandle {
            self.uploads += 1;
            MeshHandle::from_index(self.uploads - 1)
        }

        fn load_texture(&mut self, path: &str) -> Result<TextureHandle, ResourceError> {
            TextureData::load(path)?;
            Ok(TextureHandle::from_index(0))
        }
    }

    #[test]
    fn missing_counter_files_stop_the_level() {
        if std::path::Path::new(paths::MODEL_KITCHEN_COUNTER).exists() {
            return;
        }

        let mut scene = kitchen(&GameConfig::new(), 4.0 / 3.0);
        let mut loader = DiskLoader::default();
        let err = scene.initialize(&mut loader).unwrap_err();

        match err {
            SceneError::ObjectSetup { name, source } => {
                assert_eq!(name, "Kitchen Counter");
                assert!(matches!(source, SetupError::Resource(ResourceError::Io { .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Only the floor made it to the loader.
        assert_eq!(loader.uploads, 1);
    }
}
