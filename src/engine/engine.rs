use glam::IVec2;
use tracing::{error, info};

use crate::{
    config::EngineConfig,
    engine::interact::{Interaction, interact},
    renderer::{DebugFlags, RenderContext, Renderer, Rgba},
    world::{Cell, GridMap, OverlayLayer, Pose, SpriteRecord, TextureStore, overlay},
};

/// Per-frame inputs owned by game code.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput<'a> {
    pub sprites: &'a [SpriteRecord],
    pub attacking: bool,
    pub time_ms: u64,
}

/// Owns the world state and a renderer; one instance per window.
pub struct Engine<R: Renderer> {
    pub renderer: R,
    map: GridMap,
    pose: Pose,
    textures: TextureStore,
    overlays: OverlayLayer,
    config: EngineConfig,
    debug: DebugFlags,
    width: usize,
    height: usize,
    /// Last frame error, so a repeating failure is logged once.
    last_error: Option<String>,
}

impl<R: Renderer> Engine<R> {
    /// Start on the built-in fallback room; call [`Engine::set_map`] to load
    /// a level.
    pub fn new(
        renderer: R,
        textures: TextureStore,
        config: EngineConfig,
        width: usize,
        height: usize,
    ) -> Self {
        let mut engine = Self {
            renderer,
            map: GridMap::fallback(),
            pose: Pose::default(),
            textures,
            overlays: OverlayLayer::default(),
            config,
            debug: DebugFlags::empty(),
            width,
            height,
            last_error: None,
        };
        engine.set_map(GridMap::fallback());
        engine
    }

    /// Replace the level: reset the pose to the start cell and re-place
    /// depth overlays.
    pub fn set_map(&mut self, map: GridMap) {
        let start = map
            .player_start()
            .or_else(|| first_floor(&map))
            .unwrap_or(IVec2::ONE);
        self.pose = Pose::at_cell(start.x, start.y, 0.0);

        let names = self.textures.overlay_names();
        let sections = overlay::generate(&map, &self.config.depth_textures, &names);
        self.overlays = OverlayLayer::new(sections);

        info!(
            w = map.width(),
            h = map.height(),
            x = start.x,
            y = start.y,
            overlays = self.overlays.sections().len(),
            "map set"
        );
        self.map = map;
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Direct object access for game code (unlocking, scripted doors).
    pub fn map_mut(&mut self) -> &mut GridMap {
        &mut self.map
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn debug(&self) -> DebugFlags {
        self.debug
    }

    pub fn set_debug(&mut self, on: bool) {
        self.debug = if on {
            DebugFlags::all()
        } else {
            DebugFlags::empty()
        };
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug.toggle(DebugFlags::all());
        !self.debug.is_empty()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    // ---------------------------------------------------------------------
    // Player actions
    // ---------------------------------------------------------------------

    /// Walk forward (negative = back); scaled by `move_speed`.
    pub fn move_player(&mut self, distance: f32) {
        self.pose
            .advance(&self.map, distance * self.config.move_speed);
    }

    /// Sidestep right (negative = left); scaled by `move_speed`.
    pub fn strafe_player(&mut self, distance: f32) {
        self.pose
            .strafe(&self.map, distance * self.config.move_speed);
    }

    /// Turn towards +Y (negative = the other way); scaled by `rotation_speed`.
    pub fn rotate_player(&mut self, angle: f32) {
        self.pose.turn(angle * self.config.rotation_speed);
    }

    /// Use whatever is in front of (or right next to) the player.
    pub fn interact(&mut self) -> Option<Interaction> {
        interact(&mut self.map, &self.pose, self.config.interact_range)
    }

    // ---------------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------------

    /// Draw one frame and hand the pixels to `submit`.
    ///
    /// A failing frame is logged and replaced by an error banner; the
    /// caller always gets a buffer.
    pub fn render(&mut self, input: FrameInput<'_>, submit: impl FnOnce(&[Rgba], usize, usize)) {
        if self.debug.contains(DebugFlags::TINT_SECRETS) {
            self.textures.ensure_debug_variants();
        }

        self.renderer.begin_frame(self.width, self.height);

        let ctx = RenderContext {
            pose: self.pose,
            map: &self.map,
            sprites: input.sprites,
            textures: &self.textures,
            overlays: &self.overlays,
            config: &self.config,
            debug: self.debug,
            attacking: input.attacking,
            time_ms: input.time_ms,
        };

        match self.renderer.draw_frame(&ctx) {
            Ok(()) => self.last_error = None,
            Err(err) => {
                let msg = err.to_string();
                if self.last_error.as_deref() != Some(msg.as_str()) {
                    error!(%err, "frame failed");
                }
                self.renderer.draw_error(&msg);
                self.last_error = Some(msg);
            }
        }

        self.renderer.end_frame(submit);
    }
}

fn first_floor(map: &GridMap) -> Option<IVec2> {
    (0..map.height() as i32)
        .flat_map(|y| (0..map.width() as i32).map(move |x| (x, y)))
        .find(|&(x, y)| map.cell(x, y) == Some(Cell::Floor))
        .map(|(x, y)| IVec2::new(x, y))
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
