//! A simulated keep-up game that can be captured and clicked.
//!
//! The scene is a game window placed on a virtual screen. A ball rests at
//! the spawn point until it is clicked; each click within its radius kicks
//! it upward and sideways (away from the click), after which it falls
//! under gravity with linear drag and bounces off the side walls. When it
//! drops well below the window the round ends and the ball respawns.
//!
//! Positions inside the scene are window pixels with `y` growing
//! downward, like the screen.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use kickbot_common::error::{KickbotError, KickbotResult};
use kickbot_platform_core::frame::BGRA_CHANNELS;
use kickbot_platform_core::{Frame, MouseButton, PointerControl, ScreenCapture};
use kickbot_tracking_model::{CaptureRegion, FrameSize, ScreenPoint};

const BACKGROUND: [u8; 4] = [40, 30, 30, 255];
const BALL: [u8; 4] = [255, 255, 255, 255];
const OFF_WINDOW: [u8; 4] = [0, 0, 0, 255];

/// Longest single integration step.
const MAX_SUBSTEP: f32 = 1.0 / 240.0;
/// Wall-clock gaps longer than this are clamped when advancing in real time.
const MAX_REALTIME_STEP: Duration = Duration::from_millis(250);

/// Physical constants and layout of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size of the virtual screen.
    pub screen: FrameSize,
    /// Screen position of the game window's top-left corner.
    pub window_origin: CaptureRegion,
    pub window: FrameSize,
    /// Ball radius in pixels.
    pub ball_radius: f32,
    /// Downward acceleration, px/s².
    pub gravity: f32,
    /// Linear drag coefficient, 1/s.
    pub drag: f32,
    /// Smallest upward speed after a kick, px/s.
    pub min_kick: f32,
    /// Largest upward speed after a kick, px/s.
    pub max_kick: f32,
    /// Sideways speed added per radius of click offset, px/s.
    pub side_kick: f32,
    /// Limit on horizontal speed, px/s.
    pub max_side_speed: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            screen: FrameSize::new(1920, 1080),
            window_origin: CaptureRegion::new(316, 799),
            window: FrameSize::new(320, 455),
            ball_radius: 38.0,
            gravity: 2000.0,
            drag: 0.01,
            min_kick: 900.0,
            max_kick: 1500.0,
            side_kick: 450.0,
            max_side_speed: 1000.0,
        }
    }
}

impl SceneConfig {
    /// Fraction of the window the ball covers.
    pub fn ball_coverage(&self) -> f32 {
        let area = self.window.area() as f32;
        if area == 0.0 {
            return 0.0;
        }
        std::f32::consts::PI * self.ball_radius * self.ball_radius / area
    }

    /// Ball diameter relative to the window width.
    pub fn relative_ball_width(&self) -> f32 {
        2.0 * self.ball_radius / self.window.width.max(1) as f32
    }

    fn spawn(&self) -> (f32, f32) {
        (
            self.window.width as f32 / 2.0,
            self.window.height as f32 - self.ball_radius - 10.0,
        )
    }
}

/// Running totals for the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    /// Kicks in the current round.
    pub score: u32,
    pub high_score: u32,
    pub clicks: u64,
    pub misses: u64,
    /// Rounds ended by the ball falling out.
    pub drops: u64,
    /// Side wall hits.
    pub bounces: u64,
}

#[derive(Debug)]
struct SceneState {
    config: SceneConfig,
    pos: (f32, f32),
    vel: (f32, f32),
    playing: bool,
    pointer: Option<ScreenPoint>,
    stats: SceneStats,
}

impl SceneState {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            pos: config.spawn(),
            vel: (0.0, 0.0),
            playing: false,
            pointer: None,
            stats: SceneStats::default(),
        }
    }

    fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            if !self.playing {
                return;
            }
            self.integrate(h);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let c = self.config;
        let ax = -c.drag * self.vel.0;
        let ay = c.gravity - c.drag * self.vel.1;
        self.vel.0 += ax * dt;
        self.vel.1 += ay * dt;
        self.pos.0 += self.vel.0 * dt;
        self.pos.1 += self.vel.1 * dt;

        let width = c.window.width as f32;
        if self.pos.0 - c.ball_radius < 0.0 {
            self.pos.0 = c.ball_radius;
            self.vel.0 = self.vel.0.abs();
            self.stats.bounces += 1;
        } else if self.pos.0 + c.ball_radius > width {
            self.pos.0 = width - c.ball_radius;
            self.vel.0 = -self.vel.0.abs();
            self.stats.bounces += 1;
        }

        if self.pos.1 - 5.0 * c.ball_radius > c.window.height as f32 {
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        self.stats.drops += 1;
        self.stats.high_score = self.stats.high_score.max(self.stats.score);
        self.stats.score = 0;
        self.playing = false;
        self.pos = self.config.spawn();
        self.vel = (0.0, 0.0);
        tracing::debug!(high_score = self.stats.high_score, "Ball dropped");
    }

    fn click(&mut self, point: ScreenPoint) -> bool {
        let c = self.config;
        let x = (point.x - c.window_origin.left) as f32;
        let y = (point.y - c.window_origin.top) as f32;
        self.stats.clicks += 1;

        let (dx, dy) = (x - self.pos.0, y - self.pos.1);
        if (dx * dx + dy * dy).sqrt() > c.ball_radius {
            self.stats.misses += 1;
            return false;
        }

        self.playing = true;
        self.stats.score += 1;
        self.stats.high_score = self.stats.high_score.max(self.stats.score);
        self.vel.1 = (self.vel.1 - c.min_kick).clamp(-c.max_kick, -c.min_kick);
        self.vel.0 = (self.vel.0 - dx / c.ball_radius * c.side_kick)
            .clamp(-c.max_side_speed, c.max_side_speed);
        true
    }

    fn render(&self, frame: &mut Frame, origin: CaptureRegion) {
        let c = self.config;
        let r2 = c.ball_radius * c.ball_radius;
        for row in 0..frame.size.height as usize {
            let wy = origin.top + row as i32 - c.window_origin.top;
            let out = frame.visible_row_mut(row);
            for (col, px) in out.chunks_exact_mut(BGRA_CHANNELS).enumerate() {
                let wx = origin.left + col as i32 - c.window_origin.left;
                let colour = if wx < 0
                    || wy < 0
                    || wx >= c.window.width as i32
                    || wy >= c.window.height as i32
                {
                    OFF_WINDOW
                } else {
                    let dx = wx as f32 + 0.5 - self.pos.0;
                    let dy = wy as f32 + 0.5 - self.pos.1;
                    if dx * dx + dy * dy <= r2 {
                        BALL
                    } else {
                        BACKGROUND
                    }
                };
                px.copy_from_slice(&colour);
            }
        }
    }
}

/// Capture side of the scene.
pub struct SyntheticScene {
    state: Arc<Mutex<SceneState>>,
    frame: Frame,
    realtime: bool,
    last_grab: Option<Instant>,
}

impl SyntheticScene {
    /// A scene whose ball moves with wall-clock time between grabs.
    pub fn new(config: SceneConfig, capture_size: FrameSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState::new(config))),
            frame: Frame::new(capture_size),
            realtime: true,
            last_grab: None,
        }
    }

    /// A scene that only moves when [`SceneHandle::advance`] is called.
    pub fn manual(config: SceneConfig, capture_size: FrameSize) -> Self {
        Self {
            realtime: false,
            ..Self::new(config, capture_size)
        }
    }

    /// Pointer that clicks into this scene.
    pub fn pointer(&self) -> ScenePointer {
        ScenePointer {
            state: self.state.clone(),
        }
    }

    /// Read-only view for stats and test control.
    pub fn handle(&self) -> SceneHandle {
        SceneHandle {
            state: self.state.clone(),
        }
    }
}

impl ScreenCapture for SyntheticScene {
    fn grab(&mut self, origin: CaptureRegion) -> KickbotResult<&Frame> {
        let mut state = self.state.lock();
        let screen = state.config.screen;
        if origin.top < 0
            || origin.left < 0
            || origin.top >= screen.height as i32
            || origin.left >= screen.width as i32
        {
            return Err(KickbotError::capture(format!(
                "capture origin ({}, {}) is outside the {}x{} screen",
                origin.top, origin.left, screen.width, screen.height
            )));
        }

        if self.realtime {
            let now = Instant::now();
            if let Some(last) = self.last_grab {
                let gap = now.saturating_duration_since(last).min(MAX_REALTIME_STEP);
                state.advance(gap.as_secs_f32());
            }
            self.last_grab = Some(now);
        }

        let max = self.frame.buffer_size;
        self.frame.size = FrameSize::new(
            max.width.min(screen.width - origin.left as u32),
            max.height.min(screen.height - origin.top as u32),
        );
        state.render(&mut self.frame, origin);
        Ok(&self.frame)
    }

    fn max_size(&self) -> FrameSize {
        self.frame.buffer_size
    }
}

/// Shared view of a running scene.
#[derive(Clone)]
pub struct SceneHandle {
    state: Arc<Mutex<SceneState>>,
}

impl SceneHandle {
    pub fn stats(&self) -> SceneStats {
        self.state.lock().stats
    }

    /// Advance the simulation by `dt` seconds.
    pub fn advance(&self, dt: f32) {
        self.state.lock().advance(dt);
    }

    /// Ball centre in window pixels.
    pub fn ball_position(&self) -> (f32, f32) {
        self.state.lock().pos
    }

    /// Ball velocity in window pixels per second.
    pub fn ball_velocity(&self) -> (f32, f32) {
        self.state.lock().vel
    }

    /// Ball centre on the virtual screen.
    pub fn ball_screen_point(&self) -> ScreenPoint {
        let state = self.state.lock();
        ScreenPoint::new(
            state.config.window_origin.left + state.pos.0 as i32,
            state.config.window_origin.top + state.pos.1 as i32,
        )
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Last position the pointer was moved to.
    pub fn pointer_position(&self) -> Option<ScreenPoint> {
        self.state.lock().pointer
    }

    pub fn config(&self) -> SceneConfig {
        self.state.lock().config
    }
}

/// Pointer that delivers clicks to the scene.
pub struct ScenePointer {
    state: Arc<Mutex<SceneState>>,
}

impl PointerControl for ScenePointer {
    fn move_to(&mut self, point: ScreenPoint) -> KickbotResult<()> {
        self.state.lock().pointer = Some(point);
        Ok(())
    }

    fn click(&mut self, point: ScreenPoint, button: MouseButton) -> KickbotResult<()> {
        let mut state = self.state.lock();
        state.pointer = Some(point);
        if button == MouseButton::Left {
            state.click(point);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SceneConfig {
        SceneConfig {
            screen: FrameSize::new(800, 600),
            window_origin: CaptureRegion::new(100, 200),
            window: FrameSize::new(320, 455),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn test_ball_rests_until_kicked() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let spawn = handle.ball_position();

        handle.advance(1.0);
        assert_eq!(handle.ball_position(), spawn);
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_centre_click_kicks_straight_up() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let mut pointer = scene.pointer();

        pointer
            .click(handle.ball_screen_point(), MouseButton::Left)
            .unwrap();
        let (vx, vy) = handle.ball_velocity();
        assert_eq!(vy, -900.0);
        assert!(vx.abs() < 450.0 / 38.0 + 1e-3);
        assert!(handle.is_playing());
        assert_eq!(handle.stats().score, 1);

        let y0 = handle.ball_position().1;
        handle.advance(0.1);
        assert!(handle.ball_position().1 < y0);
        assert_eq!(handle.stats().bounces, 0);
    }

    #[test]
    fn test_off_centre_click_pushes_away() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let mut pointer = scene.pointer();

        let centre = handle.ball_screen_point();
        pointer
            .click(ScreenPoint::new(centre.x + 19, centre.y), MouseButton::Left)
            .unwrap();
        assert!(handle.ball_velocity().0 < -200.0);
    }

    #[test]
    fn test_miss_is_counted() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let mut pointer = scene.pointer();

        pointer
            .click(ScreenPoint::new(200, 100), MouseButton::Left)
            .unwrap();
        let stats = handle.stats();
        assert_eq!(stats.clicks, 1);
        assert_eq!(stats.misses, 1);
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_drop_ends_round_and_respawns() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let mut pointer = scene.pointer();
        let spawn = handle.ball_position();

        pointer
            .click(handle.ball_screen_point(), MouseButton::Left)
            .unwrap();
        handle.advance(3.0);

        let stats = handle.stats();
        assert_eq!(stats.drops, 1);
        assert_eq!(stats.score, 0);
        assert_eq!(stats.high_score, 1);
        assert!(!handle.is_playing());
        assert_eq!(handle.ball_position(), spawn);
    }

    #[test]
    fn test_walls_reflect_horizontal_speed() {
        let scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let handle = scene.handle();
        let mut pointer = scene.pointer();

        // Kick hard to the left by clicking the ball's right edge
        let centre = handle.ball_screen_point();
        pointer
            .click(ScreenPoint::new(centre.x + 37, centre.y), MouseButton::Left)
            .unwrap();
        handle.advance(0.3);

        let (x, _) = handle.ball_position();
        assert!(x >= 38.0);
        assert!(handle.ball_velocity().0 > 0.0);
        assert_eq!(handle.stats().bounces, 1);
    }

    #[test]
    fn test_render_draws_ball_at_its_position() {
        let mut scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let origin = config().window_origin;
        let frame = scene.grab(origin).unwrap();

        // Spawn is (160, 407) in window pixels
        let row = frame.visible_row(407);
        assert_eq!(&row[160 * 4..160 * 4 + 4], &BALL);
        let top_row = frame.visible_row(0);
        assert_eq!(&top_row[..4], &BACKGROUND);
    }

    #[test]
    fn test_capture_near_bottom_is_cropped() {
        let mut scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        let frame = scene.grab(CaptureRegion::new(400, 200)).unwrap();
        assert_eq!(frame.size, FrameSize::new(320, 200));
        assert_eq!(frame.rows_skipped(), 255);
    }

    #[test]
    fn test_origin_off_screen_is_an_error() {
        let mut scene = SyntheticScene::manual(config(), FrameSize::new(320, 455));
        assert!(matches!(
            scene.grab(CaptureRegion::new(-1, 0)),
            Err(KickbotError::Capture { .. })
        ));
    }

    #[test]
    fn test_coverage_matches_radius() {
        let c = config();
        let expected = std::f32::consts::PI * 38.0 * 38.0 / (320.0 * 455.0);
        assert!((c.ball_coverage() - expected).abs() < 1e-6);
        assert!((c.relative_ball_width() - 0.2375).abs() < 1e-6);
    }
}
