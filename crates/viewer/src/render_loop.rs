use crate::session::ViewportSession;
use geoview_render::RenderBackend;

/// Rotation added around X on every displayed frame, in radians.
pub const ROTATION_STEP_X: f32 = 0.01;
/// Rotation added around Y on every displayed frame, in radians.
pub const ROTATION_STEP_Y: f32 = 0.015;

/// Per-frame redraw callback state.
///
/// The host calls [`RenderLoop::tick`] on each display refresh and schedules
/// the next refresh while `tick` returns `true`. Cancelling stops future
/// ticks; a tick already in progress completes.
#[derive(Debug, Default)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            tracing::debug!("render loop started");
        }
    }

    pub fn cancel(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!(frames = self.frames, "render loop cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance rotation (when enabled) and draw one frame.
    ///
    /// The step is fixed per frame, so rotation speed follows the display
    /// refresh rate. Render failures are logged and the loop keeps going.
    /// Returns whether another frame should be scheduled.
    pub fn tick<B: RenderBackend>(
        &mut self,
        session: &mut ViewportSession<B>,
        auto_rotate: bool,
        target: &B::Target,
    ) -> bool {
        if !self.running {
            return false;
        }
        if auto_rotate {
            session.advance_rotation(ROTATION_STEP_X, ROTATION_STEP_Y);
        }
        if let Err(e) = session.render_frame(target) {
            tracing::warn!("frame {} failed: {e}", self.frames);
        }
        self.frames += 1;
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoview_common::{Rotation, ViewportSize};
    use geoview_render::HeadlessBackend;

    fn session() -> ViewportSession<HeadlessBackend> {
        let mut s =
            ViewportSession::initialize(HeadlessBackend::new(), ViewportSize::new(800, 600)).unwrap();
        s.set_active("cylinder", false).unwrap();
        s
    }

    fn rotation(s: &ViewportSession<HeadlessBackend>) -> Rotation {
        s.slot().instance().unwrap().rotation
    }

    #[test]
    fn idle_loop_draws_nothing() {
        let mut s = session();
        let mut lp = RenderLoop::new();
        assert!(!lp.tick(&mut s, true, &()));
        assert_eq!(s.backend().frames_rendered(), 0);
        assert_eq!(rotation(&s), Rotation::ZERO);
    }

    #[test]
    fn rotation_accumulates_fixed_steps() {
        let mut s = session();
        let mut lp = RenderLoop::new();
        lp.start();
        for _ in 0..10 {
            assert!(lp.tick(&mut s, true, &()));
        }
        let r = rotation(&s);
        assert!((r.x - 10.0 * ROTATION_STEP_X).abs() < 1e-5);
        assert!((r.y - 10.0 * ROTATION_STEP_Y).abs() < 1e-5);
        assert_eq!(lp.frames(), 10);
        assert_eq!(s.backend().frames_rendered(), 10);
    }

    #[test]
    fn paused_rotation_stays_frozen_then_resumes() {
        let mut s = session();
        let mut lp = RenderLoop::new();
        lp.start();
        lp.tick(&mut s, true, &());
        let frozen = rotation(&s);
        for _ in 0..25 {
            lp.tick(&mut s, false, &());
        }
        assert_eq!(rotation(&s), frozen);
        assert_eq!(s.backend().frames_rendered(), 26);

        lp.tick(&mut s, true, &());
        let r = rotation(&s);
        assert!((r.x - (frozen.x + ROTATION_STEP_X)).abs() < 1e-6);
        assert!((r.y - (frozen.y + ROTATION_STEP_Y)).abs() < 1e-6);
    }

    #[test]
    fn cancel_stops_scheduling() {
        let mut s = session();
        let mut lp = RenderLoop::new();
        lp.start();
        lp.tick(&mut s, true, &());
        lp.cancel();
        assert!(!lp.is_running());
        assert!(!lp.tick(&mut s, true, &()));
        assert_eq!(s.backend().frames_rendered(), 1);
    }

    #[test]
    fn failed_frame_keeps_loop_alive() {
        let mut s = session();
        s.teardown();
        let mut lp = RenderLoop::new();
        lp.start();
        assert!(lp.tick(&mut s, true, &()));
        assert_eq!(lp.frames(), 1);
    }
}
