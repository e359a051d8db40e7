use crate::ViewerError;
use crate::render_loop::RenderLoop;
use crate::session::ViewportSession;
use crate::state::{StateChange, ViewerState};
use geoview_common::ViewportSize;
use geoview_input::Action;
use geoview_persist::{KeyValueStore, PreferenceStore};
use geoview_render::RenderBackend;

/// A mounted viewer: state, viewport session, render loop and preferences.
///
/// Actions mutate [`ViewerState`]; the session follows the state
/// synchronously and the preferences are written on every flag change.
pub struct Viewer<B: RenderBackend, S: KeyValueStore> {
    state: ViewerState,
    session: ViewportSession<B>,
    render_loop: RenderLoop,
    prefs: PreferenceStore<S>,
}

impl<B: RenderBackend, S: KeyValueStore> Viewer<B, S> {
    /// Load preferences, set up the session, show `initial_shape` and start
    /// the render loop.
    pub fn mount(
        backend: B,
        size: ViewportSize,
        prefs: PreferenceStore<S>,
        initial_shape: &str,
    ) -> Result<Self, ViewerError> {
        let state = ViewerState::new(prefs.load(), initial_shape);
        let mut session = ViewportSession::initialize(backend, size)?;
        session.set_active(state.active_shape_id(), state.wireframe_enabled())?;

        let mut render_loop = RenderLoop::new();
        render_loop.start();

        tracing::info!(
            shape = state.active_shape_id(),
            wireframe = state.wireframe_enabled(),
            auto_rotate = state.auto_rotate_enabled(),
            "viewer mounted"
        );
        Ok(Self {
            state,
            session,
            render_loop,
            prefs,
        })
    }

    /// Apply a user action and bring the scene and preferences in line.
    ///
    /// Failures are logged; nothing here is fatal to the host.
    pub fn dispatch(&mut self, action: &Action) -> StateChange {
        let change = match self.state.apply(action) {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!("ignoring {action:?}: {e}");
                return StateChange::None;
            }
        };
        // A failed switch leaves the slot empty; selecting again retries.
        let change = match (change, action) {
            (StateChange::None, Action::SelectShape(_))
                if self.is_mounted() && self.session.slot().is_empty() =>
            {
                StateChange::Shape
            }
            (change, _) => change,
        };
        match change {
            StateChange::Shape => {
                let id = self.state.active_shape_id();
                if let Err(e) = self.session.set_active(id, self.state.wireframe_enabled()) {
                    tracing::warn!("failed to show {id}: {e}");
                }
            }
            StateChange::Wireframe => {
                if let Err(e) = self.session.set_wireframe(self.state.wireframe_enabled()) {
                    tracing::warn!("failed to switch wireframe: {e}");
                }
                self.persist();
            }
            StateChange::AutoRotate => self.persist(),
            StateChange::None => {}
        }
        change
    }

    /// One display refresh. Returns whether another should be scheduled.
    pub fn frame(&mut self, target: &B::Target) -> bool {
        self.render_loop
            .tick(&mut self.session, self.state.auto_rotate_enabled(), target)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.session.resize(width, height);
    }

    /// Stop the render loop and release every graphics resource. Idempotent.
    pub fn unmount(&mut self) {
        if self.session.is_torn_down() {
            return;
        }
        self.render_loop.cancel();
        self.session.teardown();
        tracing::info!(frames = self.render_loop.frames(), "viewer unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        !self.session.is_torn_down()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn session(&self) -> &ViewportSession<B> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ViewportSession<B> {
        &mut self.session
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn preferences(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    fn persist(&mut self) {
        if let Err(e) = self.prefs.save(&self.state.preferences()) {
            tracing::warn!("failed to save preferences: {e}");
        }
    }
}
