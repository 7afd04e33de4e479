use std::sync::mpsc::{self, Receiver, Sender};

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::field::ParticleField;
use crate::interaction::{HoverState, InteractionController};
use crate::render::{RenderSink, Rgba};
use crate::settings::{resolve, BoundaryError, Bounds, PartialSettings, Settings};

/// Reports the size of the drawable surface.
pub trait Surface {
    fn size(&self) -> Result<(u32, u32), BoundaryError>;
}

/// Asks the host for one more call to [`Engine::on_tick`].
pub trait FrameScheduler {
    fn request_next_tick(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initializing,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

/// Sends pointer events from any thread. They are applied at the start of the next tick.
#[derive(Debug, Clone)]
pub struct PointerHandle {
    sender: Sender<PointerEvent>,
}

impl PointerHandle {
    /// Returns false once the engine is gone.
    pub fn enter(&self) -> bool {
        self.sender.send(PointerEvent::Enter).is_ok()
    }

    pub fn leave(&self) -> bool {
        self.sender.send(PointerEvent::Leave).is_ok()
    }
}

/// A surface with a size fixed up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSurface {
    pub width: u32,
    pub height: u32,
}

impl Surface for FixedSurface {
    fn size(&self) -> Result<(u32, u32), BoundaryError> {
        Ok((self.width, self.height))
    }
}

/// Scheduler for hosts that pull frames themselves: a request stays pending
/// until [`ManualScheduler::take_pending`] is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: usize,
}

impl ManualScheduler {
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_next_tick(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

pub struct Engine<S, R, F> {
    surface: S,
    sink: R,
    scheduler: F,
    partial: PartialSettings,
    settings: Option<Settings>,
    bounds: Option<Bounds>,
    field: ParticleField,
    interaction: InteractionController,
    state: EngineState,
    rng: StdRng,
    events: Receiver<PointerEvent>,
    events_sender: Sender<PointerEvent>,
}

impl<S: Surface, R: RenderSink, F: FrameScheduler> Engine<S, R, F> {
    pub fn new(surface: S, sink: R, scheduler: F, settings: PartialSettings) -> Self {
        Engine::with_rng(surface, sink, scheduler, settings, StdRng::from_os_rng())
    }

    /// Same particles on every start for a given seed and surface.
    pub fn with_seed(surface: S, sink: R, scheduler: F, settings: PartialSettings, seed: u64) -> Self {
        Engine::with_rng(surface, sink, scheduler, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(surface: S, sink: R, scheduler: F, settings: PartialSettings, rng: StdRng) -> Self {
        let (events_sender, events) = mpsc::channel();
        Engine {
            surface,
            sink,
            scheduler,
            partial: settings,
            settings: None,
            bounds: None,
            field: ParticleField::new(),
            interaction: InteractionController::new(),
            state: EngineState::Idle,
            rng,
            events,
            events_sender,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn hover_state(&self) -> HoverState {
        self.interaction.state()
    }

    /// Resolved settings of the current run, if a start has succeeded.
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn pointer_handle(&self) -> PointerHandle {
        PointerHandle {
            sender: self.events_sender.clone(),
        }
    }

    /// Resolves the settings against the surface and builds a fresh field.
    ///
    /// Does nothing unless the engine is idle or stopped. A zero-sized or
    /// unavailable surface leaves the engine stopped with no particles.
    pub fn start(&mut self) {
        if !matches!(self.state, EngineState::Idle | EngineState::Stopped) {
            log::debug!("start ignored, engine is {:?}", self.state);
            return;
        }
        self.state = EngineState::Initializing;
        log::info!("initializing particle field");

        let prepared = self.surface.size().and_then(|(width, height)| {
            log::info!("surface size (w, h): ({width}, {height})");
            Ok((Bounds::new(width, height)?, resolve(&self.partial, width, height)?))
        });
        let (bounds, settings) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                log::error!("{err}; give the surface a non-zero size and call start again");
                self.field = ParticleField::new();
                self.settings = None;
                self.bounds = None;
                self.state = EngineState::Stopped;
                log::info!("engine stopped");
                return;
            }
        };

        self.field.initialize(&settings, &mut self.rng);
        self.interaction.reset();
        self.discard_pointer_events();
        self.settings = Some(settings);
        self.bounds = Some(bounds);
        self.state = EngineState::Running;
        log::info!("engine running with {} particles", self.field.len());
        self.scheduler.request_next_tick();
    }

    pub fn stop(&mut self) {
        if self.state != EngineState::Stopped {
            log::info!("engine stopped");
        }
        self.state = EngineState::Stopped;
        self.discard_pointer_events();
    }

    fn discard_pointer_events(&mut self) {
        while self.events.try_recv().is_ok() {}
    }

    /// One frame: pending pointer events, particle update, render, next request.
    pub fn on_tick(&mut self) {
        if self.state != EngineState::Running {
            // Signals sent while not running are stale.
            self.discard_pointer_events();
            return;
        }
        while let Ok(event) = self.events.try_recv() {
            match event {
                PointerEvent::Enter => self.on_pointer_enter(),
                PointerEvent::Leave => self.on_pointer_leave(),
            }
        }

        let (Some(bounds), Some(settings)) = (self.bounds, self.settings) else {
            return;
        };
        self.field.tick(bounds);
        self.render(bounds, &settings);
        self.scheduler.request_next_tick();
    }

    fn render(&mut self, bounds: Bounds, settings: &Settings) {
        self.sink.clear(bounds);
        let particles = self.field.particles();
        // Links first so particles cover their ends.
        for link in self.field.compute_links(settings.tolerance) {
            self.sink.draw_line(
                particles[link.a].position,
                particles[link.b].position,
                settings.line_width,
                Rgba::white(link.opacity),
            );
        }
        for particle in particles {
            let params = particle.render_params();
            self.sink.draw_disc(params.center, params.radius, params.fill);
        }
    }

    pub fn on_pointer_enter(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(settings) = &self.settings {
            self.interaction.pointer_enter(&mut self.field, settings.multiplier_in);
        }
    }

    pub fn on_pointer_leave(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(settings) = &self.settings {
            self.interaction.pointer_leave(&mut self.field, settings.multiplier_out);
        }
    }

    /// Takes effect on the next enter edge.
    pub fn set_multiplier_in(&mut self, value: f64) {
        self.partial.multiplier_in = Some(value);
        if let Some(settings) = self.settings.as_mut() {
            settings.set_multiplier_in(value);
        }
    }

    /// Takes effect on the next leave edge.
    pub fn set_multiplier_out(&mut self, value: f64) {
        self.partial.multiplier_out = Some(value);
        if let Some(settings) = self.settings.as_mut() {
            settings.set_multiplier_out(value);
        }
    }
}
