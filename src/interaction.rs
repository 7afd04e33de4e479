use crate::field::ParticleField;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Out,
    In,
}

/// Applies the hover multipliers to a field, once per enter/leave edge.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: HoverState,
}

impl InteractionController {
    pub fn new() -> Self {
        InteractionController::default()
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    /// Returns whether this signal was an edge and the multiplier was applied.
    pub fn pointer_enter(&mut self, field: &mut ParticleField, multiplier_in: f64) -> bool {
        if self.state == HoverState::In {
            return false;
        }
        log::debug!("pointer in, changing multiplier to {multiplier_in}");
        field.set_global_multiplier(multiplier_in);
        self.state = HoverState::In;
        true
    }

    pub fn pointer_leave(&mut self, field: &mut ParticleField, multiplier_out: f64) -> bool {
        if self.state == HoverState::Out {
            return false;
        }
        log::debug!("pointer out, changing multiplier to {multiplier_out}");
        field.set_global_multiplier(multiplier_out);
        self.state = HoverState::Out;
        true
    }

    /// Back to `Out` without touching any particle; used when the field is rebuilt.
    pub fn reset(&mut self) {
        self.state = HoverState::Out;
    }
}
