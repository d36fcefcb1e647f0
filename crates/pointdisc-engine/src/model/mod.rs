//! Draw model: shader variant + covering-triangle geometry.
//!
//! A model is rebuilt only when the precision mode changes. Point data never
//! touches it; per-instance buffers are bound at draw time.

mod geometry;
mod shaders;

pub use geometry::{DiscGeometry, Topology, DISC_CIRCUMRADIUS, DISC_VERTEX_COUNT};
pub use shaders::{variant_for, ShaderLibrary, ShaderVariant, HIGH_PRECISION, STANDARD};

use crate::precision::{PrecisionChange, PrecisionMode};

/// Shader selection and static geometry for one precision mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    mode: PrecisionMode,
    variant: &'static str,
    geometry: DiscGeometry,
    generation: u64,
}

impl Model {
    #[inline]
    pub fn mode(&self) -> PrecisionMode {
        self.mode
    }

    /// Name of the shader variant in the [`ShaderLibrary`].
    #[inline]
    pub fn variant(&self) -> &'static str {
        self.variant
    }

    #[inline]
    pub fn geometry(&self) -> &DiscGeometry {
        &self.geometry
    }

    /// Increases every time the builder produces a new model.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Two-state machine (`Standard` / `HighPrecision`) driven by precision changes.
#[derive(Debug)]
pub struct ModelBuilder {
    mode: PrecisionMode,
    generation: u64,
}

impl ModelBuilder {
    pub fn new(mode: PrecisionMode) -> Self {
        Self { mode, generation: 0 }
    }

    #[inline]
    pub fn mode(&self) -> PrecisionMode {
        self.mode
    }

    /// Builds a model for the current mode.
    pub fn build(&mut self) -> Model {
        self.generation += 1;
        Model {
            mode: self.mode,
            variant: variant_for(self.mode),
            geometry: DiscGeometry::covering_triangle(),
            generation: self.generation,
        }
    }

    /// Applies a precision change; returns the rebuilt model on a transition.
    pub fn apply(&mut self, change: PrecisionChange) -> Option<Model> {
        if !change.is_transition() {
            return None;
        }
        let next = change.resulting_mode(self.mode);
        log::debug!("model: {:?} -> {:?}", self.mode, next);
        self.mode = next;
        Some(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_change_keeps_model() {
        let mut b = ModelBuilder::new(PrecisionMode::Standard);
        let first = b.build();
        assert!(b.apply(PrecisionChange::NoChange).is_none());
        assert_eq!(first.generation(), 1);
    }

    #[test]
    fn transitions_swap_variant_and_keep_geometry() {
        let mut b = ModelBuilder::new(PrecisionMode::Standard);
        let standard = b.build();
        assert_eq!(standard.variant(), STANDARD);

        let hp = b.apply(PrecisionChange::EnterHighPrecision).unwrap();
        assert_eq!(hp.mode(), PrecisionMode::HighPrecision);
        assert_eq!(hp.variant(), HIGH_PRECISION);
        assert_eq!(hp.geometry(), standard.geometry());
        assert!(hp.generation() > standard.generation());

        let back = b.apply(PrecisionChange::ExitHighPrecision).unwrap();
        assert_eq!(back.variant(), STANDARD);
        assert_eq!(b.mode(), PrecisionMode::Standard);
    }
}
