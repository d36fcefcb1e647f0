//! Precision-mode policy.
//!
//! Pure decision logic: compares two consecutive configuration snapshots and
//! reports whether the layer must enter or leave high-precision mode.

/// Interpretation of record positions.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CoordinateSystem {
    /// Positions are plain world units.
    #[default]
    Cartesian,
    /// Positions are `(longitude, latitude)` in degrees.
    Geographic,
}

/// The part of the layer configuration the policy looks at.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PrecisionConfig {
    pub high_precision_requested: bool,
    pub coordinate_system: CoordinateSystem,
}

impl PrecisionConfig {
    #[inline]
    pub const fn new(high_precision_requested: bool, coordinate_system: CoordinateSystem) -> Self {
        Self { high_precision_requested, coordinate_system }
    }

    /// Effective precision mode for this configuration.
    ///
    /// High precision only applies to geographic coordinates.
    #[inline]
    pub fn mode(self) -> PrecisionMode {
        if self.high_precision_requested && self.coordinate_system == CoordinateSystem::Geographic {
            PrecisionMode::HighPrecision
        } else {
            PrecisionMode::Standard
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PrecisionMode {
    #[default]
    Standard,
    HighPrecision,
}

/// Outcome of comparing two configuration snapshots.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrecisionChange {
    NoChange,
    /// Add the low-part position attribute and switch to the fp64 shader.
    EnterHighPrecision,
    /// Remove the low-part position attribute (idempotent) and switch back.
    ExitHighPrecision,
}

impl PrecisionChange {
    #[inline]
    pub fn is_transition(self) -> bool {
        self != PrecisionChange::NoChange
    }

    /// Mode the layer is in after applying this change.
    #[inline]
    pub fn resulting_mode(self, current: PrecisionMode) -> PrecisionMode {
        match self {
            PrecisionChange::NoChange => current,
            PrecisionChange::EnterHighPrecision => PrecisionMode::HighPrecision,
            PrecisionChange::ExitHighPrecision => PrecisionMode::Standard,
        }
    }
}

/// Decides the precision transition between `old` and `new`.
///
/// Only a change of `high_precision_requested` triggers a transition. A
/// request under Cartesian coordinates resolves to `ExitHighPrecision`, so the
/// low-part attribute is never added for non-geographic data.
pub fn decide(new: PrecisionConfig, old: PrecisionConfig) -> PrecisionChange {
    if new.high_precision_requested == old.high_precision_requested {
        PrecisionChange::NoChange
    } else if new.high_precision_requested
        && new.coordinate_system == CoordinateSystem::Geographic
    {
        PrecisionChange::EnterHighPrecision
    } else {
        PrecisionChange::ExitHighPrecision
    }
}
