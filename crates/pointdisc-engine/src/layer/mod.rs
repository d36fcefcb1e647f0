//! Point-cloud layer: per-frame orchestration.
//!
//! `PointCloudLayer` owns the attribute registry and the current model. Each
//! frame the host calls [`PointCloudLayer::update`] with the new configuration
//! and then [`PointCloudLayer::draw`] (or [`PointCloudLayer::render`] to go
//! straight to the GPU):
//!
//! 1. precision policy on (new, previous) config; registry + model follow it
//! 2. dirty attributes are recomputed over the whole dataset
//! 3. one instanced draw with merged uniforms

mod config;
mod draw;

pub mod uniforms;

pub use config::{LayerConfig, LightingParams};
pub use draw::{BoundBuffer, DrawRequest};
pub use uniforms::{UniformSet, UniformValue};

use anyhow::Result;

use crate::accessor::AccessorSet;
use crate::attributes::computers::{positions_64xy_low_spec, standard_attributes, POSITIONS_64_XY_LOW};
use crate::attributes::AttributeRegistry;
use crate::model::{Model, ModelBuilder};
use crate::precision::{self, CoordinateSystem, PrecisionChange, PrecisionMode};
use crate::render::{DiscRenderer, RenderCtx, RenderTarget};

use uniforms::{COORDINATE_SYSTEM, RADIUS_PIXELS};

pub struct PointCloudLayer<R> {
    config: LayerConfig,
    accessors: AccessorSet<R>,
    data: Vec<R>,
    registry: AttributeRegistry<R>,
    models: ModelBuilder,
    model: Model,
}

impl<R> PointCloudLayer<R> {
    /// Creates a layer with an empty dataset.
    ///
    /// The low-part position attribute is registered up front when `config`
    /// already resolves to high precision.
    pub fn new(config: LayerConfig, accessors: AccessorSet<R>) -> Self {
        let mode = config.precision().mode();

        let mut registry = AttributeRegistry::new();
        registry.add(standard_attributes());
        if mode == PrecisionMode::HighPrecision {
            registry.add([(POSITIONS_64_XY_LOW, positions_64xy_low_spec())]);
        }

        let mut models = ModelBuilder::new(mode);
        let model = models.build();

        Self { config, accessors, data: Vec::new(), registry, models, model }
    }

    /// Replaces the dataset and invalidates every attribute.
    pub fn set_data(&mut self, data: Vec<R>) {
        self.data = data;
        self.registry.invalidate_all();
    }

    /// Builder-style [`set_data`](Self::set_data).
    pub fn with_data(mut self, data: Vec<R>) -> Self {
        self.set_data(data);
        self
    }

    /// Applies a new configuration snapshot.
    ///
    /// On a precision transition every attribute is invalidated, the low-part
    /// attribute is added or removed, and the model is rebuilt. A change of
    /// coordinate system alone transitions too when it moves the effective mode.
    pub fn update(&mut self, config: LayerConfig) -> PrecisionChange {
        let change = match precision::decide(config.precision(), self.config.precision()) {
            PrecisionChange::NoChange => match (config.precision().mode(), self.mode()) {
                (PrecisionMode::HighPrecision, PrecisionMode::Standard) => {
                    PrecisionChange::EnterHighPrecision
                }
                (PrecisionMode::Standard, PrecisionMode::HighPrecision) => {
                    PrecisionChange::ExitHighPrecision
                }
                _ => PrecisionChange::NoChange,
            },
            change => change,
        };

        match change {
            PrecisionChange::NoChange => {}
            PrecisionChange::EnterHighPrecision => {
                self.registry.invalidate_all();
                self.registry.add([(POSITIONS_64_XY_LOW, positions_64xy_low_spec())]);
            }
            PrecisionChange::ExitHighPrecision => {
                self.registry.invalidate_all();
                self.registry.remove([POSITIONS_64_XY_LOW]);
            }
        }

        if let Some(model) = self.models.apply(change) {
            log::debug!("layer model rebuilt for {:?} ({})", model.mode(), model.variant());
            self.model = model;
        }

        self.config = config;
        change
    }

    /// Marks one attribute for recompute on the next draw.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.registry.invalidate(name)
    }

    /// Recomputes dirty attributes; returns the names rebuilt.
    pub fn recompute(&mut self) -> Vec<String> {
        self.registry.recompute_dirty(&self.data, &self.accessors)
    }

    /// Recomputes dirty attributes and describes the instanced draw.
    ///
    /// Uniforms are `globals`, then the layer's own values (radius, coordinate
    /// system, lighting) on top.
    pub fn draw(&mut self, globals: &UniformSet) -> DrawRequest<'_> {
        self.recompute();

        let mut uniforms = globals.clone();
        uniforms.merge(&self.explicit_uniforms());

        DrawRequest::new(&self.model, &self.registry, uniforms)
    }

    /// [`draw`](Self::draw) followed by submission to `renderer`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        renderer: &mut DiscRenderer,
        globals: &UniformSet,
    ) -> Result<()> {
        let request = self.draw(globals);
        renderer.render(ctx, target, &request)
    }

    fn explicit_uniforms(&self) -> UniformSet {
        let coordinate_system = match self.config.coordinate_system {
            CoordinateSystem::Cartesian => 0,
            CoordinateSystem::Geographic => 1,
        };

        let mut set = UniformSet::new();
        set.set(RADIUS_PIXELS, UniformValue::Float(self.config.radius_pixels))
            .set(COORDINATE_SYSTEM, UniformValue::Int(coordinate_system))
            .merge(&self.config.lighting.to_uniforms());
        set
    }

    #[inline]
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    #[inline]
    pub fn data(&self) -> &[R] {
        &self.data
    }

    #[inline]
    pub fn registry(&self) -> &AttributeRegistry<R> {
        &self.registry
    }

    #[inline]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[inline]
    pub fn mode(&self) -> PrecisionMode {
        self.model.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Color, Position};
    use crate::attributes::computers::{COLORS, NORMALS, POSITIONS};
    use crate::fp64::low_part;
    use crate::model::{HIGH_PRECISION, STANDARD};

    type Rec = ([f64; 2], [u8; 3]);

    fn accessors() -> AccessorSet<Rec> {
        AccessorSet::new(|r: &Rec| Position::from(r.0)).with_color(|r: &Rec| Color::from(r.1))
    }

    fn config(hp: bool, cs: CoordinateSystem) -> LayerConfig {
        LayerConfig { high_precision_requested: hp, coordinate_system: cs, ..LayerConfig::default() }
    }

    fn layer(cfg: LayerConfig, data: Vec<Rec>) -> PointCloudLayer<Rec> {
        PointCloudLayer::new(cfg, accessors()).with_data(data)
    }

    fn f32s<'a>(req: &'a DrawRequest<'_>, name: &str) -> &'a [f32] {
        req.buffer(name).unwrap().data.as_f32().unwrap()
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn cartesian_single_point() {
        let mut layer = layer(config(false, CoordinateSystem::Cartesian), vec![([1.0, 2.0], [10, 20, 30])]);
        let req = layer.draw(&UniformSet::new());

        assert_eq!(req.instance_count, 1);
        assert_eq!(req.vertex_count, 3);
        assert_eq!(f32s(&req, POSITIONS), [1.0, 2.0, 0.0]);
        assert_eq!(f32s(&req, NORMALS), [1.0, 1.0, 1.0]);
        assert_eq!(req.buffer(COLORS).unwrap().data.as_u8().unwrap(), [10, 20, 30, 255]);
        assert!(req.buffer(POSITIONS_64_XY_LOW).is_none());
        assert_eq!(req.model.mode(), PrecisionMode::Standard);
        assert_eq!(req.model.variant(), STANDARD);
    }

    #[test]
    fn geographic_high_precision_single_point() {
        let mut layer = layer(config(true, CoordinateSystem::Geographic), vec![([1.0, 2.0], [10, 20, 30])]);
        let req = layer.draw(&UniformSet::new());

        let low = f32s(&req, POSITIONS_64_XY_LOW);
        assert_eq!(low.len(), 2);
        assert_eq!(low, [low_part(1.0), low_part(2.0)]);
        assert_eq!(req.model.variant(), HIGH_PRECISION);
    }

    #[test]
    fn empty_dataset_draws_zero_instances() {
        let mut layer = layer(LayerConfig::default(), Vec::new());
        let req = layer.draw(&UniformSet::new());
        assert!(req.is_empty());
        assert_eq!(req.buffers.len(), 3);
        assert!(req.buffers.iter().all(|b| b.data.is_empty()));
    }

    // ── precision transitions ─────────────────────────────────────────────

    #[test]
    fn entering_and_leaving_high_precision() {
        let data = vec![([-122.419_415_532_1, 37.774_929_123_4], [0, 0, 0]); 3];
        let mut layer = layer(config(false, CoordinateSystem::Geographic), data);
        layer.recompute();

        let change = layer.update(config(true, CoordinateSystem::Geographic));
        assert_eq!(change, PrecisionChange::EnterHighPrecision);
        assert!(layer.registry().iter().all(|a| a.is_dirty()));
        assert_eq!(layer.mode(), PrecisionMode::HighPrecision);

        let req = layer.draw(&UniformSet::new());
        assert_eq!(f32s(&req, POSITIONS_64_XY_LOW).len(), 6);

        let change = layer.update(config(false, CoordinateSystem::Geographic));
        assert_eq!(change, PrecisionChange::ExitHighPrecision);
        assert!(!layer.registry().contains(POSITIONS_64_XY_LOW));
        assert_eq!(layer.model().variant(), STANDARD);
    }

    #[test]
    fn cartesian_request_never_adds_low_part() {
        let mut layer = layer(config(true, CoordinateSystem::Cartesian), vec![([1.0, 2.0], [0, 0, 0])]);
        assert!(!layer.registry().contains(POSITIONS_64_XY_LOW));

        layer.update(config(false, CoordinateSystem::Cartesian));
        layer.update(config(true, CoordinateSystem::Cartesian));
        assert!(!layer.registry().contains(POSITIONS_64_XY_LOW));
        assert_eq!(layer.mode(), PrecisionMode::Standard);
    }

    #[test]
    fn switching_to_cartesian_leaves_high_precision() {
        let mut layer = layer(config(true, CoordinateSystem::Geographic), vec![([1.0, 2.0], [0, 0, 0])]);
        layer.recompute();
        assert!(layer.registry().contains(POSITIONS_64_XY_LOW));

        let change = layer.update(config(true, CoordinateSystem::Cartesian));
        assert_eq!(change, PrecisionChange::ExitHighPrecision);
        assert_eq!(layer.mode(), PrecisionMode::Standard);
        assert_eq!(layer.model().variant(), STANDARD);
        assert!(!layer.registry().contains(POSITIONS_64_XY_LOW));
        assert!(layer.registry().iter().all(|a| a.is_dirty()));
    }

    #[test]
    fn switching_to_geographic_enters_high_precision() {
        let mut layer = layer(config(true, CoordinateSystem::Cartesian), vec![([1.0, 2.0], [0, 0, 0])]);
        layer.recompute();
        assert_eq!(layer.mode(), PrecisionMode::Standard);

        let change = layer.update(config(true, CoordinateSystem::Geographic));
        assert_eq!(change, PrecisionChange::EnterHighPrecision);
        assert_eq!(layer.mode(), PrecisionMode::HighPrecision);
        assert_eq!(layer.model().variant(), HIGH_PRECISION);

        let req = layer.draw(&UniformSet::new());
        assert_eq!(f32s(&req, POSITIONS_64_XY_LOW), [low_part(1.0), low_part(2.0)]);
    }

    #[test]
    fn coordinate_change_without_request_keeps_standard() {
        let mut layer = layer(config(false, CoordinateSystem::Cartesian), vec![([1.0, 2.0], [0, 0, 0])]);
        let generation = layer.model().generation();

        assert_eq!(layer.update(config(false, CoordinateSystem::Geographic)), PrecisionChange::NoChange);
        assert_eq!(layer.model().generation(), generation);
        assert!(!layer.registry().contains(POSITIONS_64_XY_LOW));
    }

    #[test]
    fn unchanged_config_does_not_rebuild_or_recompute() {
        let mut layer = layer(LayerConfig::default(), vec![([1.0, 2.0], [0, 0, 0])]);
        layer.recompute();
        let generation = layer.model().generation();

        assert_eq!(layer.update(LayerConfig::default()), PrecisionChange::NoChange);
        assert_eq!(layer.model().generation(), generation);
        assert!(layer.recompute().is_empty());
    }

    // ── data + uniforms ───────────────────────────────────────────────────

    #[test]
    fn set_data_resizes_buffers() {
        let mut layer = layer(LayerConfig::default(), vec![([1.0, 2.0], [0, 0, 0])]);
        layer.recompute();
        layer.set_data(vec![([0.0, 0.0], [0, 0, 0]); 4]);

        let req = layer.draw(&UniformSet::new());
        assert_eq!(req.instance_count, 4);
        assert_eq!(f32s(&req, POSITIONS).len(), 12);
        assert_eq!(req.buffer(COLORS).unwrap().data.len(), 16);
    }

    #[test]
    fn explicit_uniforms_override_globals() {
        let mut layer = layer(LayerConfig::default(), vec![([1.0, 2.0], [0, 0, 0])]);
        let mut globals = UniformSet::new();
        globals
            .set(RADIUS_PIXELS, UniformValue::Float(1.0))
            .set(uniforms::VIEWPORT_SIZE, UniformValue::Vec2([640.0, 480.0]));

        let req = layer.draw(&globals);
        assert_eq!(req.uniforms.get(RADIUS_PIXELS), Some(&UniformValue::Float(10.0)));
        assert_eq!(
            req.uniforms.get(uniforms::VIEWPORT_SIZE),
            Some(&UniformValue::Vec2([640.0, 480.0]))
        );
        assert!(req.uniforms.get(uniforms::NUMBER_OF_LIGHTS).is_some());
    }
}
