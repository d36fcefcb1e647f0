use std::borrow::Cow;
use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use crate::precision::PrecisionMode;

pub const STANDARD: &str = "standard";
pub const HIGH_PRECISION: &str = "high-precision";

/// Vertex/fragment source pair plus the modules it depends on.
///
/// Modules are prepended in list order, so a module may only use symbols from
/// modules listed before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderVariant {
    pub name: Cow<'static, str>,
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
    pub modules: Vec<Cow<'static, str>>,
}

/// Named WGSL modules and shader variants.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    modules: BTreeMap<Cow<'static, str>, Cow<'static, str>>,
    variants: BTreeMap<Cow<'static, str>, ShaderVariant>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the crate's own modules and both disc variants.
    pub fn builtin() -> Self {
        let fragment = Cow::Borrowed(include_str!("shaders/disc_fragment.wgsl"));

        let mut lib = Self::new();
        lib.add_module("project", include_str!("shaders/project.wgsl"));
        lib.add_module("fp64", include_str!("shaders/fp64.wgsl"));
        lib.add_module("lighting", include_str!("shaders/lighting.wgsl"));

        lib.add_variant(ShaderVariant {
            name: STANDARD.into(),
            vertex: include_str!("shaders/disc_vertex.wgsl").into(),
            fragment: fragment.clone(),
            modules: vec!["project".into(), "lighting".into()],
        });
        lib.add_variant(ShaderVariant {
            name: HIGH_PRECISION.into(),
            vertex: include_str!("shaders/disc_vertex64.wgsl").into(),
            fragment,
            modules: vec!["project".into(), "fp64".into(), "lighting".into()],
        });
        lib
    }

    pub fn add_module(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        source: impl Into<Cow<'static, str>>,
    ) {
        self.modules.insert(name.into(), source.into());
    }

    /// Registers a variant, replacing any variant with the same name.
    pub fn add_variant(&mut self, variant: ShaderVariant) {
        self.variants.insert(variant.name.clone(), variant);
    }

    #[inline]
    pub fn variant(&self, name: &str) -> Option<&ShaderVariant> {
        self.variants.get(name)
    }

    /// Joins the variant's modules, vertex source and fragment source into one
    /// WGSL module.
    pub fn assemble(&self, name: &str) -> Result<String> {
        let variant = self
            .variant(name)
            .with_context(|| format!("unknown shader variant `{name}`"))?;

        let mut source = String::new();
        for module in &variant.modules {
            let Some(body) = self.modules.get(module.as_ref()) else {
                bail!("shader variant `{name}` requires unknown module `{module}`");
            };
            source.push_str(&format!("// module: {module}\n"));
            source.push_str(body);
            source.push('\n');
        }
        source.push_str(&variant.vertex);
        source.push('\n');
        source.push_str(&variant.fragment);
        Ok(source)
    }
}

/// Variant name used for a precision mode.
#[inline]
pub fn variant_for(mode: PrecisionMode) -> &'static str {
    match mode {
        PrecisionMode::Standard => STANDARD,
        PrecisionMode::HighPrecision => HIGH_PRECISION,
    }
}
