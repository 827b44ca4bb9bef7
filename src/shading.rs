use std::fmt;

use glam::Vec3;
use log::warn;

/// User-selectable shading model for the base mesh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShadingMode {
    /// Standard lit (Phong) shading
    #[default]
    Flat,
    /// Warm-to-cool tone gradient (Gooch)
    WarmCool,
    /// Quantized lighting bands (toon)
    Cel,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 3] = [ShadingMode::Flat, ShadingMode::WarmCool, ShadingMode::Cel];

    /// Parses a mode name, returning None for anything unrecognized
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flat" | "phong" => Some(ShadingMode::Flat),
            "warm-cool" | "warmcool" | "gooch" => Some(ShadingMode::WarmCool),
            "cel" | "toon" => Some(ShadingMode::Cel),
            _ => None,
        }
    }

    /// Parses a mode name, falling back to Flat for anything unrecognized
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!("Unknown shading mode '{}', defaulting to flat", name);
            ShadingMode::Flat
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShadingMode::Flat => "flat",
            ShadingMode::WarmCool => "warm-cool",
            ShadingMode::Cel => "cel",
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shader program attached to a render node
///
/// Closed set: the rasterizer keeps exactly one pipeline per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVariant {
    Flat,
    WarmCool,
    Cel,
    /// Inverted-hull outline pass, independent of the shading mode
    Silhouette,
}

impl ShaderVariant {
    pub const ALL: [ShaderVariant; 4] = [
        ShaderVariant::Flat,
        ShaderVariant::WarmCool,
        ShaderVariant::Cel,
        ShaderVariant::Silhouette,
    ];

    /// Fragment entry point in the shading WGSL module
    pub fn fragment_entry(&self) -> &'static str {
        match self {
            ShaderVariant::Flat => "fs_flat",
            ShaderVariant::WarmCool => "fs_warm_cool",
            ShaderVariant::Cel => "fs_cel",
            ShaderVariant::Silhouette => "fs_silhouette",
        }
    }

    /// Vertex entry point in the shading WGSL module
    pub fn vertex_entry(&self) -> &'static str {
        match self {
            ShaderVariant::Silhouette => "vs_silhouette",
            _ => "vs_main",
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self, ShaderVariant::Silhouette)
    }
}

/// Surface parameters bound alongside a shader variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    /// Warm terracotta with a weak, broad highlight
    pub const BASE: Material = Material {
        diffuse: Vec3::new(0.7, 0.3, 0.2),
        specular: Vec3::new(0.2, 0.2, 0.2),
        shininess: 8.0,
    };

    /// Flat black, no highlight
    pub const OUTLINE: Material = Material {
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
        shininess: 1.0,
    };
}

/// Shader variant and material to attach to the base mesh node
pub fn variant_for(mode: ShadingMode) -> (ShaderVariant, Material) {
    let variant = match mode {
        ShadingMode::Flat => ShaderVariant::Flat,
        ShadingMode::WarmCool => ShaderVariant::WarmCool,
        ShadingMode::Cel => ShaderVariant::Cel,
    };

    (variant, Material::BASE)
}

/// Shader variant and material for the outline pass; identical for every mode
pub fn outline_variant() -> (ShaderVariant, Material) {
    (ShaderVariant::Silhouette, Material::OUTLINE)
}
