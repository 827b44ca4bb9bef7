use std::fmt;

use log::warn;

/// Which mesh the viewer displays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Model {
    Teapot,
    #[default]
    Bunny,
    /// Built-in quad; rendered as a single flat pass with no outline
    Quad,
}

impl Model {
    /// Parses a model name, falling back to the teapot for anything unknown
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "teapot" => Model::Teapot,
            "bunny" => Model::Bunny,
            "quad" => Model::Quad,
            other => {
                warn!("Unknown model name '{}', defaulting to teapot", other);
                Model::Teapot
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Model::Teapot => "teapot",
            Model::Bunny => "bunny",
            Model::Quad => "quad",
        }
    }

    /// File stem of the mesh fixture, or None for the built-in primitive
    pub fn file_stem(&self) -> Option<&'static str> {
        match self {
            Model::Teapot => Some("teapot"),
            Model::Bunny => Some("bunny_1k"),
            Model::Quad => None,
        }
    }

    /// Uniform scale applied to the base mesh node
    pub fn scale(&self) -> f32 {
        match self {
            Model::Teapot => 0.7,
            Model::Bunny => 7.0,
            Model::Quad => 2.0,
        }
    }

    /// Next model in the teapot/bunny cycle. The quad leads back to the teapot.
    pub fn cycle(&self) -> Self {
        match self {
            Model::Teapot => Model::Bunny,
            Model::Bunny | Model::Quad => Model::Teapot,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Model::Quad)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
