use glam::Vec3;
use log::debug;

use super::normals::synthesize_normals;

/// Errors detected while binding raw arrays into a renderable geometry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("geometry has no positions")]
    EmptyPositions,
    #[error("index count {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        slot: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("{normals} normals supplied for {positions} positions")]
    NormalCountMismatch { normals: usize, positions: usize },
}

/// Positions, normals and triangle indices bound together
///
/// Each `Geometry` owns its arrays; cloning produces an independent copy, so
/// the base and outline passes never alias each other's buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Geometry {
    /// Validates and copies the source arrays into a new geometry.
    ///
    /// Normals are synthesized when `normals` is `None` or empty.
    pub fn assemble(
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        indices: &[u32],
    ) -> Result<Self, GeometryError> {
        validate(positions, normals, indices)?;

        let normals = match normals {
            Some(normals) if !normals.is_empty() => normals.to_vec(),
            _ => {
                debug!("Synthesizing normals for {} vertices", positions.len());
                synthesize_normals(positions, indices)
            }
        };

        Ok(Self {
            positions: positions.to_vec(),
            normals,
            indices: indices.to_vec(),
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn validate(
    positions: &[Vec3],
    normals: Option<&[Vec3]>,
    indices: &[u32],
) -> Result<(), GeometryError> {
    if positions.is_empty() {
        return Err(GeometryError::EmptyPositions);
    }

    if indices.len() % 3 != 0 {
        return Err(GeometryError::RaggedIndices(indices.len()));
    }

    if let Some((slot, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= positions.len())
    {
        return Err(GeometryError::IndexOutOfRange {
            slot,
            index,
            vertex_count: positions.len(),
        });
    }

    match normals {
        Some(normals) if !normals.is_empty() && normals.len() != positions.len() => {
            Err(GeometryError::NormalCountMismatch {
                normals: normals.len(),
                positions: positions.len(),
            })
        }
        _ => Ok(()),
    }
}
