// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used by ray queries to cull triangles before exact intersection tests

use super::BoundingBox;
use nalgebra::{Point3, Vector3};
use std::cmp::Ordering;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Triangle indices (only for leaf nodes)
    pub triangle_indices: Vec<usize>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, triangle_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            triangle_indices,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            triangle_indices: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy for triangle meshes
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    /// Build BVH from `(triangle_index, bbox)` pairs
    pub fn build(triangles: Vec<(usize, BoundingBox)>) -> Self {
        if triangles.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }

        let root = Self::build_recursive(triangles, 0);
        Self { root }
    }

    fn build_recursive(mut triangles: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 32;
        const MIN_TRIANGLES: usize = 4;

        let bbox = Self::compute_union_bbox(&triangles);
        if triangles.len() <= MIN_TRIANGLES || depth >= MAX_DEPTH {
            let indices: Vec<usize> = triangles.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Split the longest axis at the median centroid
        let size = bbox.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };
        triangles.sort_by(|(_, a), (_, b)| {
            a.center()[axis]
                .partial_cmp(&b.center()[axis])
                .unwrap_or(Ordering::Equal)
        });

        let right_triangles = triangles.split_off(triangles.len() / 2);
        let left = Box::new(Self::build_recursive(triangles, depth + 1));
        let right = Box::new(Self::build_recursive(right_triangles, depth + 1));

        BVHNode::internal(bbox, left, right)
    }

    fn compute_union_bbox(triangles: &[(usize, BoundingBox)]) -> BoundingBox {
        triangles
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// Bounds of everything in the tree
    pub fn bounds(&self) -> &BoundingBox {
        &self.root.bbox
    }

    /// Query triangles whose boxes intersect the given bounding box
    pub fn query_triangles(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.triangle_indices);
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    /// Candidate triangles whose boxes are hit by a ray
    pub fn query_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<usize> {
        let inv_direction = direction.map(|d| 1.0 / d);
        let mut result = Vec::new();
        Self::ray_recursive(&self.root, origin, &inv_direction, &mut result);
        result
    }

    fn ray_recursive(
        node: &BVHNode,
        origin: &Point3<f64>,
        inv_direction: &Vector3<f64>,
        result: &mut Vec<usize>,
    ) {
        if node.bbox.is_empty() || node.bbox.ray_entry(origin, inv_direction).is_none() {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.triangle_indices);
        } else {
            if let Some(ref left) = node.left {
                Self::ray_recursive(left, origin, inv_direction, result);
            }
            if let Some(ref right) = node.right {
                Self::ray_recursive(right, origin, inv_direction, result);
            }
        }
    }

    /// Get root node (for testing)
    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
