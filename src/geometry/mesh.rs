// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities
//!
//! A [`Mesh`] owns its vertex and face arrays. Everything derived from them
//! (normals, areas, edge index, adjacency, components, mass properties,
//! identifier) lives in lazily filled caches that are dropped whenever the
//! content version changes.

use super::mass::{self, MassProperties};
use super::ray::RayMeshIntersector;
use super::section::{self, CrossSection};
use super::sample::{self, SurfaceSample};
use super::{hull, BoundingBox};
use crate::config::{ProcessOptions, Tolerances};
use crate::error::{MeshError, Result};
use crate::identity::Identifier;
use crate::repair::{self, BoundaryLoop, HoleReport, NormalsReport};
use crate::topology::{self, Edge, EdgeIndex, EdgeReport, FaceAdjacency, Facet};
use crate::utils::math;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Triangle defined by three vertex indices, wound counter-clockwise seen from outside
pub type Face = [usize; 3];

/// RGBA colour, per face or per vertex
pub type Color = [u8; 4];

/// Colour given to faces that have none, such as faces added by hole filling
pub const DEFAULT_COLOR: Color = [102, 102, 102, 255];

/// Raw arrays exchanged with loaders, exporters and serde
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Face>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_colors: Option<Vec<Color>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_colors: Option<Vec<Color>>,
}

impl TryFrom<MeshData> for Mesh {
    type Error = MeshError;

    fn try_from(data: MeshData) -> Result<Self> {
        Mesh::from_data(data)
    }
}

impl From<Mesh> for MeshData {
    fn from(mesh: Mesh) -> Self {
        mesh.to_data()
    }
}

/// Derived data for one content version
#[derive(Debug, Clone, Default)]
struct MeshCache {
    face_normals: OnceLock<Vec<Vector3<f64>>>,
    face_areas: OnceLock<Vec<f64>>,
    vertex_normals: OnceLock<Vec<Vector3<f64>>>,
    edge_index: OnceLock<EdgeIndex>,
    adjacency: OnceLock<FaceAdjacency>,
    components: OnceLock<Vec<Vec<usize>>>,
    mass: OnceLock<MassProperties>,
    identifier: OnceLock<Identifier>,
}

/// What [`Mesh::process`] changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub merged_vertices: usize,
    pub duplicate_faces: usize,
    pub degenerate_faces: usize,
    pub unreferenced_vertices: usize,
    pub normals: Option<NormalsReport>,
    pub holes: Option<HoleReport>,
}

/// Triangular mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MeshData", into = "MeshData")]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    face_colors: Option<Vec<Color>>,
    vertex_colors: Option<Vec<Color>>,
    tolerances: Tolerances,
    version: u64,
    cache: MeshCache,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::empty()
    }
}

fn validate_faces(faces: &[Face], vertex_count: usize) -> Result<()> {
    for (face, indices) in faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(MeshError::InvalidTopology {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Grid cell of a vertex, or its exact bits when it cannot be quantized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MergeKey {
    Cell([i64; 3]),
    Exact([u64; 3]),
}

impl MergeKey {
    fn new(point: &Point3<f64>, tolerance: f64) -> Self {
        if tolerance > 0.0 && tolerance.is_finite() {
            let scaled = [0, 1, 2].map(|i| point[i] / tolerance);
            // 2^63 is the first magnitude an i64 cannot hold
            if scaled.iter().all(|q| q.is_finite() && q.abs() < 9.223_372_036_854_775_808e18) {
                return Self::Cell(scaled.map(|q| q.round() as i64));
            }
        }
        // Adding zero folds -0.0 into 0.0
        Self::Exact([0, 1, 2].map(|i| (point[i] + 0.0).to_bits()))
    }
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_colors: None,
            vertex_colors: None,
            tolerances: Tolerances::default(),
            version: 0,
            cache: MeshCache::default(),
        }
    }

    /// Create a mesh, failing if any face references a missing vertex
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Result<Self> {
        validate_faces(&faces, vertices.len())?;
        Ok(Self::from_trusted(vertices, faces))
    }

    /// Build from arrays already known to be in range
    pub(crate) fn from_trusted(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Self {
        debug_assert!(validate_faces(&faces, vertices.len()).is_ok());
        Self {
            vertices,
            faces,
            ..Self::empty()
        }
    }

    pub fn from_arrays(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> Result<Self> {
        Self::new(
            vertices.iter().map(|v| Point3::from(*v)).collect(),
            faces.to_vec(),
        )
    }

    pub fn from_data(data: MeshData) -> Result<Self> {
        let mut mesh = Self::from_arrays(&data.vertices, &data.faces)?;
        if let Some(colors) = data.face_colors {
            mesh.set_face_colors(colors)?;
        }
        if let Some(colors) = data.vertex_colors {
            mesh.set_vertex_colors(colors)?;
        }
        Ok(mesh)
    }

    pub fn to_data(&self) -> MeshData {
        MeshData {
            vertices: self.vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces: self.faces.clone(),
            face_colors: self.face_colors.clone(),
            vertex_colors: self.vertex_colors.clone(),
        }
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.set_tolerances(tolerances);
        self
    }

    pub fn set_tolerances(&mut self, tolerances: Tolerances) {
        self.tolerances = tolerances;
        self.touch();
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Content version, bumped by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Replace the face array; colours survive only if the count is unchanged
    pub fn set_faces(&mut self, faces: Vec<Face>) -> Result<()> {
        validate_faces(&faces, self.vertices.len())?;
        if self
            .face_colors
            .as_ref()
            .is_some_and(|colors| colors.len() != faces.len())
        {
            self.face_colors = None;
        }
        self.faces = faces;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.cache = MeshCache::default();
    }

    /// Corner positions of every face
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.faces.iter().map(|f| f.map(|i| self.vertices[i]))
    }

    fn face_cross(&self, face: &Face) -> Vector3<f64> {
        let [a, b, c] = face.map(|i| &self.vertices[i]);
        math::triangle_cross(a, b, c)
    }

    /// Zero tolerance scaled by the bounding box diagonal to the given power
    ///
    /// Falls back to the raw tolerance when the diagonal is not finite.
    fn scaled_zero(&self, power: i32) -> f64 {
        let scale = self.scale();
        if scale.is_finite() {
            self.tolerances.zero * scale.powi(power)
        } else {
            self.tolerances.zero
        }
    }

    fn zero_area(&self) -> f64 {
        self.scaled_zero(2)
    }

    fn zero_volume(&self) -> f64 {
        self.scaled_zero(3)
    }

    // ------------------------------------------------------------------
    // Cleanup
    // ------------------------------------------------------------------

    /// Collapse vertices that quantize to the same grid cell of size `tolerance`
    ///
    /// The first vertex of each cell survives at its own position and faces are
    /// re-indexed; no face is removed. A tolerance of zero merges only exact
    /// duplicates, as do coordinates that are not finite or too far out to
    /// quantize. Returns the number of vertices removed.
    pub fn merge_vertices(&mut self, tolerance: f64) -> usize {
        let removed = self.merge_cells(tolerance, |_, _| true);
        debug!(removed, tolerance, "merged vertices");
        removed
    }

    /// Like [`Mesh::merge_vertices`], but two vertices in one cell only merge
    /// when their vertex normals are within `angle_max` radians
    ///
    /// Run on an unmerged mesh this welds smooth regions and keeps creases
    /// split, which is what smooth shading needs.
    pub fn merge_vertices_with_angle(&mut self, tolerance: f64, angle_max: f64) -> usize {
        let normals = self.vertex_normals().to_vec();
        let cos_max = angle_max.cos();
        let removed = self.merge_cells(tolerance, |a, b| normals[a].dot(&normals[b]) >= cos_max);
        debug!(removed, tolerance, angle_max, "merged vertices by normal");
        removed
    }

    /// Merge each vertex into the first compatible survivor of its cell
    fn merge_cells<F>(&mut self, tolerance: f64, compatible: F) -> usize
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut cells: AHashMap<MergeKey, Vec<usize>> =
            AHashMap::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut kept = Vec::with_capacity(self.vertices.len());

        for (old, point) in self.vertices.iter().enumerate() {
            let survivors = cells.entry(MergeKey::new(point, tolerance)).or_default();
            match survivors.iter().find(|&&s| compatible(s, old)) {
                Some(&s) => remap.push(remap[s]),
                None => {
                    survivors.push(old);
                    remap.push(kept.len());
                    kept.push(old);
                }
            }
        }

        for face in &mut self.faces {
            *face = face.map(|i| remap[i]);
        }

        let removed = self.vertices.len() - kept.len();
        self.keep_vertices(&kept);
        removed
    }

    /// Keep the listed vertices, in order, along with their colours
    fn keep_vertices(&mut self, kept: &[usize]) {
        self.vertices = kept.iter().map(|&i| self.vertices[i]).collect();
        if let Some(colors) = self.vertex_colors.as_mut() {
            *colors = kept.iter().map(|&i| colors[i]).collect();
        }
        self.touch();
    }

    /// Drop faces with repeated indices or area at or below the zero tolerance
    ///
    /// The tolerance is relative: it is scaled by the squared bounding box
    /// diagonal, so the result does not depend on the mesh's units.
    pub fn remove_degenerate_faces(&mut self) -> usize {
        let zero = self.zero_area();
        let keep: Vec<bool> = self
            .faces
            .iter()
            .zip(self.face_areas())
            .map(|(face, &area)| !topology::is_degenerate(face) && area > zero)
            .collect();
        let removed = self.keep_faces(&keep);
        debug!(removed, "removed degenerate faces");
        removed
    }

    /// Drop faces that use the same three vertices as an earlier face
    pub fn remove_duplicate_faces(&mut self) -> usize {
        let mut seen = AHashSet::with_capacity(self.faces.len());
        let keep: Vec<bool> = self
            .faces
            .iter()
            .map(|face| {
                let mut key = *face;
                key.sort_unstable();
                seen.insert(key)
            })
            .collect();
        let removed = self.keep_faces(&keep);
        debug!(removed, "removed duplicate faces");
        removed
    }

    /// Keep only faces whose mask entry is true
    pub fn update_faces(&mut self, mask: &[bool]) -> Result<usize> {
        if mask.len() != self.faces.len() {
            return Err(MeshError::AttributeLength {
                attribute: "face mask",
                expected: self.faces.len(),
                actual: mask.len(),
            });
        }
        Ok(self.keep_faces(mask))
    }

    fn keep_faces(&mut self, mask: &[bool]) -> usize {
        let removed = mask.iter().filter(|keep| !**keep).count();
        if removed == 0 {
            return 0;
        }

        let mut keep = mask.iter().copied();
        self.faces.retain(|_| keep.next().unwrap_or(false));
        if let Some(colors) = self.face_colors.as_mut() {
            let mut keep = mask.iter().copied();
            colors.retain(|_| keep.next().unwrap_or(false));
        }
        self.touch();
        removed
    }

    /// Remove vertices no face references, keeping the order of the rest
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &i in face {
                used[i] = true;
            }
        }

        let mut remap = vec![0; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for old in 0..self.vertices.len() {
            if used[old] {
                remap[old] = kept.len();
                kept.push(old);
            }
        }

        let removed = self.vertices.len() - kept.len();
        if removed == 0 {
            return 0;
        }

        for face in &mut self.faces {
            *face = face.map(|i| remap[i]);
        }
        self.keep_vertices(&kept);

        debug!(removed, "removed unreferenced vertices");
        removed
    }

    /// Give every face its own three vertices
    pub fn unmerge_vertices(&mut self) {
        let vertices: Vec<Point3<f64>> = self.triangles().flatten().collect();
        if let Some(colors) = self.vertex_colors.as_mut() {
            *colors = self.faces.iter().flatten().map(|&i| colors[i]).collect();
        }
        self.faces = (0..self.faces.len())
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        self.vertices = vertices;
        self.touch();
    }

    /// Run the on-load cleanup pipeline
    pub fn process(&mut self, options: &ProcessOptions) -> ProcessReport {
        let mut report = ProcessReport::default();

        if options.merge_vertices {
            report.merged_vertices = self.merge_vertices(self.tolerances.merge);
        }
        if options.remove_duplicate_faces {
            report.duplicate_faces = self.remove_duplicate_faces();
        }
        if options.remove_degenerate_faces {
            report.degenerate_faces = self.remove_degenerate_faces();
        }
        if options.remove_unreferenced_vertices {
            report.unreferenced_vertices = self.remove_unreferenced_vertices();
        }
        if options.fix_normals {
            report.normals = Some(self.fix_normals());
        }
        if options.fill_holes {
            report.holes = Some(self.fill_holes());
        }

        info!(
            vertices = self.vertex_count(),
            faces = self.face_count(),
            merged = report.merged_vertices,
            duplicate_faces = report.duplicate_faces,
            degenerate_faces = report.degenerate_faces,
            "processed mesh"
        );
        report
    }

    // ------------------------------------------------------------------
    // Per-face and per-vertex geometry
    // ------------------------------------------------------------------

    /// Unit face normals following the stored winding; zero for zero-area faces
    pub fn face_normals(&self) -> &[Vector3<f64>] {
        self.cache.face_normals.get_or_init(|| {
            self.faces
                .iter()
                .map(|f| math::unitize(&self.face_cross(f)).unwrap_or_else(Vector3::zeros))
                .collect()
        })
    }

    pub fn face_areas(&self) -> &[f64] {
        self.cache.face_areas.get_or_init(|| {
            self.faces
                .iter()
                .map(|f| self.face_cross(f).norm() * 0.5)
                .collect()
        })
    }

    /// Mean of incident face normals; `[1, 0, 0]` where that is undefined
    pub fn vertex_normals(&self) -> &[Vector3<f64>] {
        self.cache.vertex_normals.get_or_init(|| {
            let mut sums = vec![Vector3::zeros(); self.vertices.len()];
            for (face, normal) in self.faces.iter().zip(self.face_normals()) {
                for &i in face {
                    sums[i] += normal;
                }
            }
            sums.iter()
                .map(|sum| math::unitize(sum).unwrap_or_else(Vector3::x))
                .collect()
        })
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn box_size(&self) -> Vector3<f64> {
        self.bounds().size()
    }

    /// Length of the bounding box diagonal
    pub fn scale(&self) -> f64 {
        self.bounds().diagonal()
    }

    /// Mean vertex position
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Transform all vertices by a matrix
    ///
    /// Mirroring transforms also flip every face so outward winding survives.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.vertices = math::transform_points(&self.vertices, matrix);
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).clone_owned();
        if linear.determinant() < 0.0 {
            for face in &mut self.faces {
                *face = topology::flipped(*face);
            }
        }
        self.touch();
    }

    pub fn apply_translation(&mut self, offset: &Vector3<f64>) {
        for point in &mut self.vertices {
            *point += offset;
        }
        self.touch();
    }

    /// Translate so the bounding box minimum sits at the origin
    pub fn rezero(&mut self) {
        let bounds = self.bounds();
        if !bounds.is_empty() {
            self.apply_translation(&-bounds.min.coords);
        }
    }

    /// Reverse the winding of every face
    pub fn invert(&mut self) {
        for face in &mut self.faces {
            *face = topology::flipped(*face);
        }
        self.touch();
    }

    // ------------------------------------------------------------------
    // Colours
    // ------------------------------------------------------------------

    pub fn face_colors(&self) -> Option<&[Color]> {
        self.face_colors.as_deref()
    }

    pub fn face_color(&self, face: usize) -> Color {
        self.face_colors
            .as_ref()
            .and_then(|colors| colors.get(face).copied())
            .unwrap_or(DEFAULT_COLOR)
    }

    pub fn set_face_colors(&mut self, colors: Vec<Color>) -> Result<()> {
        if colors.len() != self.faces.len() {
            return Err(MeshError::AttributeLength {
                attribute: "face colors",
                expected: self.faces.len(),
                actual: colors.len(),
            });
        }
        self.face_colors = Some(colors);
        self.touch();
        Ok(())
    }

    pub fn set_uniform_face_color(&mut self, color: Color) {
        self.face_colors = Some(vec![color; self.faces.len()]);
        self.touch();
    }

    pub fn vertex_colors(&self) -> Option<&[Color]> {
        self.vertex_colors.as_deref()
    }

    pub fn vertex_color(&self, vertex: usize) -> Color {
        self.vertex_colors
            .as_ref()
            .and_then(|colors| colors.get(vertex).copied())
            .unwrap_or(DEFAULT_COLOR)
    }

    pub fn set_vertex_colors(&mut self, colors: Vec<Color>) -> Result<()> {
        if colors.len() != self.vertices.len() {
            return Err(MeshError::AttributeLength {
                attribute: "vertex colors",
                expected: self.vertices.len(),
                actual: colors.len(),
            });
        }
        self.vertex_colors = Some(colors);
        self.touch();
        Ok(())
    }

    /// Derive vertex colours from face colours when none are set
    ///
    /// Each vertex takes the channel-wise mean of the faces around it. Vertices
    /// no face uses, and every vertex of a mesh without face colours, get
    /// [`DEFAULT_COLOR`]. Existing vertex colours are left alone.
    pub fn generate_vertex_colors(&mut self) {
        if self.vertex_colors.is_some() {
            return;
        }

        let colors = match &self.face_colors {
            Some(face_colors) => {
                let mut sums = vec![[0u64; 4]; self.vertices.len()];
                let mut counts = vec![0u64; self.vertices.len()];
                for (face, color) in self.faces.iter().zip(face_colors) {
                    for &i in face {
                        for (sum, &channel) in sums[i].iter_mut().zip(color) {
                            *sum += u64::from(channel);
                        }
                        counts[i] += 1;
                    }
                }
                sums.iter()
                    .zip(&counts)
                    .map(|(&sum, &count)| match count {
                        0 => DEFAULT_COLOR,
                        n => sum.map(|c| ((c + n / 2) / n) as u8),
                    })
                    .collect()
            }
            None => vec![DEFAULT_COLOR; self.vertices.len()],
        };

        self.vertex_colors = Some(colors);
        self.touch();
    }

    fn extend_faces(&mut self, faces: &[Face], colors: Option<&[Color]>) {
        if self.face_colors.is_some() || colors.is_some() {
            let existing = self
                .face_colors
                .get_or_insert_with(|| vec![DEFAULT_COLOR; self.faces.len()]);
            match colors {
                Some(colors) => existing.extend_from_slice(colors),
                None => existing.extend(std::iter::repeat(DEFAULT_COLOR).take(faces.len())),
            }
        }
        self.faces.extend_from_slice(faces);
    }

    // ------------------------------------------------------------------
    // Combining meshes
    // ------------------------------------------------------------------

    /// Append another mesh's vertices and faces, without welding
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        if self.vertex_colors.is_some() || other.vertex_colors.is_some() {
            let existing = self
                .vertex_colors
                .get_or_insert_with(|| vec![DEFAULT_COLOR; offset]);
            match other.vertex_colors() {
                Some(colors) => existing.extend_from_slice(colors),
                None => existing.extend(vec![DEFAULT_COLOR; other.vertex_count()]),
            }
        }
        self.vertices.extend_from_slice(&other.vertices);
        let faces: Vec<Face> = other.faces.iter().map(|f| f.map(|i| i + offset)).collect();
        self.extend_faces(&faces, other.face_colors());
        self.touch();
    }

    pub fn concatenate(meshes: &[Mesh]) -> Mesh {
        let mut result = Mesh::empty();
        if let Some(first) = meshes.first() {
            result.tolerances = first.tolerances;
        }
        for mesh in meshes {
            result.append(mesh);
        }
        result
    }

    /// Copy of a subset of faces with only the vertices they use
    pub fn submesh(&self, faces: &[usize]) -> Mesh {
        let mut remap: AHashMap<usize, usize> = AHashMap::with_capacity(faces.len() * 3);
        let mut used = Vec::new();
        let mut sub_faces = Vec::with_capacity(faces.len());

        for &f in faces {
            sub_faces.push(self.faces[f].map(|i| {
                *remap.entry(i).or_insert_with(|| {
                    used.push(i);
                    used.len() - 1
                })
            }));
        }

        let vertices = used.iter().map(|&i| self.vertices[i]).collect();
        let mut mesh = Mesh::from_trusted(vertices, sub_faces);
        mesh.tolerances = self.tolerances;
        mesh.vertex_colors = self
            .vertex_colors
            .as_ref()
            .map(|colors| used.iter().map(|&i| colors[i]).collect());
        mesh.face_colors = self
            .face_colors
            .as_ref()
            .map(|colors| faces.iter().map(|&f| colors[f]).collect());
        mesh
    }

    // ------------------------------------------------------------------
    // Topology
    // ------------------------------------------------------------------

    /// Directed edges, three per face in winding order
    pub fn edges(&self) -> Vec<[usize; 2]> {
        topology::directed_edges(&self.faces)
    }

    /// Canonical edges, three per face in face order
    pub fn edges_sorted(&self) -> Vec<Edge> {
        topology::sorted_edges(&self.faces)
    }

    /// Distinct edges of non-degenerate faces, ascending
    pub fn edges_unique(&self) -> Vec<Edge> {
        self.edge_index().unique_edges()
    }

    pub fn edge_index(&self) -> &EdgeIndex {
        self.cache
            .edge_index
            .get_or_init(|| EdgeIndex::build(&self.faces))
    }

    pub fn edge_report(&self) -> EdgeReport {
        self.edge_index().report()
    }

    pub fn face_adjacency(&self) -> &FaceAdjacency {
        self.cache
            .adjacency
            .get_or_init(|| FaceAdjacency::from_index(self.edge_index()))
    }

    /// Every edge is shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        self.edge_index().is_closed()
    }

    /// Every interior edge is traversed in opposite directions by its two faces
    pub fn is_winding_consistent(&self) -> bool {
        topology::is_winding_consistent(&self.faces, self.face_adjacency())
    }

    /// V - E + F over non-degenerate faces and the vertices they use
    pub fn euler_number(&self) -> i64 {
        let mut used = vec![false; self.vertices.len()];
        let mut faces = 0i64;
        for face in self.faces.iter().filter(|f| !topology::is_degenerate(f)) {
            faces += 1;
            for &i in face {
                used[i] = true;
            }
        }
        let vertices = used.iter().filter(|u| **u).count() as i64;
        vertices - self.edge_index().len() as i64 + faces
    }

    /// Face indices of each edge-connected component, ordered by smallest face
    pub fn split_faces(&self) -> &[Vec<usize>] {
        self.cache.components.get_or_init(|| {
            topology::connected_components(self.faces.len(), self.face_adjacency())
        })
    }

    /// Independent meshes for each connected component
    pub fn split(&self, only_watertight: bool) -> Vec<Mesh> {
        let components = self.split_faces();
        let meshes: Vec<Mesh> = components
            .iter()
            .map(|faces| self.submesh(faces))
            .filter(|mesh| !only_watertight || mesh.is_watertight())
            .collect();
        debug!(
            components = components.len(),
            kept = meshes.len(),
            only_watertight,
            "split mesh"
        );
        meshes
    }

    /// Number of components containing at least one non-degenerate face
    pub fn body_count(&self) -> usize {
        self.split_faces()
            .iter()
            .filter(|c| c.iter().any(|&f| !topology::is_degenerate(&self.faces[f])))
            .count()
    }

    /// Groups of two or more adjacent, coplanar faces
    pub fn facets(&self) -> Vec<Vec<usize>> {
        self.facets_with_tolerance(self.tolerances.facet_angle)
    }

    pub fn facets_with_tolerance(&self, angle: f64) -> Vec<Vec<usize>> {
        topology::facet_groups(self.face_normals(), self.face_adjacency(), angle)
    }

    /// Facets with their total area and area-weighted normal
    pub fn facets_with_area(&self) -> Vec<Facet> {
        topology::describe_facets(self.facets(), self.face_normals(), self.face_areas())
    }

    // ------------------------------------------------------------------
    // Mass properties
    // ------------------------------------------------------------------

    /// Mass properties at unit density
    ///
    /// Always computed; check [`MassProperties::is_reliable`] before trusting
    /// the values of open or inconsistently wound meshes.
    pub fn mass_properties(&self) -> &MassProperties {
        self.cache
            .mass
            .get_or_init(|| self.compute_mass_properties(1.0))
    }

    pub fn mass_properties_with_density(&self, density: f64) -> MassProperties {
        self.compute_mass_properties(density)
    }

    /// Mass properties that refuse open or non-manifold meshes
    pub fn mass_properties_strict(&self) -> Result<MassProperties> {
        let index = self.edge_index();
        if !index.is_closed() {
            let (boundary_edges, non_manifold_edges) = index.defect_counts();
            return Err(MeshError::NotWatertight {
                boundary_edges,
                non_manifold_edges,
            });
        }
        Ok(*self.mass_properties())
    }

    fn compute_mass_properties(&self, density: f64) -> MassProperties {
        let reliable = self.is_watertight() && self.is_winding_consistent();
        if !reliable {
            debug!(
                faces = self.faces.len(),
                "mass properties of a mesh that is not a consistently wound closed surface"
            );
        }
        mass::compute(
            &self.vertices,
            &self.faces,
            self.face_areas(),
            density,
            reliable,
            self.zero_volume(),
        )
    }

    /// Signed enclosed volume
    pub fn volume(&self) -> f64 {
        self.mass_properties().volume
    }

    pub fn center_mass(&self) -> Point3<f64> {
        self.mass_properties().center_mass
    }

    /// Inertia tensor at the center of mass
    pub fn moment_inertia(&self) -> Matrix3<f64> {
        self.mass_properties().inertia
    }

    /// Principal moments of inertia, ascending
    pub fn principal_inertia(&self) -> [f64; 3] {
        self.mass_properties().principal_inertia()
    }

    // ------------------------------------------------------------------
    // Repair
    // ------------------------------------------------------------------

    /// Make winding consistent across each component and orient it outward
    pub fn fix_normals(&mut self) -> NormalsReport {
        let mut faces = self.faces.clone();
        let report = repair::fix_winding(
            &self.vertices,
            &mut faces,
            self.face_adjacency(),
            self.zero_volume(),
        );
        if report.flipped_faces > 0 {
            self.faces = faces;
            self.touch();
        }
        report
    }

    /// Closed or open chains of boundary edges
    pub fn boundary_loops(&self) -> Vec<BoundaryLoop> {
        repair::boundary_loops(&self.faces, self.edge_index())
    }

    /// Fill triangular and quadrilateral holes
    pub fn fill_holes(&mut self) -> HoleReport {
        let loops = self.boundary_loops();
        let (faces, report) = repair::fill_loops(&self.vertices, &self.faces, loops);
        if !faces.is_empty() {
            self.extend_faces(&faces, None);
            self.touch();
        }
        report
    }

    // ------------------------------------------------------------------
    // Identity, hull and queries
    // ------------------------------------------------------------------

    /// Rotation and translation invariant signature
    pub fn identifier(&self) -> &Identifier {
        self.cache.identifier.get_or_init(|| {
            Identifier::new(
                self.mass_properties(),
                self.faces.len(),
                self.tolerances.identifier_digits,
            )
        })
    }

    /// Convex hull of the vertex set as a new watertight mesh
    pub fn convex_hull(&self) -> Result<Mesh> {
        let mut hull = hull::convex_hull(&self.vertices)?;
        hull.tolerances = self.tolerances;
        Ok(hull)
    }

    /// Ray queries backed by a lazily built BVH
    pub fn ray(&self) -> RayMeshIntersector<'_> {
        RayMeshIntersector::new(self)
    }

    /// Points distributed uniformly by area over the surface
    pub fn sample_surface<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<SurfaceSample> {
        sample::sample_surface(self, count, rng)
    }

    /// Intersection of the surface with a plane
    pub fn cross_section(&self, origin: &Point3<f64>, normal: &Vector3<f64>) -> CrossSection {
        section::cross_section(self, origin, normal)
    }
}
