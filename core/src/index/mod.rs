//! Point-keyed index of edge endpoints.
//!
//! Each indexed point remembers the edges incident to it and the owner tags
//! (figure ids) each edge was registered with. Lookups match points within
//! `EPSILON`. Points are bucketed in a uniform grid so radius queries only
//! visit nearby cells.

use crate::composition::FigureId;
use crate::geometry::{vertex, ApproxEq, Edge, Vertex, EPSILON};
use std::collections::BTreeMap;

/// Cells per side of the indexed extent.
const CELLS_PER_EXTENT: f64 = 64.0;

type Cell = (i64, i64);

/// One registration of an edge at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEdge {
    pub edge: Edge,
    /// Sorted, deduplicated owners.
    pub tags: Vec<FigureId>,
    count: usize,
}

/// Everything indexed at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    vertex: Vertex,
    edges: Vec<IndexedEdge>,
}

impl IndexEntry {
    pub fn vertex(&self) -> Vertex {
        self.vertex
    }

    /// Union of the owner tags of every edge at this point.
    pub fn tags(&self) -> Vec<FigureId> {
        let mut tags: Vec<FigureId> = self.edges.iter().flat_map(|r| r.tags.iter().copied()).collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn has_tag(&self, id: FigureId) -> bool {
        self.edges.iter().any(|r| r.tags.contains(&id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().map(|r| &r.edge)
    }

    pub fn registrations(&self) -> &[IndexedEdge] {
        &self.edges
    }
}

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: BTreeMap<Cell, Vec<IndexEntry>>,
    len: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(100.0)
    }
}

fn normalize_tags(tags: &[FigureId]) -> Vec<FigureId> {
    let mut tags = tags.to_vec();
    tags.sort();
    tags.dedup();
    tags
}

impl SpatialIndex {
    /// `extent` is the side length of the expected coordinate domain; it only
    /// tunes bucketing, points outside it are still indexed.
    pub fn new(extent: f64) -> Self {
        let cell_size = if extent.is_finite() && extent > EPSILON {
            extent / CELLS_PER_EXTENT
        } else {
            1.0
        };
        Self { cell_size, cells: BTreeMap::new(), len: 0 }
    }

    /// Side length of the domain the grid was tuned for.
    pub fn extent(&self) -> f64 {
        self.cell_size * CELLS_PER_EXTENT
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.cells.values().flatten()
    }

    fn cell_of(&self, v: &Vertex) -> Cell {
        ((v.x / self.cell_size).floor() as i64, (v.y / self.cell_size).floor() as i64)
    }

    fn neighbourhood(&self, v: &Vertex) -> impl Iterator<Item = Cell> {
        let (cx, cy) = self.cell_of(v);
        (cx.saturating_sub(1)..=cx.saturating_add(1))
            .flat_map(move |x| (cy.saturating_sub(1)..=cy.saturating_add(1)).map(move |y| (x, y)))
    }

    fn locate(&self, v: &Vertex) -> Option<(Cell, usize)> {
        self.neighbourhood(v).find_map(|cell| {
            let entries = self.cells.get(&cell)?;
            let i = entries.iter().position(|e| vertex::same(&e.vertex, v))?;
            Some((cell, i))
        })
    }

    fn entry_mut(&mut self, v: &Vertex) -> Option<&mut IndexEntry> {
        let (cell, i) = self.locate(v)?;
        self.cells.get_mut(&cell).map(|entries| &mut entries[i])
    }

    fn entry_or_insert(&mut self, v: Vertex) -> &mut IndexEntry {
        let (cell, found) = match self.locate(&v) {
            Some((cell, i)) => (cell, Some(i)),
            None => (self.cell_of(&v), None),
        };
        let entries = self.cells.entry(cell).or_default();
        match found {
            Some(i) => &mut entries[i],
            None => {
                entries.push(IndexEntry { vertex: v, edges: Vec::new() });
                self.len += 1;
                let last = entries.len() - 1;
                &mut entries[last]
            }
        }
    }

    /// Drop a point once nothing is registered at it.
    fn collect(&mut self, v: &Vertex) {
        if let Some((cell, i)) = self.locate(v) {
            let Some(entries) = self.cells.get_mut(&cell) else { return };
            if entries[i].edges.is_empty() {
                entries.swap_remove(i);
                self.len -= 1;
                if entries.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Register `edge` at both endpoints, owned by `tags`.
    pub fn insert_edge(&mut self, edge: Edge, tags: &[FigureId]) {
        let tags = normalize_tags(tags);
        for v in edge.vertices() {
            let entry = self.entry_or_insert(v);
            match entry.edges.iter_mut().find(|r| r.edge.approx_eq(&edge) && r.tags == tags) {
                Some(existing) => existing.count += 1,
                None => entry.edges.push(IndexedEdge { edge, tags: tags.clone(), count: 1 }),
            }
        }
    }

    /// Undo one `insert_edge(edge, tags)`. Returns false if no such
    /// registration exists.
    pub fn remove_edge(&mut self, edge: &Edge, tags: &[FigureId]) -> bool {
        let tags = normalize_tags(tags);
        let mut removed = false;
        for v in edge.vertices() {
            let Some(entry) = self.entry_mut(&v) else { continue };
            if let Some(i) = entry.edges.iter().position(|r| r.edge.approx_eq(edge) && r.tags == tags) {
                entry.edges[i].count -= 1;
                if entry.edges[i].count == 0 {
                    entry.edges.remove(i);
                }
                removed = true;
            }
            self.collect(&v);
        }
        removed
    }

    /// Detach `id` from every edge at `v`; edges left without owners are
    /// dropped, and the point with them once it is empty.
    pub fn remove_tag(&mut self, v: &Vertex, id: FigureId) -> bool {
        let Some(entry) = self.entry_mut(v) else { return false };
        let mut removed = false;
        for r in entry.edges.iter_mut() {
            if let Some(i) = r.tags.iter().position(|t| *t == id) {
                r.tags.remove(i);
                removed = true;
            }
        }
        entry.edges.retain(|r| !r.tags.is_empty());
        self.collect(v);
        removed
    }

    /// The entry at `v`, within `EPSILON`.
    pub fn at(&self, v: &Vertex) -> Option<&IndexEntry> {
        let (cell, i) = self.locate(v)?;
        self.cells.get(&cell).map(|entries| &entries[i])
    }

    /// Every indexed point within `radius` of `origin`.
    pub fn find(&self, origin: &Vertex, radius: f64) -> Vec<&IndexEntry> {
        let within = |e: &&IndexEntry| vertex::distance(&e.vertex, origin) <= radius;

        let (x0, y0) = self.cell_of(&Vertex::new(origin.x - radius, origin.y - radius));
        let (x1, y1) = self.cell_of(&Vertex::new(origin.x + radius, origin.y + radius));
        let width = x1.checked_sub(x0).and_then(|w| w.checked_add(1));
        let height = y1.checked_sub(y0).and_then(|h| h.checked_add(1));
        let span = width.zip(height).and_then(|(w, h)| w.checked_mul(h));

        let scan_all = match span {
            Some(span) => span < 0 || span as u64 > self.cells.len() as u64,
            None => true,
        };
        if scan_all {
            return self.entries().filter(within).collect();
        }

        (x0..=x1)
            .flat_map(|x| (y0..=y1).map(move |y| (x, y)))
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .filter(within)
            .collect()
    }
}
