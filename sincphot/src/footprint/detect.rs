//! Connected-component detection of footprints from mask bits.
//!
//! Run-length labeling: each row is reduced to runs of selected pixels, runs
//! are linked to overlapping runs of the previous row with a union-find, and
//! every root becomes one footprint.

use crate::geom::BoxI;
use crate::image::{MaskPixel, Plane};

use super::{Footprint, Span};

/// Pixel connectivity used when grouping pixels into footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Only horizontal and vertical neighbours are connected.
    #[default]
    Four,
    /// Diagonal neighbours are connected as well.
    Eight,
}

/// Footprints found in one region of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintSet {
    footprints: Vec<Footprint>,
    region: BoxI,
}

impl FootprintSet {
    /// Group the pixels of `mask` with any of `bits` set into connected
    /// footprints. Footprints are ordered by their first pixel in row-major
    /// order; coordinates are in the mask's parent frame.
    pub fn from_mask(mask: &Plane<MaskPixel>, bits: MaskPixel, connectivity: Connectivity) -> Self {
        let (x_origin, y_origin) = mask.origin();
        let mut uf = UnionFind::default();
        let mut all_runs: Vec<(i32, Run)> = Vec::new();
        let mut prev_runs: Vec<Run> = Vec::new();
        let mut curr_runs: Vec<Run> = Vec::new();

        for y in 0..mask.height() {
            curr_runs.clear();
            extract_runs(mask.row(y), bits, &mut curr_runs);
            merge_runs_with_prev(&mut curr_runs, &prev_runs, connectivity, &mut uf);

            all_runs.extend(curr_runs.iter().map(|r| (y as i32, *r)));
            std::mem::swap(&mut prev_runs, &mut curr_runs);
        }

        // Root label -> footprint index, in order of first appearance.
        let mut slot_of_root: Vec<Option<usize>> = vec![None; uf.len()];
        let mut groups: Vec<Vec<Span>> = Vec::new();
        for (y, run) in all_runs {
            let root = uf.find(run.label);
            let slot = *slot_of_root[root].get_or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(Span::new(
                y + y_origin,
                run.start as i32 + x_origin,
                run.end as i32 - 1 + x_origin,
            ));
        }

        let footprints = groups
            .into_iter()
            .filter_map(Footprint::from_spans)
            .collect();

        Self {
            footprints,
            region: mask.bbox(),
        }
    }

    #[inline]
    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    /// Box the footprints were detected in.
    #[inline]
    pub fn region(&self) -> BoxI {
        self.region
    }

    pub fn into_footprints(self) -> Vec<Footprint> {
        self.footprints
    }
}

/// Horizontal run `start..end` (local x, end exclusive) with its provisional label.
#[derive(Debug, Clone, Copy)]
struct Run {
    start: u32,
    end: u32,
    label: usize,
}

fn extract_runs(row: &[MaskPixel], bits: MaskPixel, runs: &mut Vec<Run>) {
    let mut run_start = None;
    for (x, &m) in row.iter().enumerate() {
        match (m & bits != 0, run_start) {
            (true, None) => run_start = Some(x as u32),
            (false, Some(start)) => {
                runs.push(Run {
                    start,
                    end: x as u32,
                    label: 0,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(Run {
            start,
            end: row.len() as u32,
            label: 0,
        });
    }
}

#[inline]
fn runs_connected(prev: &Run, curr: &Run, connectivity: Connectivity) -> bool {
    match connectivity {
        Connectivity::Four => prev.start < curr.end && prev.end > curr.start,
        Connectivity::Eight => prev.start < curr.end + 1 && prev.end + 1 > curr.start,
    }
}

/// Label `curr_runs`, joining labels of every connected run in `prev_runs`.
fn merge_runs_with_prev(
    curr_runs: &mut [Run],
    prev_runs: &[Run],
    connectivity: Connectivity,
    uf: &mut UnionFind,
) {
    for run in curr_runs.iter_mut() {
        let mut assigned = None;
        for prev in prev_runs.iter().filter(|p| runs_connected(p, run, connectivity)) {
            match assigned {
                Some(label) => uf.union(label, prev.label),
                None => assigned = Some(prev.label),
            }
        }
        run.label = assigned.unwrap_or_else(|| uf.make_set());
    }
}

#[derive(Debug, Default)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn len(&self) -> usize {
        self.parent.len()
    }

    fn make_set(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }

    /// Root of `label`, compressing the path on the way.
    fn find(&mut self, label: usize) -> usize {
        let mut root = label;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = label;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        // Smaller label wins so roots follow first appearance.
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}
