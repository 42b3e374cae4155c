// Brute-force nearest neighbours under cosine distance.
//
// Vectors are L2-normalised once, so each comparison is a dot product.
// A zero vector has similarity 0 (distance 1) with everything.

use crate::output::document_progress;

/// The closest other vector to `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub neighbor: usize,
    /// Cosine distance, in [0, 2]
    pub distance: f64,
}

/// Cosine distance: 1 - cosine similarity, clamped to [0, 2].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let mag_a = norm(a);
    let mag_b = norm(b);

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        1.0
    } else {
        (1.0 - dot / denom).clamp(0.0, 2.0)
    }
}

/// Rows of the query block compared against every candidate row per pass.
const BLOCK_ROWS: usize = 64;

/// For every vector, find its single nearest neighbour excluding itself.
///
/// Ties go to the lowest index. Fewer than two vectors means nobody has a
/// neighbour, so the result is empty.
///
/// Cost is quadratic: V words of dimension d take V * V * d multiply-adds.
/// Unit vectors live in one contiguous buffer and queries run in blocks of
/// `BLOCK_ROWS`, so each candidate row is loaded once per block rather than
/// once per query, but a 10^5-word vocabulary is still on the order of
/// 10^11 operations.
pub fn nearest_neighbors(vectors: &[Vec<f32>]) -> Vec<Neighbor> {
    let n = vectors.len();
    if n < 2 {
        return Vec::new();
    }

    let dim = vectors[0].len();
    let unit = normalised_rows(vectors, dim);
    let row = |i: usize| &unit[i * dim..(i + 1) * dim];
    let pb = document_progress(n, "Neighbours");

    let mut best: Vec<Neighbor> = (0..n)
        .map(|index| Neighbor {
            index,
            neighbor: usize::MAX,
            distance: f64::INFINITY,
        })
        .collect();

    for block_start in (0..n).step_by(BLOCK_ROWS) {
        let block_end = (block_start + BLOCK_ROWS).min(n);
        // Candidates ascend, so strict comparison keeps the earlier index on ties
        for j in 0..n {
            let b = row(j);
            for (i, slot) in best[block_start..block_end]
                .iter_mut()
                .enumerate()
                .map(|(k, slot)| (block_start + k, slot))
            {
                if i == j {
                    continue;
                }
                let dot: f64 = row(i).iter().zip(b).map(|(x, y)| x * y).sum();
                let distance = (1.0 - dot).clamp(0.0, 2.0);
                if distance < slot.distance {
                    slot.neighbor = j;
                    slot.distance = distance;
                }
            }
        }
        pb.inc((block_end - block_start) as u64);
    }

    pb.finish_and_clear();
    best
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

/// All vectors L2-normalised into one row-major buffer of `dim` columns.
/// Zero vectors, and any whose length isn't `dim`, become zero rows.
fn normalised_rows(vectors: &[Vec<f32>], dim: usize) -> Vec<f64> {
    let mut unit = vec![0.0; vectors.len() * dim];
    for (v, out) in vectors.iter().zip(unit.chunks_exact_mut(dim.max(1))) {
        let n = norm(v);
        if v.len() == dim && n >= f64::EPSILON {
            for (o, x) in out.iter_mut().zip(v) {
                *o = f64::from(*x) / n;
            }
        }
    }
    unit
}
