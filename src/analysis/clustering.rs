//! k-means segmentation of sites by page size and emissions
//!
//! Both features are z-score normalised before clustering; a feature with zero
//! variance maps to 0. Seeding is k-means++ driven by a `ChaCha8Rng`, so the
//! same seed always yields the same segmentation. Clusters are relabelled in
//! ascending order of mean emissions, so label 0 is the cleanest segment.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::analysis::TestOutcome;
use crate::analysis::descriptive::mean;
use crate::core::types::Dataset;

type Point = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centroid {
    pub cluster: usize,
    pub size_bytes: f64,
    pub emissions_gco2e: f64,
    /// Position in the z-score space the algorithm ran in
    pub normalized: [f64; 2],
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMeansModel {
    pub k: usize,
    /// Cluster of each record, in dataset order
    pub labels: Vec<usize>,
    pub centroids: Vec<Centroid>,
    /// Sum of squared distances to the assigned centroid, in normalised units
    pub inertia: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Column-wise (mean, population sd) scaling
struct Scaler {
    means: Point,
    std_devs: Point,
}

impl Scaler {
    fn fit(columns: [&[f64]; 2]) -> Self {
        let means = columns.map(mean);
        let mut std_devs = [0.0; 2];
        for (feature, column) in columns.iter().enumerate() {
            let variance = column
                .iter()
                .map(|v| (v - means[feature]).powi(2))
                .sum::<f64>()
                / column.len() as f64;
            std_devs[feature] = variance.sqrt();
        }
        Self { means, std_devs }
    }

    fn transform(&self, raw: Point) -> Point {
        let mut scaled = [0.0; 2];
        for feature in 0..2 {
            if self.std_devs[feature] > 0.0 {
                scaled[feature] = (raw[feature] - self.means[feature]) / self.std_devs[feature];
            }
        }
        scaled
    }

    fn inverse(&self, scaled: Point) -> Point {
        let mut raw = [0.0; 2];
        for feature in 0..2 {
            raw[feature] = self.means[feature] + scaled[feature] * self.std_devs[feature];
        }
        raw
    }
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Index of the closest center; ties go to the lower index
fn nearest(point: &Point, centers: &[Point]) -> (usize, f64) {
    centers
        .iter()
        .enumerate()
        .map(|(index, center)| (index, squared_distance(point, center)))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        })
}

/// k-means++: each next center is drawn with probability proportional to D^2
fn seed_centers(points: &[Point], k: usize, rng: &mut ChaCha8Rng) -> Vec<Point> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);

    while centers.len() < k {
        let distances: Vec<f64> = points.iter().map(|p| nearest(p, &centers).1).collect();
        let total: f64 = distances.iter().sum();

        let chosen = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            distances
                .iter()
                .position(|&d| {
                    target -= d;
                    target < 0.0
                })
                .unwrap_or_else(|| {
                    distances.iter().rposition(|&d| d > 0.0).unwrap_or(0)
                })
        } else {
            rng.gen_range(0..points.len())
        };
        centers.push(points[chosen]);
    }
    centers
}

pub fn fit_kmeans(
    dataset: &Dataset,
    k: usize,
    seed: u64,
    max_iterations: usize,
) -> TestOutcome<KMeansModel> {
    let n = dataset.len();
    if k == 0 {
        return TestOutcome::not_applicable("cluster count is 0");
    }
    if n < k {
        return TestOutcome::not_applicable(format!(
            "fewer records than clusters ({n} < {k})"
        ));
    }

    let sizes: Vec<f64> = dataset.records().iter().map(|r| r.size_bytes as f64).collect();
    let emissions = dataset.emissions();
    let scaler = Scaler::fit([sizes.as_slice(), emissions.as_slice()]);
    let raw: Vec<Point> = sizes.iter().zip(&emissions).map(|(&s, &e)| [s, e]).collect();
    let points: Vec<Point> = raw.iter().map(|&p| scaler.transform(p)).collect();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut centers = seed_centers(&points, k, &mut rng);
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centers).0).collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations {
        iterations += 1;

        // Update step; an empty cluster keeps its previous center
        let mut sums = vec![[0.0; 2]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            sums[label][0] += point[0];
            sums[label][1] += point[1];
            counts[label] += 1;
        }
        for cluster in 0..k {
            if counts[cluster] > 0 {
                let count = counts[cluster] as f64;
                centers[cluster] = [sums[cluster][0] / count, sums[cluster][1] / count];
            }
        }

        // Assignment step
        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centers).0).collect();
        if next == labels {
            converged = true;
            break;
        }
        labels = next;
    }

    let inertia: f64 = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centers[label]))
        .sum();

    let mut centroids: Vec<Centroid> = (0..k)
        .map(|cluster| {
            let members: Vec<&Point> = raw
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == cluster)
                .map(|(point, _)| point)
                .collect();
            let original = if members.is_empty() {
                scaler.inverse(centers[cluster])
            } else {
                let count = members.len() as f64;
                [
                    members.iter().map(|p| p[0]).sum::<f64>() / count,
                    members.iter().map(|p| p[1]).sum::<f64>() / count,
                ]
            };
            Centroid {
                cluster,
                size_bytes: original[0],
                emissions_gco2e: original[1],
                normalized: centers[cluster],
                members: members.len(),
            }
        })
        .collect();

    // Relabel by ascending emissions
    centroids.sort_by(|a, b| a.emissions_gco2e.total_cmp(&b.emissions_gco2e));
    let mut remap = vec![0; k];
    for (new_label, centroid) in centroids.iter_mut().enumerate() {
        remap[centroid.cluster] = new_label;
        centroid.cluster = new_label;
    }
    let labels = labels.into_iter().map(|label| remap[label]).collect();

    TestOutcome::Completed(KMeansModel {
        k,
        labels,
        centroids,
        inertia,
        iterations,
        converged,
    })
}
