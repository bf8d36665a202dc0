//! Open-tour travelling-salesman heuristic
//!
//! A Lin-Kernighan style local search over a directed tour. Node 0 stays
//! fixed at the tour head; candidate moves are 2-opt segment reversals and
//! single-node relocations, and the best strictly-improving move is applied
//! until the tour is locally optimal. Costs are read directly from the
//! matrix, so an asymmetric matrix (column 0 zeroed for the open tour) is
//! handled correctly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ndarray::Array2;
use ordered_float::OrderedFloat;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve the open-tour problem on the given cost matrix.
///
/// Returns the visiting permutation, always beginning at node 0, and the
/// tour distance including the (typically free) closing edge back to 0.
pub fn solve_open_tour(matrix: &Array2<f64>) -> (Vec<usize>, f64) {
    let n = matrix.nrows();
    let mut tour: Vec<usize> = (0..n).collect();

    if n > 2 {
        improve_tour(matrix, &mut tour);
    }

    let distance = tour_cost(matrix, &tour);
    (tour, distance)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Directed cost of the full tour cycle, including the closing edge.
fn tour_cost(matrix: &Array2<f64>, tour: &[usize]) -> f64 {
    let n = tour.len();
    if n < 2 {
        return 0.0;
    }

    (0..n)
        .map(|i| matrix[[tour[i], tour[(i + 1) % n]]])
        .sum()
}

/// Apply improving moves until none remains.
fn improve_tour(matrix: &Array2<f64>, tour: &mut Vec<usize>) {
    let mut best_cost = tour_cost(matrix, tour);

    while let Some((next_tour, next_cost)) = best_move(matrix, tour, best_cost) {
        *tour = next_tour;
        best_cost = next_cost;
    }
}

/// The best strictly-improving 2-opt reversal or relocation, if any.
fn best_move(matrix: &Array2<f64>, tour: &[usize], current: f64) -> Option<(Vec<usize>, f64)> {
    let n = tour.len();
    let mut best: Option<(Vec<usize>, f64)> = None;

    // 2-opt: reverse tour[i..=j], keeping node 0 at the head
    for i in 1..n - 1 {
        for j in (i + 1)..n {
            let mut candidate = tour.to_vec();
            candidate[i..=j].reverse();
            consider(matrix, candidate, &mut best);
        }
    }

    // Relocation: move one node to another position
    for i in 1..n {
        for j in 1..n {
            if i == j {
                continue;
            }
            let mut candidate = tour.to_vec();
            let node = candidate.remove(i);
            candidate.insert(j, node);
            consider(matrix, candidate, &mut best);
        }
    }

    match best {
        Some((_, cost)) if cost < current => best,
        _ => None,
    }
}

/// Keep `candidate` if it beats the best tour found so far this pass.
fn consider(matrix: &Array2<f64>, candidate: Vec<usize>, best: &mut Option<(Vec<usize>, f64)>) {
    let cost = tour_cost(matrix, &candidate);

    let better = match best {
        Some((_, b)) => OrderedFloat(cost) < OrderedFloat(*b),
        None => true,
    };

    if better {
        *best = Some((candidate, cost));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
