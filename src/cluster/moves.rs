//! Candidate move bookkeeping keyed by community id

/// Square table of candidate gains plus per-destination move masks
///
/// `gains[origin][destination]` is the best gain of moving part of `origin`
/// into `destination`; `splits[destination][vertex]` says whether `vertex`
/// moves in that candidate (each vertex belongs to one origin, so one mask
/// row per destination covers every origin).
#[derive(Debug, Clone)]
pub struct MoveTable {
    gains: Vec<Vec<f64>>,
    splits: Vec<Vec<bool>>,
    vertex_count: usize,
}

impl MoveTable {
    /// Table with `slots` community slots over `vertex_count` vertices
    pub fn new(slots: usize, vertex_count: usize) -> Self {
        Self {
            gains: vec![vec![0.0; slots]; slots],
            splits: vec![vec![false; vertex_count]; slots],
            vertex_count,
        }
    }

    /// Number of community slots
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    pub fn gain(&self, origin: usize, destination: usize) -> f64 {
        self.gains[origin][destination]
    }

    pub fn set_gain(&mut self, origin: usize, destination: usize, gain: f64) {
        self.gains[origin][destination] = gain;
    }

    /// Move mask for `destination`, indexed by vertex
    pub fn split(&self, destination: usize) -> &[bool] {
        &self.splits[destination]
    }

    /// Store the mask of one candidate for the given origin vertices
    pub fn record_split(&mut self, destination: usize, vertices: &[usize], to_be_moved: &[bool]) {
        let row = &mut self.splits[destination];
        for (&vertex, &moved) in vertices.iter().zip(to_be_moved) {
            row[vertex] = moved;
        }
    }

    /// Append one empty slot
    pub fn add_slot(&mut self) {
        for row in self.gains.iter_mut() {
            row.push(0.0);
        }
        self.gains.push(vec![0.0; self.gains.len() + 1]);
        self.splits.push(vec![false; self.vertex_count]);
    }

    /// Copy destination column `from` into `to` for origins `0..origins`
    pub fn copy_slot(&mut self, from: usize, to: usize, origins: usize) {
        for row in self.gains.iter_mut().take(origins) {
            row[to] = row[from];
        }
        self.splits[to] = self.splits[from].clone();
    }

    /// Drop the row and column of `slot`, shifting later slots down
    ///
    /// The table keeps its size; the vacated last slot is zeroed.
    pub fn remove_slot(&mut self, slot: usize) {
        let slots = self.len();
        self.gains.remove(slot);
        for row in self.gains.iter_mut() {
            row.remove(slot);
            row.push(0.0);
        }
        self.gains.push(vec![0.0; slots]);
        self.splits.remove(slot);
        self.splits.push(vec![false; self.vertex_count]);
    }

    /// First strict maximum over `origins x destinations`, row-major
    ///
    /// Returns `(gain, origin, destination)`; the gain is -1 when the range
    /// is empty.
    pub fn best(&self, origins: usize, destinations: usize) -> (f64, usize, usize) {
        let mut best = (-1.0, 0, 0);
        for (origin, row) in self.gains.iter().enumerate().take(origins) {
            for (destination, &gain) in row.iter().enumerate().take(destinations) {
                if best.0 < gain {
                    best = (gain, origin, destination);
                }
            }
        }
        best
    }
}
