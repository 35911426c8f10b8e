//! Banded dynamic-programming edit-distance engine.
//!
//! `EditColumn` is a sparse column of the Levenshtein matrix, holding only the cells whose
//! value is within `max_distance` of the start (and, optionally, within `diagonal_margin` of
//! the main diagonal). Every cell outside the stored run is implicitly `+inf`. `EditMatrix`
//! stacks these columns and can recover a full edit script via traceback.
//!
//! The inner loop mirrors the teacher crate's `// safe because ...`-commented unchecked-index
//! style (see `lcp.rs`'s `idx`/`idx_mut`), since this is the hottest loop in the crate.

/// `0.0` if the two elements compare equal, else `1.0`.
#[inline]
pub fn standard_distance<C: PartialEq>(a: &C, b: &C) -> f64 {
    if a == b {
        0.0
    } else {
        1.0
    }
}

/// A sparse column of the edit-distance matrix.
///
/// Conceptually `values[k]` is the cost at row `start_row + k`; any row outside
/// `[start_row, start_row + values.len())` is `+inf`.
#[derive(Debug, Clone)]
pub struct EditColumn {
    start_row: isize,
    values: Vec<f64>,
}

impl EditColumn {
    /// An empty column (used to fill out a matrix once the band has run dry).
    #[inline]
    pub fn empty() -> Self {
        EditColumn {
            start_row: -1,
            values: Vec::new(),
        }
    }

    #[inline]
    pub fn start_row(&self) -> isize {
        self.start_row
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the cost at `row`, or `+inf` if `row` falls outside the materialized run.
    #[inline]
    pub fn get(&self, row: isize) -> f64 {
        if row < self.start_row {
            return f64::INFINITY;
        }
        // safe because row >= self.start_row was just checked, so the subtraction doesn't wrap
        let offset = (row - self.start_row) as usize;
        if offset < self.values.len() {
            self.values[offset]
        } else {
            f64::INFINITY
        }
    }

    /// Builds the initial column (`column_index = -1`): the cost of deleting the first `k`
    /// pattern characters, for `k` from `0` up to the band limit.
    pub fn create_initial(pattern_len: usize, max_distance: f64, diagonal_margin: Option<usize>) -> Self {
        let mut bound = if max_distance.is_finite() {
            max_distance.floor().max(0.0) as usize
        } else {
            pattern_len
        };
        bound = bound.min(pattern_len);
        if let Some(margin) = diagonal_margin {
            bound = bound.min(margin);
        }
        let values = (0..=bound).map(|v| v as f64).collect();
        EditColumn { start_row: -1, values }
    }

    /// Computes the column following `current`, having just compared every pattern character
    /// against `next_col_char` (the `column_index`-th character of the row/target sequence).
    ///
    /// Returns `None` if no cell of the new column would fall within `max_distance` — the
    /// caller should treat this as "prune" (approximate search) or "band exhausted"
    /// (`EditMatrix` construction).
    #[allow(clippy::too_many_arguments)]
    pub fn create_next<C, F>(
        row_word: &[C],
        max_distance: f64,
        column_index: isize,
        diagonal_margin: Option<usize>,
        distance_fn: F,
        current: &EditColumn,
        next_col_char: &C,
        mut match_cb: Option<&mut dyn FnMut(usize, f64)>,
    ) -> Option<EditColumn>
    where
        F: Fn(&C, &C) -> f64,
    {
        let pattern_len = row_word.len();
        let lo = match diagonal_margin {
            Some(margin) => current.start_row.max(column_index - margin as isize),
            None => current.start_row,
        };
        let mut hi = (current.start_row + current.len() as isize).min(pattern_len as isize);
        if let Some(margin) = diagonal_margin {
            hi = hi.min(column_index + margin as isize + 1);
        }

        let mut next = EditColumn {
            start_row: lo,
            values: Vec::new(),
        };
        let mut row = lo;
        while row < hi {
            let mut e = current.get(row) + 1.0; // insertion
            if row >= 0 {
                // safe because row >= 0 was just checked and row < pattern_len by construction of `hi`
                let ch = unsafe { row_word.get_unchecked(row as usize) };
                let replace = current.get(row - 1) + distance_fn(ch, next_col_char);
                if replace < e {
                    e = replace;
                }
            }
            if !next.values.is_empty() {
                let delete = next.get(row - 1) + 1.0;
                if delete < e {
                    e = delete;
                }
            }
            if e <= max_distance {
                if next.values.is_empty() {
                    next.start_row = row;
                }
                next.values.push(e);
                if row >= 0 {
                    if let Some(cb) = match_cb.as_deref_mut() {
                        cb(row as usize, e);
                    }
                }
            } else if !next.values.is_empty() {
                break;
            }
            row += 1;
        }

        if next.values.is_empty() {
            None
        } else {
            Some(next)
        }
    }
}

/// A single step of an edit script turning `source` into `target`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand<C> {
    /// `source[source_index]` is replaced by `to`.
    Replace {
        source_index: usize,
        from: C,
        to: C,
        cost: f64,
    },
    /// `source[source_index]` is removed.
    Delete { source_index: usize, cost: f64 },
    /// `to` is inserted immediately before `source[source_index]` (`source_index == source.len()`
    /// means "appended at the end").
    Insert { source_index: usize, to: C, cost: f64 },
}

impl<C> EditCommand<C> {
    pub fn cost(&self) -> f64 {
        match self {
            EditCommand::Replace { cost, .. } => *cost,
            EditCommand::Delete { cost, .. } => *cost,
            EditCommand::Insert { cost, .. } => *cost,
        }
    }
}

/// A stack of [`EditColumn`]s: the full (or banded) edit-distance matrix between a pattern and
/// a target sequence.
#[derive(Debug, Clone)]
pub struct EditMatrix {
    /// `columns[0]` is the initial column (`column_index = -1`); `columns[k+1]` is the column
    /// for `column_index = k`.
    columns: Vec<EditColumn>,
    pattern_len: usize,
}

impl EditMatrix {
    /// Builds the matrix column-by-column. If the band runs dry, the remaining columns are
    /// filled with [`EditColumn::empty`] and construction stops advancing the band early
    /// (later columns carry no information).
    pub fn from_edit_distance<C, F>(
        source: &[C],
        target: &[C],
        max_distance: f64,
        distance_fn: F,
        diagonal_margin: Option<usize>,
    ) -> Self
    where
        F: Fn(&C, &C) -> f64,
    {
        let pattern_len = source.len();
        let mut columns = Vec::with_capacity(target.len() + 1);
        columns.push(EditColumn::create_initial(pattern_len, max_distance, diagonal_margin));

        let mut exhausted = false;
        for (j, col_char) in target.iter().enumerate() {
            if exhausted {
                columns.push(EditColumn::empty());
                continue;
            }
            let current = columns.last().unwrap();
            match EditColumn::create_next(
                source,
                max_distance,
                j as isize,
                diagonal_margin,
                &distance_fn,
                current,
                col_char,
                None,
            ) {
                Some(next) => columns.push(next),
                None => {
                    columns.push(EditColumn::empty());
                    exhausted = true;
                }
            }
        }

        EditMatrix { columns, pattern_len }
    }

    /// Returns the cost at `(row, column_index)`, `+inf` if it falls outside every stored band.
    #[inline]
    pub fn get(&self, row: isize, column_index: isize) -> f64 {
        let slot = column_index + 1;
        if slot < 0 || slot as usize >= self.columns.len() {
            return f64::INFINITY;
        }
        self.columns[slot as usize].get(row)
    }

    /// The edit distance between the two full sequences, i.e. the bottom-right corner cell.
    #[inline]
    pub fn distance(&self) -> f64 {
        let target_len = self.columns.len() as isize - 2;
        self.get(self.pattern_len as isize - 1, target_len)
    }

    /// Recovers an edit script turning `source` into `target`, by building the full
    /// (unbanded) matrix and tracing back from the bottom-right corner.
    ///
    /// Tie-break policy: replace > delete > insert. A diagonal step that leaves the cost
    /// unchanged was a free character match and emits no command.
    pub fn get_edit_commands<C, F>(source: &[C], target: &[C], distance_fn: F) -> Vec<EditCommand<C>>
    where
        C: Clone + PartialEq,
        F: Fn(&C, &C) -> f64,
    {
        let matrix = EditMatrix::from_edit_distance(source, target, f64::INFINITY, &distance_fn, None);

        let mut i = source.len() as isize - 1;
        let mut j = target.len() as isize - 1;
        let mut commands = Vec::new();

        while i >= 0 || j >= 0 {
            if i >= 0 && j >= 0 {
                let diag = matrix.get(i - 1, j - 1);
                let up = matrix.get(i - 1, j);
                let left = matrix.get(i, j - 1);
                let cur = matrix.get(i, j);
                if diag <= up && diag <= left && diag <= cur {
                    let from = source[i as usize].clone();
                    let to = target[j as usize].clone();
                    if from != to {
                        let cost = distance_fn(&from, &to);
                        commands.push(EditCommand::Replace {
                            source_index: i as usize,
                            from,
                            to,
                            cost,
                        });
                    }
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }
            if i >= 0 {
                let up = matrix.get(i - 1, j);
                let left = if j >= 0 { matrix.get(i, j - 1) } else { f64::INFINITY };
                if j < 0 || up <= left {
                    commands.push(EditCommand::Delete {
                        source_index: i as usize,
                        cost: 1.0,
                    });
                    i -= 1;
                    continue;
                }
            }
            // insert: i < 0 or the comparison above fell through to favor insertion
            commands.push(EditCommand::Insert {
                source_index: (i + 1) as usize,
                to: target[j as usize].clone(),
                cost: 1.0,
            });
            j -= 1;
        }

        commands.reverse();
        commands
    }

    /// Applies an edit script to `source`, reproducing the target it was computed from.
    /// Used by tests to assert replay correctness; exposed since it is a useful general
    /// operation for callers that only persisted the script.
    pub fn apply_edit_commands<C: Clone>(source: &[C], commands: &[EditCommand<C>]) -> Vec<C> {
        let mut result = Vec::with_capacity(source.len());
        let mut pos = 0usize;
        for cmd in commands {
            match cmd {
                EditCommand::Insert { source_index, to, .. } => {
                    while pos < *source_index {
                        result.push(source[pos].clone());
                        pos += 1;
                    }
                    result.push(to.clone());
                }
                EditCommand::Delete { source_index, .. } => {
                    while pos < *source_index {
                        result.push(source[pos].clone());
                        pos += 1;
                    }
                    pos += 1;
                }
                EditCommand::Replace { source_index, to, .. } => {
                    while pos < *source_index {
                        result.push(source[pos].clone());
                        pos += 1;
                    }
                    result.push(to.clone());
                    pos += 1;
                }
            }
        }
        while pos < source.len() {
            result.push(source[pos].clone());
            pos += 1;
        }
        result
    }
}

/// Standalone edit distance between two sequences, using the standard 0/1 distance function.
pub fn edit_distance<C: PartialEq>(source: &[C], target: &[C]) -> f64 {
    EditMatrix::from_edit_distance(source, target, f64::INFINITY, standard_distance, None).distance()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_kitten_sitting() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        assert_eq!(edit_distance(&a, &b), 3.0);
    }

    #[test]
    fn distance_is_symmetric_under_swap() {
        let a: Vec<char> = "flaw".chars().collect();
        let b: Vec<char> = "lawn".chars().collect();
        assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
    }

    #[test]
    fn triangle_inequality_holds() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        let c: Vec<char> = "mitten".chars().collect();
        let d_ac = edit_distance(&a, &c);
        let d_ab = edit_distance(&a, &b);
        let d_bc = edit_distance(&b, &c);
        assert!(d_ac <= d_ab + d_bc);
    }

    #[test]
    fn empty_sequences_have_zero_distance() {
        let empty: Vec<char> = Vec::new();
        assert_eq!(edit_distance(&empty, &empty), 0.0);
    }

    #[test]
    fn distance_against_empty_is_length() {
        let a: Vec<char> = "abcd".chars().collect();
        let empty: Vec<char> = Vec::new();
        assert_eq!(edit_distance(&a, &empty), 4.0);
        assert_eq!(edit_distance(&empty, &a), 4.0);
    }

    #[test]
    fn edit_script_replays_to_target_with_matching_cost() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        let commands = EditMatrix::get_edit_commands(&a, &b, standard_distance);
        let total_cost: f64 = commands.iter().map(|c| c.cost()).sum();
        assert_eq!(total_cost, 3.0);
        let replayed = EditMatrix::apply_edit_commands(&a, &commands);
        assert_eq!(replayed, b);
    }

    #[test]
    fn edit_script_on_identical_sequences_is_empty() {
        let a: Vec<char> = "same".chars().collect();
        let commands = EditMatrix::get_edit_commands(&a, &a, standard_distance);
        assert!(commands.is_empty());
    }

    #[test]
    fn banded_column_prunes_out_of_range_cells() {
        let pattern: Vec<char> = "aaaa".chars().collect();
        let initial = EditColumn::create_initial(pattern.len(), 1.0, None);
        assert_eq!(initial.len(), 2); // rows -1, 0
        let next = EditColumn::create_next(&pattern, 1.0, 0, None, standard_distance, &initial, &'b', None);
        assert!(next.is_some());
        let far_off = EditColumn::create_next(&pattern, 0.0, 0, None, standard_distance, &initial, &'b', None);
        // replacing 'a' with 'b' costs 1 > max_distance 0, and no shorter match survives either
        assert!(far_off.is_none() || far_off.unwrap().get(0) > 0.0);
    }
}
