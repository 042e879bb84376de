//! Myers shortest-edit-script line diff
//!
//! The classic O(ND) greedy algorithm: walk the edit graph breadth-first over
//! d (edit count), keep the furthest x per diagonal k, then backtrack through
//! the recorded rounds to recover the script. Output is deterministic for
//! identical inputs.

/// One line of one side, 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Eql,
    Ins,
    Del,
}

/// One line of the edit script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: EditKind,
    pub a_line: Option<Line>,
    pub b_line: Option<Line>,
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sign, line) = match self.kind {
            EditKind::Eql => (' ', self.a_line.as_ref()),
            EditKind::Del => ('-', self.a_line.as_ref()),
            EditKind::Ins => ('+', self.b_line.as_ref()),
        };
        let text = line.map(|line| line.text.as_str()).unwrap_or("");
        write!(f, "{sign}{text}")
    }
}

/// Diagonal-indexed furthest-x array with negative-k support
#[derive(Clone)]
struct Diagonals {
    values: Vec<isize>,
    offset: isize,
}

impl Diagonals {
    fn new(max: usize) -> Self {
        Diagonals {
            values: vec![0; 2 * max + 1],
            offset: max as isize,
        }
    }

    fn get(&self, k: isize) -> isize {
        self.values[(k + self.offset) as usize]
    }

    fn set(&mut self, k: isize, x: isize) {
        self.values[(k + self.offset) as usize] = x;
    }
}

pub struct MyersDiff<'a> {
    a: Vec<&'a str>,
    b: Vec<&'a str>,
}

impl<'a> MyersDiff<'a> {
    pub fn new(a: &'a str, b: &'a str) -> Self {
        MyersDiff {
            a: a.lines().collect(),
            b: b.lines().collect(),
        }
    }

    /// Compute the full edit script, equal lines included
    pub fn edits(&self) -> Vec<Edit> {
        if self.a.is_empty() && self.b.is_empty() {
            return Vec::new();
        }
        let trace = self.forward_trace();
        self.backtrack(&trace)
    }

    /// One furthest-x snapshot per round, as entered
    fn forward_trace(&self) -> Vec<Diagonals> {
        let n = self.a.len() as isize;
        let m = self.b.len() as isize;
        let max = (n + m) as usize;

        let mut v = Diagonals::new(max);
        let mut trace = Vec::new();

        for d in 0..=(max as isize) {
            trace.push(v.clone());

            let mut k = -d;
            while k <= d {
                let mut x = if k == -d || (k != d && v.get(k - 1) < v.get(k + 1)) {
                    v.get(k + 1)
                } else {
                    v.get(k - 1) + 1
                };
                let mut y = x - k;

                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    x += 1;
                    y += 1;
                }

                v.set(k, x);

                if x >= n && y >= m {
                    return trace;
                }
                k += 2;
            }
        }

        trace
    }

    fn backtrack(&self, trace: &[Diagonals]) -> Vec<Edit> {
        let mut x = self.a.len() as isize;
        let mut y = self.b.len() as isize;
        let mut edits = Vec::new();

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;
            let k = x - y;

            let prev_k = if k == -d || (k != d && v.get(k - 1) < v.get(k + 1)) {
                k + 1
            } else {
                k - 1
            };
            let prev_x = v.get(prev_k);
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edits.push(self.edit(EditKind::Eql, x - 1, y - 1));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                if x == prev_x {
                    edits.push(self.edit(EditKind::Ins, -1, prev_y));
                } else {
                    edits.push(self.edit(EditKind::Del, prev_x, -1));
                }
            }

            x = prev_x;
            y = prev_y;
        }

        edits.reverse();
        edits
    }

    fn edit(&self, kind: EditKind, a_index: isize, b_index: isize) -> Edit {
        let a_line = (a_index >= 0).then(|| Line {
            number: a_index as usize + 1,
            text: self.a[a_index as usize].to_string(),
        });
        let b_line = (b_index >= 0).then(|| Line {
            number: b_index as usize + 1,
            text: self.b[b_index as usize].to_string(),
        });
        Edit {
            kind,
            a_line,
            b_line,
        }
    }
}
