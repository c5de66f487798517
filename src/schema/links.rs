//! Foreign-key link graph and join synthesis.
//!
//! `links[A][B]` is the column in `A` that joins to `B`. Only directly linked
//! tables can be joined; the graph is searched for longer paths solely to
//! tell a missing link apart from a multi-hop one in the logs.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};

/// Rendering of a synthesized join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `A JOIN B`, used in the FROM clause.
    From,
    /// `A.col = B.col`, used in the WHERE clause.
    Where,
}

impl JoinKind {
    /// Marker token that requests this kind of join in a SQL template.
    pub fn marker(self) -> &'static str {
        match self {
            JoinKind::From => "JOIN_FROM",
            JoinKind::Where => "JOIN_WHERE",
        }
    }

    pub fn from_marker(token: &str) -> Option<Self> {
        match token {
            "JOIN_FROM" => Some(JoinKind::From),
            "JOIN_WHERE" => Some(JoinKind::Where),
            _ => None,
        }
    }
}

/// Undirected adjacency between tables with per-direction join columns.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    columns: BTreeMap<String, BTreeMap<String, String>>,
    graph: UnGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_table(&mut self, table: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(table) {
            return *idx;
        }
        let idx = self.graph.add_node(table.to_string());
        self.nodes.insert(table.to_string(), idx);
        idx
    }

    /// Record that `column` in `from` joins to `to`.
    pub fn add_link(&mut self, from: &str, to: &str, column: &str) {
        let a = self.add_table(from);
        let b = self.add_table(to);
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
        self.columns
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), column.to_string());
    }

    /// Join column in `from` towards `to`, if the tables are directly linked.
    pub fn column(&self, from: &str, to: &str) -> Option<&str> {
        self.columns
            .get(from)
            .and_then(|targets| targets.get(to))
            .map(String::as_str)
    }

    pub fn is_linked(&self, from: &str, to: &str) -> bool {
        self.column(from, to).is_some()
    }

    /// Shortest table path between two tables, endpoints included.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let start = *self.nodes.get(from)?;
        let goal = *self.nodes.get(to)?;
        if start == goal {
            return Some(vec![from.to_string()]);
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors(current) {
                if !visited.insert(neighbor) {
                    continue;
                }
                parents.insert(neighbor, current);
                if neighbor == goal {
                    let mut path = vec![self.graph[goal].clone()];
                    let mut node = goal;
                    while let Some(parent) = parents.get(&node) {
                        path.push(self.graph[*parent].clone());
                        node = *parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(neighbor);
            }
        }
        None
    }

    fn log_missing(&self, from: &str, to: &str) {
        match self.shortest_path(from, to) {
            Some(path) if path.len() > 2 => tracing::info!(
                from,
                to,
                hops = path.len() - 1,
                "multi-hop join not supported, only directly linked tables can be joined"
            ),
            _ => tracing::info!(from, to, "no link found between tables"),
        }
    }

    /// Join expression between two tables.
    ///
    /// A table joined with itself yields the table for FROM and the empty
    /// string for WHERE. `None` means the tables are not directly linked.
    pub fn join_path(&self, from: &str, to: &str, kind: JoinKind) -> Option<String> {
        if from == to {
            tracing::warn!(table = from, "attempted aggregation over one table");
            return Some(match kind {
                JoinKind::From => from.to_string(),
                JoinKind::Where => String::new(),
            });
        }

        let (Some(from_col), Some(to_col)) = (self.column(from, to), self.column(to, from)) else {
            self.log_missing(from, to);
            return None;
        };

        Some(match kind {
            JoinKind::From => format!("{from} JOIN {to}"),
            JoinKind::Where => format!("{from}.{from_col} = {to}.{to_col}"),
        })
    }

    /// Qualified join column of `from` towards `to`; `None` for a self join
    /// or unlinked tables.
    pub fn join_column(&self, from: &str, to: &str) -> Option<String> {
        if from == to {
            tracing::warn!(table = from, "attempted aggregation over one table");
            return None;
        }
        match self.column(from, to) {
            Some(col) => Some(format!("{from}.{col}")),
            None => {
                self.log_missing(from, to);
                None
            }
        }
    }
}
