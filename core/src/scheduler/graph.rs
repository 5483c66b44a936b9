use std::collections::{HashMap, HashSet};

use crate::error::SchedulerError;
use crate::scheduler::types::TaskLike;

/// Task dependency graph (DAG), indexed by submission order.
///
/// Dependencies naming ids outside the graph are kept aside in `missing`
/// rather than rejected, so callers can choose their own policy.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    /// Task ids in submission order
    ids: Vec<String>,

    /// task_id -> index
    index: HashMap<String, usize>,

    /// Known dependency edges: index -> indices it depends on (deduplicated)
    pub edges: Vec<Vec<usize>>,

    /// Reverse edges: index -> indices that depend on it
    pub reverse_edges: Vec<Vec<usize>>,

    /// Dependency ids that are not part of the graph
    missing: Vec<Vec<String>>,
}

impl TaskGraph {
    /// Construct task graph from task list
    pub fn from_tasks<T: TaskLike>(tasks: &[T]) -> Result<Self, SchedulerError> {
        let mut index = HashMap::with_capacity(tasks.len());
        let mut ids = Vec::with_capacity(tasks.len());

        // Add all nodes
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.id().to_string(), i).is_some() {
                return Err(SchedulerError::DuplicateTaskId(task.id().to_string()));
            }
            ids.push(task.id().to_string());
        }

        let mut edges = vec![Vec::new(); tasks.len()];
        let mut reverse_edges = vec![Vec::new(); tasks.len()];
        let mut missing = vec![Vec::new(); tasks.len()];

        for (i, task) in tasks.iter().enumerate() {
            let mut seen = HashSet::new();
            for dep in task.dependencies() {
                if !seen.insert(dep.as_str()) {
                    continue;
                }
                match index.get(dep) {
                    Some(&d) => {
                        edges[i].push(d);
                        reverse_edges[d].push(i);
                    }
                    None => missing[i].push(dep.clone()),
                }
            }
        }

        Ok(Self {
            ids,
            index,
            edges,
            reverse_edges,
            missing,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Dependency ids of a task that do not name any task in the graph
    pub fn missing_dependencies(&self, index: usize) -> &[String] {
        &self.missing[index]
    }

    /// Validate dependency relationships
    pub fn validate(&self) -> Result<(), SchedulerError> {
        for (i, missing) in self.missing.iter().enumerate() {
            if let Some(dep) = missing.first() {
                return Err(SchedulerError::DependencyNotFound {
                    task_id: self.ids[i].clone(),
                    missing_dep: dep.clone(),
                });
            }
        }

        if let Some(cycle) = self.detect_cycle() {
            return Err(SchedulerError::CircularDependency(cycle));
        }

        Ok(())
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Returns execution stages where tasks in the same stage could run in
    /// parallel, each stage in submission order. Missing dependencies are
    /// ignored here.
    ///
    /// # Time Complexity
    ///
    /// O(V + E) where V = number of tasks, E = number of dependencies
    pub fn topological_sort(&self) -> Result<Vec<Vec<String>>, SchedulerError> {
        let mut in_degree: Vec<usize> = self.edges.iter().map(Vec::len).collect();

        let mut stages: Vec<Vec<String>> = Vec::new();
        let mut current_stage: Vec<usize> = (0..self.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut processed = 0;

        while !current_stage.is_empty() {
            processed += current_stage.len();

            let mut next_stage = Vec::new();
            for &task in &current_stage {
                for &dependent in &self.reverse_edges[task] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        next_stage.push(dependent);
                    }
                }
            }
            next_stage.sort_unstable();

            stages.push(current_stage.iter().map(|&i| self.ids[i].clone()).collect());
            current_stage = next_stage;
        }

        if processed != self.len() {
            let cycle = self
                .detect_cycle()
                .unwrap_or_else(|| "unable to complete topological sort".to_string());
            return Err(SchedulerError::CircularDependency(cycle));
        }

        Ok(stages)
    }

    /// First cycle found, formatted as `a -> b -> a`
    pub fn detect_cycle(&self) -> Option<String> {
        let components = self.cyclic_components();
        let first = components.first()?;
        self.cycle_within(first)
            .map(|path| self.format_cycle(&path))
    }

    /// Every task that lies on a dependency cycle, with a cycle through its
    /// strongly connected component. Sorted by task index.
    ///
    /// Tasks merely downstream of a cycle are not included.
    ///
    /// # Time Complexity
    ///
    /// O(V + E)
    pub fn cycle_members(&self) -> Vec<(usize, String)> {
        let mut members = Vec::new();
        for component in self.cyclic_components() {
            let Some(path) = self.cycle_within(&component) else {
                continue;
            };
            let cycle = self.format_cycle(&path);
            members.extend(component.into_iter().map(|i| (i, cycle.clone())));
        }
        members.sort_unstable_by_key(|(i, _)| *i);
        members
    }

    /// Strongly connected components that contain a cycle: more than one
    /// task, or a single task depending on itself. Each component is sorted,
    /// and components are ordered by their lowest index.
    ///
    /// Iterative Tarjan, so deep chains cannot overflow the stack.
    fn cyclic_components(&self) -> Vec<Vec<usize>> {
        const UNVISITED: usize = usize::MAX;

        let n = self.len();
        let mut order = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut next_order = 0;
        let mut components = Vec::new();

        for root in 0..n {
            if order[root] != UNVISITED {
                continue;
            }
            order[root] = next_order;
            low[root] = next_order;
            next_order += 1;
            stack.push(root);
            on_stack[root] = true;

            // (node, next edge to explore)
            let mut calls: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(top) = calls.last_mut() {
                let (node, next) = *top;
                if let Some(&dep) = self.edges[node].get(next) {
                    top.1 += 1;
                    if order[dep] == UNVISITED {
                        order[dep] = next_order;
                        low[dep] = next_order;
                        next_order += 1;
                        stack.push(dep);
                        on_stack[dep] = true;
                        calls.push((dep, 0));
                    } else if on_stack[dep] {
                        low[node] = low[node].min(order[dep]);
                    }
                    continue;
                }

                calls.pop();
                if let Some(&(parent, _)) = calls.last() {
                    low[parent] = low[parent].min(low[node]);
                }
                if low[node] != order[node] {
                    continue;
                }

                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                if component.len() > 1 || self.edges[node].contains(&node) {
                    component.sort_unstable();
                    components.push(component);
                }
            }
        }

        components.sort_unstable_by_key(|c| c[0]);
        components
    }

    /// Path `start -> ... -> start` inside one cyclic component, starting at
    /// its lowest index.
    fn cycle_within(&self, component: &[usize]) -> Option<Vec<usize>> {
        let start = *component.first()?;
        let inside: HashSet<usize> = component.iter().copied().collect();
        let mut visited = HashSet::with_capacity(component.len());
        // (node, next edge to explore)
        let mut calls: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(top) = calls.last_mut() {
            let (node, next) = *top;
            top.1 += 1;
            let Some(&dep) = self.edges[node].get(next) else {
                calls.pop();
                continue;
            };

            if dep == start {
                let mut path: Vec<usize> = calls.iter().map(|&(n, _)| n).collect();
                path.push(start);
                return Some(path);
            }
            if inside.contains(&dep) && visited.insert(dep) {
                calls.push((dep, 0));
            }
        }

        None
    }

    fn format_cycle(&self, path: &[usize]) -> String {
        path.iter()
            .map(|&i| self.ids[i].as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
