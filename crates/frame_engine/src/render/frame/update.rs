//! Reconciling frame tasks with newly compiled scene content
//!
//! When new subgraphs are compiled, the tasks recording them may need more
//! state slots, new dynamic data to keep uploading, a paging helper, and
//! extra sort bins in the views the content lands in. [`update_tasks`]
//! applies all of that in one pass.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::render::frame::{DynamicData, FrameTask, PagerRef};

/// Sort policy of a bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Nearest first
    Ascending,
    /// Recorded in traversal order
    NoSort,
    /// Farthest first
    Descending,
}

impl SortOrder {
    /// Negative bins sort ascending, bin 0 is unsorted, positive bins sort descending
    pub fn for_bin_number(bin_number: i32) -> Self {
        match bin_number.signum() {
            -1 => Self::Ascending,
            0 => Self::NoSort,
            _ => Self::Descending,
        }
    }
}

/// Draw bin of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    /// Bin number; bins record in ascending number order
    pub bin_number: i32,
    /// Sort policy within the bin
    pub sort_order: SortOrder,
}

impl Bin {
    /// Create a bin whose sort policy follows its number
    pub fn new(bin_number: i32) -> Self {
        Self {
            bin_number,
            sort_order: SortOrder::for_bin_number(bin_number),
        }
    }
}

/// View-level recording state touched by compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    /// Bins content can be assigned to
    pub bins: Vec<Bin>,
}

impl View {
    /// Whether a bin with `bin_number` exists
    pub fn has_bin(&self, bin_number: i32) -> bool {
        self.bins.iter().any(|bin| bin.bin_number == bin_number)
    }
}

/// Shared view handle
pub type ViewRef = Arc<Mutex<View>>;

/// Bin numbers referenced by compiled content in one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinDetails {
    /// Distinct bin numbers
    pub indices: BTreeSet<i32>,
}

/// Summary of a compile pass
#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    /// Highest state slot used by the compiled content
    pub max_slot: u32,
    /// Whether the compiled content contains paged subgraphs
    pub contains_paged_lod: bool,
    /// Dynamic data to upload before recording
    pub early_dynamic_data: Option<DynamicData>,
    /// Dynamic data to upload after recording
    pub late_dynamic_data: Option<DynamicData>,
    /// Bins required per view
    pub views: Vec<(ViewRef, BinDetails)>,
}

/// Caller-owned home of the paging helper shared by frame tasks
#[derive(Debug, Default)]
pub struct PagerRegistry {
    pager: Option<PagerRef>,
}

impl PagerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry already holding `pager`
    pub fn with_pager(pager: PagerRef) -> Self {
        Self { pager: Some(pager) }
    }

    /// The registered pager
    pub fn pager(&self) -> Option<&PagerRef> {
        self.pager.as_ref()
    }
}

/// Apply `result` to every task in `tasks`
///
/// - early/late dynamic data is assigned to each task's matching transfer task
/// - every command graph's `max_slot` is raised to at least `result.max_slot`
/// - if paged content was compiled, every task without a pager gets the shared
///   one: the registry's, else the first found on a task, else a new one from
///   `create_pager`, which is started once
/// - every bin number referenced per view is added to that view if missing
pub fn update_tasks<F>(
    tasks: &mut [FrameTask],
    result: &CompileResult,
    registry: &mut PagerRegistry,
    create_pager: F,
) where
    F: FnOnce() -> PagerRef,
{
    assign_dynamic_data(tasks, result);
    raise_max_slot(tasks, result.max_slot);

    if result.contains_paged_lod {
        assign_pager(tasks, registry, create_pager);
    }

    for (view, details) in &result.views {
        let mut view = view.lock().unwrap_or_else(PoisonError::into_inner);
        for &bin_number in &details.indices {
            if !view.has_bin(bin_number) {
                log::debug!("Adding bin {} to view", bin_number);
                view.bins.push(Bin::new(bin_number));
            }
        }
    }
}

fn assign_dynamic_data(tasks: &mut [FrameTask], result: &CompileResult) {
    for task in tasks.iter_mut() {
        if let (Some(data), Some(transfer)) = (&result.early_dynamic_data, task.early_transfer_task_mut()) {
            transfer.assign(data);
        }
        if let (Some(data), Some(transfer)) = (&result.late_dynamic_data, task.late_transfer_task_mut()) {
            transfer.assign(data);
        }
    }
}

fn raise_max_slot(tasks: &mut [FrameTask], max_slot: u32) {
    for task in tasks.iter_mut() {
        for graph in task.command_graphs_mut() {
            if max_slot > graph.max_slot() {
                graph.set_max_slot(max_slot);
            }
        }
    }
}

fn assign_pager<F>(tasks: &mut [FrameTask], registry: &mut PagerRegistry, create_pager: F)
where
    F: FnOnce() -> PagerRef,
{
    let existing = registry
        .pager
        .clone()
        .or_else(|| tasks.iter().find_map(|task| task.database_pager().cloned()));

    let pager = match existing {
        Some(pager) => pager,
        None => {
            log::info!("Paged content compiled, starting database pager");
            let pager = create_pager();
            pager.start();
            pager
        }
    };

    for task in tasks.iter_mut().filter(|task| task.database_pager().is_none()) {
        task.set_database_pager(Arc::clone(&pager));
    }

    registry.pager = Some(pager);
}
