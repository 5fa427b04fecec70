//! Static report copy. Purely presentational.

pub const INTRODUCTION: &str = "This report compares execution time, fragmentation and memory usage \
of a Best Fit memory allocator across size-class threshold configurations. The allocator ships a \
thread-safe variant (`ts_malloc_lock`, one global lock) and a lock-free variant \
(`ts_malloc_nolock`, thread-local free lists); both coalesce adjacent free blocks and split large \
free blocks on allocation.";

pub const EXECUTION_TIME: &str =
    "Wall-clock execution time of each allocation pattern at every threshold size.";

pub const FRAGMENTATION: &str =
    "Memory fragmentation is measured as the ratio of free space to total allocated memory.";

pub const SPEEDUP: &str = "The speedup factor shows the improvement in execution time when \
increasing the threshold size: execution time at the smallest threshold divided by execution \
time at the largest.";

/// Memory section copy for the scenario whose segment usage is charted.
#[must_use]
pub fn memory(scenario_label: &str) -> String {
    format!(
        "The following chart shows the total memory segment and free space for the {scenario_label} allocation pattern."
    )
}
