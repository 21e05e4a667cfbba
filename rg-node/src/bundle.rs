//! Per-task bundle (spec §3, "Bundle"): "A per-task pair {inputs, outputs},
//! each a sequence of resource references indexed by slot index. A node has
//! `max(1, task_count)` bundles; bundle i is the scope of the i-th task."

use rg_core::ResourceRef;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bundle {
    pub inputs: Vec<Option<ResourceRef>>,
    pub outputs: Vec<Option<ResourceRef>>,
}

impl Bundle {
    pub fn new(input_count: usize, output_count: usize) -> Self {
        Bundle {
            inputs: vec![None; input_count],
            outputs: vec![None; output_count],
        }
    }
}

/// Determine a node's task count from the lengths of its task-level input
/// slots (spec §4.3): "if every input slot is node-level, task count is 1;
/// if one or more inputs are task-level, task count equals the length of
/// the parameterising input slot (all parameterising slots must have the
/// same length, else compilation fails)."
pub fn compute_task_count(task_level_lengths: &[usize]) -> Result<usize, String> {
    match task_level_lengths.split_first() {
        None => Ok(1),
        Some((first, rest)) => {
            if rest.iter().all(|len| len == first) {
                Ok((*first).max(1))
            } else {
                Err(format!(
                    "task-level input slots disagree on length: {:?}",
                    task_level_lengths
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_task_level_inputs_means_one_task() {
        assert_eq!(compute_task_count(&[]).unwrap(), 1);
    }

    #[test]
    fn matching_lengths_determine_task_count() {
        assert_eq!(compute_task_count(&[4, 4, 4]).unwrap(), 4);
    }

    #[test]
    fn mismatched_lengths_fail() {
        assert!(compute_task_count(&[4, 5]).is_err());
    }
}
