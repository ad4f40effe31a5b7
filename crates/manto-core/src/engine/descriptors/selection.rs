use crate::core::math::array;
use crate::core::models::descriptor::Descriptor;
use crate::engine::config::SelectMode;
use tracing::warn;

/// Locates the statistic driving orientation selection by substring match
/// against the descriptor names of one detail row.
///
/// Zero matches fall back to position 0, multiple matches take the first;
/// both cases are reported.
pub(crate) fn descriptor_position(row: &[Descriptor], select_id: &str) -> usize {
    let matches: Vec<usize> = row
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name().contains(select_id))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => {
            warn!(
                select_id,
                "no descriptor matches the selection identifier, falling back to position 0"
            );
            0
        }
        [single] => *single,
        [first, ..] => {
            warn!(
                select_id,
                matches = matches.len(),
                "selection identifier is not unique, taking the first match"
            );
            *first
        }
    }
}

/// The orientation index whose row carries the extreme value of the statistic
/// at `position`. Ties resolve to the first occurrence in iteration order.
pub(crate) fn select_orientation(
    detail: &[Vec<Descriptor>],
    position: usize,
    mode: SelectMode,
) -> usize {
    let values: Vec<f64> = detail
        .iter()
        .map(|row| row.get(position).map(|d| d.value()).unwrap_or(0.0))
        .collect();
    match mode {
        SelectMode::Max => array::max_index(&values),
        SelectMode::Min => array::min_index(&values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(names: &[&str]) -> Vec<Descriptor> {
        names.iter().map(|n| Descriptor::new(*n, 0.0)).collect()
    }

    fn detail(values: &[f64]) -> Vec<Vec<Descriptor>> {
        values
            .iter()
            .map(|v| vec![Descriptor::new("stat", *v)])
            .collect()
    }

    #[test]
    fn unique_substring_match_finds_the_position() {
        let r = row(&["sum_Esp", "meanSurfA_Esp", "max_Esp"]);
        assert_eq!(descriptor_position(&r, "meanSurfA"), 1);
    }

    #[test]
    fn zero_matches_fall_back_to_position_zero() {
        let r = row(&["sum_Esp", "max_Esp"]);
        assert_eq!(descriptor_position(&r, "doesNotExist"), 0);
    }

    #[test]
    fn ambiguous_matches_take_the_first() {
        let r = row(&["sum_Esp", "sumPos_Esp", "sumNeg_Esp"]);
        assert_eq!(descriptor_position(&r, "sum"), 0);
    }

    #[test]
    fn max_selection_picks_the_largest_row() {
        assert_eq!(
            select_orientation(&detail(&[1.0, 5.0, 3.0]), 0, SelectMode::Max),
            1
        );
        assert_eq!(
            select_orientation(&detail(&[1.0, 5.0, 3.0]), 0, SelectMode::Min),
            0
        );
    }

    #[test]
    fn ties_resolve_to_the_first_orientation() {
        assert_eq!(
            select_orientation(&detail(&[5.0, 5.0, 3.0]), 0, SelectMode::Max),
            0
        );
        assert_eq!(
            select_orientation(&detail(&[2.0, 1.0, 1.0]), 0, SelectMode::Min),
            1
        );
    }
}
