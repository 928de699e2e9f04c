//! Paginator navigation planning
//!
//! The paginator shows at most `group_size` direct page links (slots
//! `1..=group_size`) followed by "advance window" controls. Before the window
//! has moved, the advance control sits at slot `group_size + 1`. Once it has
//! moved, slot 1 holds a "previous window" control, the advance control is
//! fixed at `group_size + 2`, and page `p` of the window sits at slot
//! `p % group_size + 1`. An advance click alone is taken to reach the first
//! two pages of the new window.

use crate::PagerError;
use std::fmt;

/// One click on the paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    /// Click the direct page link at `slot`
    Direct { slot: u32 },
    /// Click the advance-window control at `slot`
    Advance { slot: u32 },
}

impl NavigationAction {
    /// Paginator slot this action clicks (1-based)
    pub fn slot(&self) -> u32 {
        match self {
            Self::Direct { slot } | Self::Advance { slot } => *slot,
        }
    }
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct { slot } => write!(f, "direct@{}", slot),
            Self::Advance { slot } => write!(f, "advance@{}", slot),
        }
    }
}

/// Ordered clicks that bring one page into view
pub type NavigationPlan = Vec<NavigationAction>;

/// Computes the clicks needed to display `page_index`
///
/// Whole-window jumps keep the plan at `O(page_index / group_size)` clicks.
///
/// # Arguments
///
/// * `page_index` - Target page, 1-based
/// * `group_size` - Direct links per paginator window
///
/// # Returns
///
/// * `Ok(NavigationPlan)` - Clicks to perform in order
/// * `Err(PagerError::InvalidInput)` - `page_index` or `group_size` is zero
///
/// # Example
///
/// ```
/// use review_pager::crawler::{plan, NavigationAction};
///
/// let clicks = plan(25, 10).unwrap();
/// assert_eq!(
///     clicks,
///     vec![
///         NavigationAction::Advance { slot: 11 },
///         NavigationAction::Advance { slot: 12 },
///         NavigationAction::Direct { slot: 6 },
///     ]
/// );
/// ```
pub fn plan(page_index: u32, group_size: u32) -> Result<NavigationPlan, PagerError> {
    if page_index < 1 {
        return Err(PagerError::InvalidInput(format!(
            "page index must be >= 1, got {}",
            page_index
        )));
    }
    if group_size < 1 {
        return Err(PagerError::InvalidInput(
            "paginator group size must be >= 1".to_string(),
        ));
    }

    let advances = (page_index - 1) / group_size;
    let remainder = (page_index - 1) % group_size;

    if advances == 0 {
        return Ok(vec![NavigationAction::Direct { slot: page_index }]);
    }

    let mut actions = Vec::with_capacity(advances as usize + 1);
    for i in 0..advances {
        let slot = if i == 0 { group_size + 1 } else { group_size + 2 };
        actions.push(NavigationAction::Advance { slot });
    }

    if remainder > 1 {
        actions.push(NavigationAction::Direct {
            slot: page_index % group_size + 1,
        });
    }

    Ok(actions)
}
