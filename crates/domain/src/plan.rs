//! Slot planning: which existing slots to overwrite and how many to create.
//!
//! Rules are assigned in the order given. A rule already routed by a filled
//! slot keeps that slot (the first unclaimed one in index order). The rest
//! take blank slots in ascending index order, and only once blanks run out
//! are new slots appended. Filled slots are never overwritten or reordered.

use crate::slot::RuleSlot;

/// The email and match value one rule should end up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredRule<'a> {
    pub email: &'a str,
    pub match_value: &'a str,
}

/// Where a rule will be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTarget {
    /// A filled slot already routes this rule; verify only.
    Present(usize),
    /// A blank slot to overwrite.
    Blank(usize),
    /// A slot to create after all blanks are used.
    New,
}

/// One rule paired with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Position of the rule in the desired list.
    pub rule: usize,
    pub target: SlotTarget,
}

/// The full assignment of desired rules onto the current slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlan {
    pub assignments: Vec<Assignment>,
    /// Blank slots left untouched, ascending.
    pub unused_blanks: Vec<usize>,
}

impl SlotPlan {
    /// Plan `desired` against the slots currently in the UI.
    #[must_use]
    pub fn build(desired: &[DesiredRule<'_>], slots: &[RuleSlot]) -> Self {
        let mut ordered: Vec<&RuleSlot> = slots.iter().collect();
        ordered.sort_by_key(|slot| slot.index);

        let mut claimed = vec![false; ordered.len()];
        let mut blanks = ordered
            .iter()
            .filter(|slot| slot.is_blank())
            .map(|slot| slot.index)
            .collect::<Vec<_>>()
            .into_iter();

        let mut assignments = Vec::with_capacity(desired.len());
        for (rule, wanted) in desired.iter().enumerate() {
            let present = ordered.iter().enumerate().find(|(pos, slot)| {
                !claimed[*pos] && slot.holds(wanted.email, wanted.match_value)
            });

            let target = if let Some((pos, slot)) = present {
                claimed[pos] = true;
                SlotTarget::Present(slot.index)
            } else if let Some(index) = blanks.next() {
                SlotTarget::Blank(index)
            } else {
                SlotTarget::New
            };
            assignments.push(Assignment { rule, target });
        }

        Self {
            assignments,
            unused_blanks: blanks.collect(),
        }
    }

    /// Number of blank slots that will be overwritten.
    #[must_use]
    pub fn overwritten(&self) -> usize {
        self.count(|target| matches!(target, SlotTarget::Blank(_)))
    }

    /// Number of slots that will be created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|target| matches!(target, SlotTarget::New))
    }

    /// Number of rules already present in the UI.
    #[must_use]
    pub fn already_present(&self) -> usize {
        self.count(|target| matches!(target, SlotTarget::Present(_)))
    }

    fn count(&self, predicate: impl Fn(SlotTarget) -> bool) -> usize {
        self.assignments
            .iter()
            .filter(|assignment| predicate(assignment.target))
            .count()
    }
}
