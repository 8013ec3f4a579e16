use bacteria_core::{BudgetClass, ChangerError, MAX_ACTIONS, MAX_PSEUDO_ACTIONS};

/// Per-unit budget and progress counters of one team, indexed by roster slot.
///
/// The ledger outlives individual moves: progress toward a partially
/// completed instruction is carried into the next move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    team: usize,
    budgets: Vec<Budget>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Budget {
    actions: u32,
    pseudo_actions: u32,
    completed: u32,
    target: Option<u32>,
}

impl Budget {
    const FULL: Self = Self {
        actions: MAX_ACTIONS,
        pseudo_actions: MAX_PSEUDO_ACTIONS,
        completed: 0,
        target: None,
    };
}

impl Ledger {
    /// Creates an empty ledger for `team`.
    #[must_use]
    pub const fn new(team: usize) -> Self {
        Self {
            team,
            budgets: Vec::new(),
        }
    }

    /// Team whose units the ledger tracks.
    #[must_use]
    pub const fn team(&self) -> usize {
        self.team
    }

    /// Number of roster slots covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    /// Reports whether no slot is covered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    /// Remaining budget of the given class for a unit.
    pub fn remaining(&self, class: BudgetClass, index: usize) -> Result<u32, ChangerError> {
        let budget = self.get(index)?;
        Ok(match class {
            BudgetClass::Action => budget.actions,
            BudgetClass::PseudoAction => budget.pseudo_actions,
        })
    }

    /// Repetitions of the current instruction already applied for a unit.
    pub fn completed(&self, index: usize) -> Result<u32, ChangerError> {
        Ok(self.get(index)?.completed)
    }

    /// Reports whether either budget of a unit has run out.
    pub fn is_exhausted(&self, index: usize) -> Result<bool, ChangerError> {
        let budget = self.get(index)?;
        Ok(budget.actions == 0 || budget.pseudo_actions == 0)
    }

    /// Extends coverage to `roster_len` slots; new slots start with full budgets.
    pub(crate) fn cover(&mut self, roster_len: usize) {
        if roster_len > self.budgets.len() {
            self.budgets.resize(roster_len, Budget::FULL);
        }
    }

    pub(crate) fn refill(&mut self, index: usize) -> Result<(), ChangerError> {
        let budget = self.get_mut(index)?;
        budget.actions = MAX_ACTIONS;
        budget.pseudo_actions = MAX_PSEUDO_ACTIONS;
        Ok(())
    }

    /// Repeat count recorded for an instruction still in progress.
    pub(crate) fn pending(&self, index: usize) -> Result<Option<u32>, ChangerError> {
        let budget = self.get(index)?;
        Ok(budget.target.filter(|_| budget.completed > 0))
    }

    pub(crate) fn begin(&mut self, index: usize, commands: u32) -> Result<(), ChangerError> {
        let budget = self.get_mut(index)?;
        if budget.completed == 0 {
            budget.target = Some(commands);
        }
        Ok(())
    }

    /// Spends one unit of budget, reporting whether any of it remains.
    pub(crate) fn spend(&mut self, class: BudgetClass, index: usize) -> Result<bool, ChangerError> {
        let team = self.team;
        let budget = self.get_mut(index)?;
        let counter = match class {
            BudgetClass::Action => &mut budget.actions,
            BudgetClass::PseudoAction => &mut budget.pseudo_actions,
        };
        if *counter == 0 {
            return Err(ChangerError::TooManyCommands { team, index });
        }
        *counter -= 1;
        budget.completed += 1;
        Ok(*counter > 0)
    }

    pub(crate) fn reset_progress(&mut self, index: usize) -> Result<(), ChangerError> {
        let budget = self.get_mut(index)?;
        budget.completed = 0;
        budget.target = None;
        Ok(())
    }

    fn get(&self, index: usize) -> Result<&Budget, ChangerError> {
        self.budgets
            .get(index)
            .ok_or(ChangerError::InvalidIndex { index })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Budget, ChangerError> {
        self.budgets
            .get_mut(index)
            .ok_or(ChangerError::InvalidIndex { index })
    }
}
