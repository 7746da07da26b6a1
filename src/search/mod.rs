//! Search orchestration: configuration, driver state machine, budgets,
//! cancellation, and parallel multi-start.

mod config;
mod driver;
mod parallel;
mod stop;

pub use config::{AcceptanceConfig, SearchBudget, SolverConfig};
pub use driver::{
    solve, solve_with_config, BudgetExhaustedWarning, DriverState, SearchDriver,
    SearchStatistics, SolveOutcome, SolveResult, Termination,
};
pub use parallel::{solve_parallel, solve_parallel_with_stop};
pub use stop::StopSignal;
