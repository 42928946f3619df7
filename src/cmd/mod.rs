//! CLI command implementations.
//!
//! | Module    | Commands handled                         |
//! |-----------|-------------------------------------------|
//! | `project` | `Init`, `List`                           |
//! | `status`  | `Status`, `Reconcile`, `Drift`           |
//! | `run`     | `Start`, `Advance`, `Recover`, `Watch`   |

pub mod project;
pub mod run;
pub mod status;

pub use project::{cmd_init, cmd_list};
pub use run::{cmd_advance, cmd_recover, cmd_start, cmd_watch};
pub use status::{cmd_drift, cmd_reconcile, cmd_status};
