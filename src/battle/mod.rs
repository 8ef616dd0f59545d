pub mod abilities;
pub mod ai;
pub mod battlefield;
pub mod combat;
pub mod commands;
pub mod runner;
pub mod state;
pub mod turn_orchestrator;

#[cfg(test)]
mod tests;
