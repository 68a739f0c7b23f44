mod common;

mod change_flow;
mod config_loading;
mod dual_carriage;
mod fiber_wipe;
mod mixing;
mod physical_path;
mod relay;
mod servo;
