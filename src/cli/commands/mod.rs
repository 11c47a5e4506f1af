mod fee;
mod operations;
mod path;
mod simulate;

pub use fee::handle_fee_cmd;
pub use operations::handle_operations_cmd;
pub use path::handle_path_cmd;
pub use simulate::handle_simulate_cmd;
