pub mod chat;
pub mod config;

pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}
