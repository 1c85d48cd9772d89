pub mod server;

use crate::cli::globals::DatabaseArgs;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        database: DatabaseArgs,
        bot_username: Option<String>,
    },
}
