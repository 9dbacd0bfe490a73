mod book;
mod generate;
mod helpers;

pub(crate) use book::{cmd_delete, cmd_list, cmd_show};
pub(crate) use generate::cmd_generate;
