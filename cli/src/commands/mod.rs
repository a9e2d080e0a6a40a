mod data;
mod exercise;
mod helpers;
mod log;

pub(crate) use data::{cmd_export, cmd_import};
pub(crate) use exercise::{cmd_list, cmd_show};
pub(crate) use log::cmd_log;
