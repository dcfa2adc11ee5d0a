// SPDX-License-Identifier: GPL-3.0-only
pub mod main_loop;

pub use main_loop::{MainJob, MainLoop, MainQueue};
