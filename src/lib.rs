// SPDX-License-Identifier: GPL-3.0-only
pub mod app;
pub mod config;
pub mod logging;
pub mod presenter;
pub mod remote;
pub mod store;
pub mod sync;
pub mod ui;

#[cfg(test)]
mod test_helpers;
