//! Installed packages and package names.
//!
//! - [`inventory`] - `pip list` output as an [`Inventory`]
//! - [`names`] - name normalization and argument validation

pub mod inventory;
pub mod names;

pub use inventory::{list_installed, pip_version, read_inventory, InstalledPackage, Inventory};
pub use names::{check_package_name, check_version, is_valid_package_name, normalize_name};
