// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! d2d-snapshot: the host (§4.7) and source-side (§4.8) snapshot managers.
//!
//! [`host::HostSnapshotManager`] drives VSS shadow-copy creation behind a
//! swappable [`host::ShadowCopyBackend`] and persists known snapshots in a
//! [`registry::SnapshotRegistry`]. [`source::SourceSnapshotManager`]
//! dispatches by detected filesystem type to a closed set of
//! [`source::SnapshotHandler`] implementations: [`btrfs::BtrfsHandler`],
//! [`zfs::ZfsHandler`] and [`lvm::LvmHandler`] (also used for ext4/xfs),
//! each shelling out to its CLI tool through [`command::run`].

pub mod btrfs;
pub mod command;
pub mod error;
pub mod host;
pub mod lvm;
pub mod registry;
pub mod source;
pub mod types;
pub mod zfs;

pub use btrfs::BtrfsHandler;
pub use error::SnapshotError;
pub use host::{HostSnapshotManager, ShadowCopyBackend, UnsupportedBackend};
pub use lvm::LvmHandler;
pub use registry::SnapshotRegistry;
pub use source::{detect_fs_type, FsType, SnapshotHandler, SourceSnapshotManager};
pub use types::Snapshot;
pub use zfs::ZfsHandler;
