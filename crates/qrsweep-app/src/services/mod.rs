// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges the command line to the qrsweep backend crates.
//
// `session` owns the open document and the decode pipeline; `config_store`
// and `data_dir` handle where configuration lives on disk.

pub mod config_store;
pub mod data_dir;
pub mod session;
