// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export module: writing accumulated results to flat text files.

pub mod sink;

pub use sink::{ResultsSink, write_lines};
