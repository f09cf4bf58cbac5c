// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rate Gate: fixed-window admission control
//
// At most `limit` callers are admitted per window of `duration`. Callers that
// arrive once the window is saturated queue up (FIFO) and are released when
// the window rolls over. Waiting callers can be cancelled at any point
// without consuming a slot.

pub mod error;
pub mod gate;

pub use error::GateError;
pub use gate::{RateGate, Window};
