//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep the noisy ones `false` by default
//! so ticks stay quiet in production logs.

pub struct DebugFlags {
    /// Emit a one-line summary after every tick (analysed / skipped / breakouts).
    pub print_tick_summary: bool,
    /// Emit per-series regression diagnostics (slope, r², normalized RMSE).
    pub print_series_diagnostics: bool,
    /// Emit every envelope position change, not only the breakout edge.
    pub print_state_transitions: bool,
    /// Emit a line whenever a tick is dropped because the previous one is still running.
    pub print_dropped_ticks: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_tick_summary: true,
    print_series_diagnostics: false,
    print_state_transitions: false,
    print_dropped_ticks: true,
};
