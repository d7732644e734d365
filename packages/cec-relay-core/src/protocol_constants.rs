//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by HDMI-CEC, the `cec-client` tool or HTTP and
//! changing them would break interoperability. Tunable values live in
//! [`Config`](crate::config::Config).

// ─────────────────────────────────────────────────────────────────────────────
// HDMI-CEC
// ─────────────────────────────────────────────────────────────────────────────

/// Raw frame that wakes the audio system.
///
/// From logical address 4 (playback device) to 5 (audio system), opcode 0x70
/// (System Audio Mode Request) carrying physical address 4.5.0.0.
pub const CEC_POWER_ON_FRAME: &str = "tx 45:70:45:00";

/// `cec-client` command putting logical address 5 (audio system) on standby.
pub const CEC_STANDBY_COMMAND: &str = "standby 5";

/// Name of the `cec-client` executable looked up on `PATH`.
pub const CEC_CLIENT_BINARY: &str = "cec-client";

/// Arguments for single-command mode: playback device type, read one command
/// from stdin and exit, log level 1 (errors only).
pub const CEC_CLIENT_SINGLE_COMMAND_ARGS: [&str; 5] = ["-t", "p", "-s", "-d", "1"];

/// Argument listing the detected CEC adapters.
pub const CEC_CLIENT_LIST_ARG: &str = "-l";

/// Marker printed by `cec-client -l` before the adapter count.
pub const CEC_CLIENT_FOUND_DEVICES_MARKER: &str = "Found devices:";

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// The only status code accepted from the event feed.
pub const REST_SUCCESS_CODE: u16 = 200;

/// Seconds per minute, for converting the configured power-off delay.
pub const SECS_PER_MINUTE: u64 = 60;
