//! # Data Store

use crate::{alert::AlertReport, pose::PoseSample};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub time_s: f64,

    // Pose
    /// Sample received this cycle, if any
    pub pose: Option<PoseSample>,

    pub num_poses_received: u64,

    // Alerts
    pub alert_report: AlertReport,

    pub num_alerts: u64,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, time_s: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.pose = None;
        self.alert_report = AlertReport::default();

        self.time_s = time_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        if self.pose.is_some() {
            self.num_poses_received += 1;
        }
        if self.alert_report.triggered.is_some() {
            self.num_alerts += 1;
        }

        self.num_cycles += 1;
    }
}
