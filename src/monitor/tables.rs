//! Message templates, keyed by table and indexed by event type.

#![allow(missing_docs)]

const RAID_EVENTS: &[&str] = &[
    "Create RaidSet",
    "Delete RaidSet",
    "Expand RaidSet",
    "Rebuild RaidSet",
    "RaidSet Degraded",
    "Offline RaidSet",
    "Activate RaidSet",
    "Rename RaidSet",
];

const VOLUME_EVENTS: &[&str] = &[
    "Create Volume",
    "Delete Volume",
    "Modify Volume",
    "Start Initialize",
    "Start Rebuilding",
    "Start Migrating",
    "Start Checking",
    "Complete Init",
    "Complete Rebuild",
    "Complete Migrate",
    "Complete Check",
    "Volume Failed",
    "Volume Degraded",
    "Abort Initialization",
    "Abort Rebuilding",
    "Abort Migration",
    "Abort Checking",
    "Stop Initialization",
    "Stop Rebuilding",
    "Stop Migration",
    "Stop Checking",
    "Restart Init",
    "Restart Rebuild",
    "Restart Migrate",
    "Restart Checking",
];

const DEVICE_EVENTS: &[&str] = &[
    "Device Inserted",
    "Device Removed",
    "Reading Error",
    "Writing Error",
    "Ata Ecc Error",
    "Change ATA Mode",
    "Time Out Error",
    "Device Failed",
    "PassThrough Disk Created",
    "PassThrough Disk Modified",
    "PassThrough Disk Deleted",
    "Hot Spare Created",
    "Hot Spare Deleted",
    "Device Failure Predicted",
];

const SCSI_HOST_EVENTS: &[&str] = &[
    "SCSI Bus Reset",
    "SCSI Parity Error",
    "SCSI Bus Timeout",
    "SCSI Command Abort",
    "SCSI Device Reset",
    "SCSI Phase Error",
];

const IDE_HOST_EVENTS: &[&str] = &[
    "IDE Bus Reset",
    "IDE Command Timeout",
    "IDE CRC Error",
    "IDE DMA Error",
];

const HW_MONITOR_EVENTS: &[&str] = &[
    "Over Temperature",
    "Temperature Recovered",
    "Power On With Battery Backup",
    "Incomplete RAID Discovered",
    "HDD Temp. Exceeded",
    "Fan Failed",
    "Fan Recovered",
    "Battery Failed",
    "Battery Recovered",
    "Power Supply Failed",
    "Power Supply Recovered",
    "Controller Over Temperature",
    "Controller Temp. Recovered",
];

const LEGACY_SENSOR_EVENTS: &[&str] = &[
    "Over Voltage",
    "Under Voltage",
    "Voltage Recovered",
    "Over Temperature",
    "Temperature Recovered",
    "Fan Failed",
    "Fan Recovered",
];

/// One message table per event family. Host events pick between the SCSI and
/// IDE tables at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTable {
    Raid,
    Volume,
    Device,
    ScsiHost,
    IdeHost,
    HardwareMonitor,
    LegacySensor,
}

impl TemplateTable {
    #[must_use]
    pub const fn entries(self) -> &'static [&'static str] {
        match self {
            Self::Raid => RAID_EVENTS,
            Self::Volume => VOLUME_EVENTS,
            Self::Device => DEVICE_EVENTS,
            Self::ScsiHost => SCSI_HOST_EVENTS,
            Self::IdeHost => IDE_HOST_EVENTS,
            Self::HardwareMonitor => HW_MONITOR_EVENTS,
            Self::LegacySensor => LEGACY_SENSOR_EVENTS,
        }
    }

    #[must_use]
    pub fn lookup(self, event_type: u16) -> Option<&'static str> {
        self.entries().get(usize::from(event_type)).copied()
    }
}
