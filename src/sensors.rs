//! Sensor array
//!
//! Polls machine and environment state once per think cycle. Every metric
//! fails soft: whatever cannot be read is reported as null rather than
//! aborting the reading. Audio is a pluggable capture source; a failed
//! sample falls back to the last successfully measured level.

use chrono::{Datelike, Local, Timelike, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// One sampling of the environment. A fixed schema of nullable fields:
/// a metric the host cannot provide (no battery, no microphone) is null,
/// never an error.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub memory_available_gb: Option<f64>,
    pub disk_usage_percent: Option<f64>,
    pub network_sent_mb: Option<f64>,
    pub network_recv_mb: Option<f64>,
    pub battery_percent: Option<f64>,
    pub power_plugged: Option<bool>,
    pub thermal_pressure: Option<f64>,
    pub hour_of_day: f64,
    pub day_of_week: u32,
    pub uptime_minutes: f64,
    pub timestamp: f64,
    pub total_processes: Option<usize>,
    pub active_processes: Option<usize>,
    pub process_ratio: Option<f64>,
    pub audio_level: Option<f64>,
}

impl SensorReading {
    /// Human-readable one-liner appended to the context stream each cycle.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let (Some(cpu), Some(mem)) = (self.cpu_percent, self.memory_percent) {
            parts.push(format!("System: CPU {:.1}%, RAM {:.1}%", cpu, mem));
        }

        if let Some(batt) = self.battery_percent {
            let source = if self.power_plugged.unwrap_or(false) {
                "plugged"
            } else {
                "battery"
            };
            parts.push(format!("Power: {:.0}% ({})", batt, source));
        }

        let hour = self.hour_of_day as u32;
        let minute = ((self.hour_of_day - f64::from(hour)) * 60.0) as u32;
        parts.push(format!("Time: {:02}:{:02}", hour, minute));

        if let Some(level) = self.audio_level {
            let mood = if level < 20.0 {
                "quiet"
            } else if level < 50.0 {
                "moderate"
            } else {
                "loud"
            };
            parts.push(format!("Audio: {}", mood));
        }

        parts.join(" | ")
    }
}

/// Ambient audio level on a 0-100 dB-like scale. Sampling may briefly
/// occupy an input device. None means the device is absent or the sample
/// failed; the array falls back to the last good level.
pub trait AudioLevelSource: Send {
    fn sample(&mut self) -> Option<f64>;
}

/// Source for hosts without a capture device.
pub struct NoAudioDevice;

impl AudioLevelSource for NoAudioDevice {
    fn sample(&mut self) -> Option<f64> {
        None
    }
}

pub struct SensorArray {
    sys: System,
    disks: Disks,
    networks: Networks,
    audio: Box<dyn AudioLevelSource>,
    last_audio: Option<f64>,
    started: Instant,
}

impl SensorArray {
    pub fn new() -> Self {
        Self::with_audio(Box::new(NoAudioDevice))
    }

    pub fn with_audio(audio: Box<dyn AudioLevelSource>) -> Self {
        let mut sys = System::new();
        // First refresh establishes the baseline for CPU delta calculation;
        // the first reading may report near-zero usage.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            audio,
            last_audio: None,
            started: Instant::now(),
        }
    }

    /// Sample every sensor. Never fails: missing metrics come back null.
    pub fn read(&mut self) -> SensorReading {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.sys.refresh_processes(ProcessesToUpdate::All);
        self.disks.refresh();
        self.networks.refresh();

        let cpu_percent = Some(f64::from(self.sys.global_cpu_usage()));

        let total_mem = self.sys.total_memory();
        let (memory_percent, memory_available_gb) = if total_mem > 0 {
            (
                Some(self.sys.used_memory() as f64 / total_mem as f64 * 100.0),
                Some(self.sys.available_memory() as f64 / GIB),
            )
        } else {
            (None, None)
        };

        let disk_usage_percent = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .or_else(|| self.disks.list().first())
            .and_then(|d| {
                let total = d.total_space();
                if total == 0 {
                    return None;
                }
                let used = total.saturating_sub(d.available_space());
                Some(used as f64 / total as f64 * 100.0)
            });

        let mut sent: u64 = 0;
        let mut recv: u64 = 0;
        for (_name, data) in self.networks.list() {
            sent = sent.saturating_add(data.total_transmitted());
            recv = recv.saturating_add(data.total_received());
        }
        let network_sent_mb = Some(sent as f64 / MIB);
        let network_recv_mb = Some(recv as f64 / MIB);

        let (battery_percent, power_plugged) = read_battery();

        let cpu_count = self.sys.cpus().len();
        let thermal_pressure = if cpu_count > 0 {
            Some((System::load_average().one / cpu_count as f64).min(1.0))
        } else {
            None
        };

        let procs = self.sys.processes();
        let total_processes = procs.len();
        let active_processes = procs.values().filter(|p| p.cpu_usage() > 0.1).count();
        let (total_processes, active_processes, process_ratio) = if total_processes > 0 {
            (
                Some(total_processes),
                Some(active_processes),
                Some(active_processes as f64 / total_processes as f64),
            )
        } else {
            (None, None, None)
        };

        let audio_level = match self.audio.sample() {
            Some(level) => {
                self.last_audio = Some(level);
                Some(level)
            }
            None => self.last_audio,
        };

        let now = Local::now();
        SensorReading {
            cpu_percent,
            memory_percent,
            memory_available_gb,
            disk_usage_percent,
            network_sent_mb,
            network_recv_mb,
            battery_percent,
            power_plugged,
            thermal_pressure,
            hour_of_day: f64::from(now.hour()) + f64::from(now.minute()) / 60.0,
            day_of_week: now.weekday().num_days_from_monday(),
            uptime_minutes: self.started.elapsed().as_secs_f64() / 60.0,
            timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
            total_processes,
            active_processes,
            process_ratio,
            audio_level,
        }
    }
}

impl Default for SensorArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Battery percentage and AC state from /sys/class/power_supply.
/// Desktop hardware without a battery yields (None, None).
fn read_battery() -> (Option<f64>, Option<bool>) {
    let Ok(entries) = std::fs::read_dir("/sys/class/power_supply") else {
        return (None, None);
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_battery = std::fs::read_to_string(path.join("type"))
            .map(|t| t.trim() == "Battery")
            .unwrap_or(false);
        if !is_battery {
            continue;
        }
        let percent = std::fs::read_to_string(path.join("capacity"))
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok());
        let plugged = std::fs::read_to_string(path.join("status"))
            .ok()
            .map(|s| matches!(s.trim(), "Charging" | "Full"));
        return (percent, plugged);
    }
    (None, None)
}
