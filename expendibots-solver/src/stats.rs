//! Search statistics tracking.

use std::time::{Duration, Instant};

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    // macOS: use mach APIs
    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_outCnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;

        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );

        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    // Linux: read from /proc/self/status
    use std::fs;

    let status = fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected during a search run.
#[derive(Debug)]
pub struct SearchStats {
    /// Nodes expanded (popped and not dedup-skipped)
    pub expanded: u64,

    /// Child nodes generated and pushed to the frontier
    pub generated: u64,

    /// States skipped because they were already explored
    pub dedup_skips: u64,

    /// Largest frontier size observed
    pub peak_frontier: usize,

    /// Deepest node expanded
    pub max_depth: u32,

    /// Progress-line interval; None disables periodic logging
    pub log_interval: Option<Duration>,

    start_time: Instant,
    last_log_time: Instant,
    last_log_expanded: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            expanded: 0,
            generated: 0,
            dedup_skips: 0,
            peak_frontier: 0,
            max_depth: 0,
            log_interval: None,
            start_time: now,
            last_log_time: now,
            last_log_expanded: 0,
        }
    }

    pub fn record_expansion(&mut self, depth: u32) {
        self.expanded += 1;
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }

    pub fn record_generated(&mut self) {
        self.generated += 1;
    }

    pub fn record_dedup_skip(&mut self) {
        self.dedup_skips += 1;
    }

    pub fn note_frontier(&mut self, len: usize) {
        if len > self.peak_frontier {
            self.peak_frontier = len;
        }
    }

    /// Expansions per second over the whole run.
    pub fn rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.expanded as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print a progress line if the log interval has elapsed.
    pub fn maybe_log(&mut self, frontier: usize, explored: usize) {
        let Some(interval) = self.log_interval else {
            return;
        };
        if self.last_log_time.elapsed() < interval {
            return;
        }

        let elapsed_total = self.start_time.elapsed().as_secs();
        let recent = self.expanded - self.last_log_expanded;
        let rate = recent as f64 / self.last_log_time.elapsed().as_secs_f64();

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] expanded={} frontier={} explored={} dups={} rate={:.0}/s depth={}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.expanded,
            frontier,
            explored,
            self.dedup_skips,
            rate,
            self.max_depth,
            mem_str,
        );

        self.last_log_time = Instant::now();
        self.last_log_expanded = self.expanded;
    }

    /// Print final summary.
    pub fn print_summary(&self) {
        println!("Nodes expanded: {}", self.expanded);
        println!("Nodes generated: {}", self.generated);
        println!("Duplicate states skipped: {}", self.dedup_skips);
        println!("Peak frontier: {}", self.peak_frontier);
        println!("Max depth: {}", self.max_depth);
        println!("Rate: {:.0} nodes/s", self.rate());
        if let Some(mem) = get_memory_usage() {
            println!("Memory: {}", format_bytes(mem));
        }
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}
