// ==========================================
// Competition Scheduler - Config Layer
// ==========================================
// Scheduling constraints stored in config_kv,
// layered global -> competition -> per call.
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, ConfigScope};
